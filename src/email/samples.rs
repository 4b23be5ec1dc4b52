use crate::models::article::{Article, ArticleMetadata, ArticleStatus};
use crate::models::object::CmsObject;
use crate::utils::now_iso;

const SAMPLES: [(&str, &str, &str, &[&str], u32); 5] = [
    (
        "The Future of Web Development",
        "https://example.com/web-development-future",
        "Exploring upcoming trends and technologies in web development.",
        &["Technology", "Web Development"],
        5,
    ),
    (
        "Productivity Tips for Remote Work",
        "https://example.com/remote-work-tips",
        "Essential strategies for staying productive while working from home.",
        &["Productivity", "Remote Work"],
        7,
    ),
    (
        "Understanding Modern JavaScript",
        "https://example.com/modern-javascript",
        "A comprehensive guide to ES6+ features and best practices.",
        &["Technology", "JavaScript"],
        10,
    ),
    (
        "Designing Calm Interfaces",
        "https://example.com/calm-interfaces",
        "How restraint in color, motion and density makes products easier to use.",
        &["Design"],
        6,
    ),
    (
        "A Practical Guide to Deep Work",
        "https://example.com/deep-work-guide",
        "Carving out uninterrupted time for focused work in a distracted week.",
        &["Productivity"],
        8,
    ),
];

/// Stand-in articles for a test digest when the user has nothing scheduled.
pub fn placeholder_articles() -> Vec<Article> {
    let added = now_iso();
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, (title, url, description, tags, minutes))| CmsObject {
            id: format!("test-{}", i + 1),
            slug: format!("test-{}", i + 1),
            title: title.to_string(),
            created_at: None,
            modified_at: None,
            metadata: ArticleMetadata {
                title: Some(title.to_string()),
                url: url.to_string(),
                description: Some(description.to_string()),
                domain: Some("example.com".to_string()),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                estimated_read_time: Some(*minutes),
                date_added: added.clone(),
                status: ArticleStatus::Scheduled,
                user_id: String::new(),
                ..Default::default()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_distinct_scheduled_articles() {
        let articles = placeholder_articles();
        assert_eq!(articles.len(), 5);
        assert_eq!(articles[0].display_title(), "The Future of Web Development");

        let mut ids: Vec<_> = articles.iter().map(|a| a.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert!(articles.iter().all(|a| {
            a.metadata.status == ArticleStatus::Scheduled && a.effective_date().is_some()
        }));
    }
}

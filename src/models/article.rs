use super::object::{null_as_default, CmsObject, NewObject, ObjectKind, ObjectMetadata};
use crate::storage::error::BucketResultExt;
use crate::storage::{meta, BucketClient, Direction, ObjectQuery, StoreResult};
use crate::utils::{extract_domain, now_iso, parse_date, slugify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const ARTICLE_PROPS: &[&str] = &["id", "title", "slug", "metadata", "created_at"];
const SEARCH_FIELDS: &[&str] = &["title", "metadata.title", "metadata.description"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    #[default]
    Scheduled,
    Sent,
    Read,
    Archived,
}

impl ArticleStatus {
    pub const ALL: [ArticleStatus; 4] = [
        ArticleStatus::Scheduled,
        ArticleStatus::Sent,
        ArticleStatus::Read,
        ArticleStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Scheduled => "scheduled",
            ArticleStatus::Sent => "sent",
            ArticleStatus::Read => "read",
            ArticleStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_read_time: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_added: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ArticleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_batch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sent_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
}

impl ObjectMetadata for ArticleMetadata {
    const KIND: ObjectKind = ObjectKind::Articles;
}

pub type Article = CmsObject<ArticleMetadata>;

/// Body for saving a new article.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewArticle {
    pub title: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub estimated_read_time: Option<u32>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialArticle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_read_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ArticleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_batch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent_date: Option<String>,
}

impl PartialArticle {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.estimated_read_time.is_none()
            && self.status.is_none()
            && self.scheduled_date.is_none()
            && self.scheduled_time.is_none()
            && self.email_batch_id.is_none()
            && self.email_sent_date.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: u32,
    pub skip: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { limit: 20, skip: 0 }
    }
}

/// Server-side search predicates.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub status: Option<ArticleStatus>,
    pub tags: Vec<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Article {
    pub fn display_title(&self) -> &str {
        non_empty(&self.metadata.title)
            .or_else(|| Some(self.title.as_str()).filter(|t| !t.trim().is_empty()))
            .unwrap_or("Untitled")
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.metadata.description)
    }

    pub fn domain(&self) -> Option<&str> {
        non_empty(&self.metadata.domain)
    }

    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.metadata.date_added)
    }

    /// The scheduled date when set, otherwise the date the article was saved.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        match non_empty(&self.metadata.scheduled_date) {
            Some(scheduled) => parse_date(scheduled),
            None => self.added_at(),
        }
    }

    /// Newest first. A missing user id lists across all users.
    pub async fn list(
        store: &BucketClient,
        user_id: Option<&str>,
        page: Page,
    ) -> StoreResult<Vec<Article>> {
        let mut query = ObjectQuery::new(ObjectKind::Articles);
        if let Some(user_id) = user_id.filter(|id| !id.is_empty()) {
            query = query.eq(meta("user_id"), user_id);
        }
        let query = query
            .props(ARTICLE_PROPS)
            .limit(page.limit)
            .skip(page.skip)
            .sort("created_at", Direction::Descending);

        store
            .find::<ArticleMetadata>(&query)
            .await
            .or_empty("fetch articles")
    }

    pub async fn search(
        store: &BucketClient,
        user_id: &str,
        text: &str,
        filters: &SearchFilters,
    ) -> StoreResult<Vec<Article>> {
        let mut query = ObjectQuery::new(ObjectKind::Articles).eq(meta("user_id"), user_id);
        if let Some(status) = filters.status {
            query = query.eq(meta("status"), status.as_str());
        }
        let query = query
            .any_of(meta("tags"), &filters.tags)
            .between(
                meta("date_added"),
                filters.date_from.as_deref(),
                filters.date_to.as_deref(),
            )
            .text(SEARCH_FIELDS, text.trim())
            .props(ARTICLE_PROPS)
            .sort("created_at", Direction::Descending);

        store
            .find::<ArticleMetadata>(&query)
            .await
            .or_empty("search articles")
    }

    pub async fn scheduled_for_user(
        store: &BucketClient,
        user_id: &str,
        limit: u32,
    ) -> StoreResult<Vec<Article>> {
        let query = ObjectQuery::new(ObjectKind::Articles)
            .eq(meta("user_id"), user_id)
            .eq(meta("status"), ArticleStatus::Scheduled.as_str())
            .props(&["id", "title", "slug", "metadata"])
            .limit(limit)
            .sort("created_at", Direction::Descending);

        store
            .find::<ArticleMetadata>(&query)
            .await
            .or_empty("fetch scheduled articles")
    }

    pub async fn get_by_slug(store: &BucketClient, slug: &str) -> StoreResult<Option<Article>> {
        let query = ObjectQuery::new(ObjectKind::Articles).eq("slug", slug);
        store
            .find_one::<ArticleMetadata>(&query)
            .await
            .optional("fetch article")
    }

    pub async fn create(store: &BucketClient, new_article: &NewArticle) -> StoreResult<Article> {
        let domain = non_empty(&new_article.domain)
            .map(str::to_string)
            .unwrap_or_else(|| extract_domain(&new_article.url));
        let title = non_empty(&new_article.title)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Article from {domain}"));
        let slug = slugify(&title);

        let metadata = ArticleMetadata {
            title: Some(title.clone()),
            url: new_article.url.clone(),
            description: Some(new_article.description.clone().unwrap_or_default()),
            domain: Some(domain),
            tags: new_article.tags.clone(),
            estimated_read_time: new_article.estimated_read_time,
            date_added: now_iso(),
            status: ArticleStatus::Scheduled,
            scheduled_date: non_empty(&new_article.scheduled_date).map(str::to_string),
            scheduled_time: non_empty(&new_article.scheduled_time).map(str::to_string),
            email_batch_id: None,
            email_sent_date: None,
            user_id: new_article.user_id.clone(),
        };

        store
            .insert_one(&NewObject::new(&title, &slug, &metadata))
            .await
            .or_fail("create article")
    }

    pub async fn update(
        store: &BucketClient,
        id: &str,
        updates: &PartialArticle,
    ) -> StoreResult<Article> {
        store
            .update_one::<ArticleMetadata, _>(id, updates)
            .await
            .or_fail("update article")
    }

    pub async fn delete(store: &BucketClient, id: &str) -> StoreResult<()> {
        store.delete_one(id).await.or_fail("delete article")
    }

    pub async fn mark_sent(
        store: &BucketClient,
        id: &str,
        batch_id: &str,
        sent_date: &str,
    ) -> StoreResult<Article> {
        let updates = PartialArticle {
            status: Some(ArticleStatus::Sent),
            email_batch_id: Some(batch_id.to_string()),
            email_sent_date: Some(sent_date.to_string()),
            ..Default::default()
        };
        Self::update(store, id, &updates).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article(metadata: serde_json::Value) -> Article {
        serde_json::from_value(json!({
            "id": "a1",
            "slug": "a1",
            "title": "Object Title",
            "metadata": metadata,
        }))
        .unwrap()
    }

    #[test]
    fn test_deserializes_bucket_shape() {
        let a = article(json!({
            "title": "The AI Revolution",
            "url": "https://techcrunch.com/ai",
            "tags": ["Technology", "AI"],
            "estimated_read_time": 8,
            "date_added": "2024-01-15T09:30:00Z",
            "status": "scheduled",
            "scheduled_date": null,
            "user_id": "user123"
        }));
        assert_eq!(a.metadata.tags, vec!["Technology", "AI"]);
        assert_eq!(a.metadata.status, ArticleStatus::Scheduled);
        assert_eq!(a.metadata.scheduled_date, None);
        assert_eq!(a.metadata.estimated_read_time, Some(8));
    }

    #[test]
    fn test_display_title_falls_back() {
        assert_eq!(article(json!({"title": "Meta"})).display_title(), "Meta");
        assert_eq!(article(json!({"title": ""})).display_title(), "Object Title");

        let mut untitled = article(json!({}));
        untitled.title.clear();
        assert_eq!(untitled.display_title(), "Untitled");
    }

    #[test]
    fn test_effective_date_prefers_schedule() {
        let scheduled = article(json!({
            "date_added": "2024-01-15T09:30:00Z",
            "scheduled_date": "2024-01-20"
        }));
        assert_eq!(
            scheduled.effective_date().unwrap().to_rfc3339(),
            "2024-01-20T00:00:00+00:00"
        );

        let unscheduled =
            article(json!({"date_added": "2024-01-15T09:30:00Z", "scheduled_date": ""}));
        assert_eq!(unscheduled.effective_date(), unscheduled.added_at());
    }

    #[test]
    fn test_partial_article_serializes_only_set_fields() {
        let partial = PartialArticle {
            status: Some(ArticleStatus::Read),
            ..Default::default()
        };
        assert!(!partial.is_empty());
        assert_eq!(serde_json::to_value(&partial).unwrap(), json!({"status": "read"}));
        assert!(PartialArticle::default().is_empty());
    }
}

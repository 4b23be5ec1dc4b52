//! Digest email composition: subject, HTML body and plain-text body.

use crate::models::article::Article;
use crate::models::user::{EmailGrouping, User};
use crate::utils::{format_long_date, url_host};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

const UNCATEGORIZED: &str = "Uncategorized";
const UNDATED: &str = "Undated";

#[derive(Debug, Clone)]
pub struct DigestEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// A run of articles sharing a group key. Mixed digests have one group
/// without a label.
#[derive(Debug)]
pub struct ArticleGroup<'a> {
    pub label: Option<String>,
    pub articles: Vec<&'a Article>,
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

pub fn subject(article_count: usize, is_test: bool) -> String {
    format!(
        "{}Your Read Later Digest - {} article{}",
        if is_test { "[TEST] " } else { "" },
        article_count,
        plural(article_count)
    )
}

fn category_key(article: &Article) -> String {
    article
        .metadata
        .tags
        .first()
        .cloned()
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

fn date_key(article: &Article) -> String {
    article
        .added_at()
        .map(|date| format_long_date(&date))
        .unwrap_or_else(|| UNDATED.to_string())
}

/// Groups in first-seen key order; articles keep their input order.
pub fn group_articles(articles: &[Article], grouping: EmailGrouping) -> Vec<ArticleGroup<'_>> {
    let key: fn(&Article) -> String = match grouping {
        EmailGrouping::Mixed => {
            return vec![ArticleGroup {
                label: None,
                articles: articles.iter().collect(),
            }]
        }
        EmailGrouping::ByCategory => category_key,
        EmailGrouping::ByDateAdded => date_key,
    };

    let mut groups: Vec<ArticleGroup<'_>> = Vec::new();
    for article in articles {
        let label = key(article);
        match groups
            .iter_mut()
            .find(|g| g.label.as_deref() == Some(label.as_str()))
        {
            Some(group) => group.articles.push(article),
            None => groups.push(ArticleGroup {
                label: Some(label),
                articles: vec![article],
            }),
        }
    }
    groups
}

/// Explicit domain, else the URL's host, else empty.
pub fn domain_label(article: &Article) -> String {
    article
        .domain()
        .map(str::to_string)
        .or_else(|| url_host(&article.metadata.url))
        .unwrap_or_default()
}

pub struct DigestComposer<'a> {
    base_url: &'a str,
}

impl<'a> DigestComposer<'a> {
    pub fn new(base_url: &'a str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/'),
        }
    }

    pub fn compose(&self, user: &User, articles: &[Article], is_test: bool) -> DigestEmail {
        let groups = group_articles(articles, user.grouping());
        DigestEmail {
            subject: subject(articles.len(), is_test),
            html: self.render_html(user, &groups, articles.len(), is_test),
            text: self.render_text(user, &groups, articles.len(), is_test),
        }
    }

    /// Click-tracking redirect, or the bare URL when any part is missing.
    pub fn article_link(&self, article: &Article, user_email: &str) -> String {
        let url = article.metadata.url.as_str();
        if article.id.is_empty() || user_email.is_empty() || url.is_empty() {
            return url.to_string();
        }
        format!(
            "{}/track/click?article={}&user={}&url={}",
            self.base_url,
            urlencoding::encode(&article.id),
            urlencoding::encode(user_email),
            urlencoding::encode(url)
        )
    }

    fn unsubscribe_url(&self, email: &str) -> String {
        format!("{}/unsubscribe?email={}", self.base_url, urlencoding::encode(email))
    }

    fn article_card(&self, article: &Article, user: &User, grouped: bool) -> String {
        let (tag, size) = if grouped { ("h4", 16) } else { ("h3", 18) };

        let read_time = article
            .metadata
            .estimated_read_time
            .filter(|minutes| *minutes > 0)
            .map(|minutes| {
                format!(r#"<span style="color: #9ca3af; font-size: 12px;"> • {minutes} min read</span>"#)
            })
            .unwrap_or_default();

        let description = match article.description() {
            Some(desc) if user.wants_summaries() => format!(
                r#"<p style="color: #6b7280; font-size: 14px; line-height: 1.5; margin: 8px 0 0 0;">{}</p>"#,
                text(desc)
            ),
            _ => String::new(),
        };

        let tags = if article.metadata.tags.is_empty() {
            String::new()
        } else {
            let chips: String = article
                .metadata
                .tags
                .iter()
                .map(|t| {
                    format!(
                        r#"<span style="background: #e5e7eb; color: #374151; padding: 2px 8px; border-radius: 12px; font-size: 12px; margin-right: 4px;">{}</span>"#,
                        text(t)
                    )
                })
                .collect();
            format!(r#"<div style="margin-top: 8px;">{chips}</div>"#)
        };

        format!(
            r#"
        <div style="border: 1px solid #e5e7eb; border-radius: 8px; padding: 20px; margin-bottom: 16px; background: white;">
          <{tag} style="margin: 0 0 8px 0; font-size: {size}px; font-weight: 600; color: #1f2937;">
            <a href="{href}" style="color: #1f2937; text-decoration: none;" target="_blank">{title}</a>
          </{tag}>
          <div style="color: #9ca3af; font-size: 12px; margin-bottom: 8px;">{domain}{read_time}</div>
          {description}
          {tags}
        </div>"#,
            href = attr(&self.article_link(article, &user.metadata.email)),
            title = text(article.display_title()),
            domain = text(&domain_label(article)),
        )
    }

    fn render_groups_html(&self, user: &User, groups: &[ArticleGroup<'_>]) -> String {
        groups
            .iter()
            .map(|group| match &group.label {
                None => group
                    .articles
                    .iter()
                    .map(|a| self.article_card(a, user, false))
                    .collect::<String>(),
                Some(label) => {
                    let cards: String = group
                        .articles
                        .iter()
                        .map(|a| self.article_card(a, user, true))
                        .collect();
                    format!(
                        r#"
        <div style="margin-bottom: 32px;">
          <h3 style="color: #374151; font-size: 20px; font-weight: 600; margin: 0 0 16px 0; padding-bottom: 8px; border-bottom: 2px solid #e5e7eb;">{}</h3>
          {cards}
        </div>"#,
                        text(label)
                    )
                }
            })
            .collect()
    }

    fn render_html(
        &self,
        user: &User,
        groups: &[ArticleGroup<'_>],
        count: usize,
        is_test: bool,
    ) -> String {
        let email = user.metadata.email.as_str();
        let test_badge = if is_test {
            r#"<div style="background: #ef4444; color: white; padding: 8px 16px; border-radius: 4px; font-weight: bold; margin-bottom: 24px; text-align: center;">TEST EMAIL</div>"#
        } else {
            ""
        };

        format!(
            r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Your Read Later Digest</title>
  </head>
  <body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f8fafc;">
    {test_badge}
    <div style="background: white; border-radius: 12px; padding: 32px; margin-bottom: 24px; box-shadow: 0 1px 3px rgba(0,0,0,0.1);">
      <h1 style="color: #1f2937; font-size: 28px; font-weight: 700; margin: 0 0 8px 0;">📚 Your Read Later Digest</h1>
      <p style="color: #6b7280; margin: 0 0 24px 0; font-size: 16px;">
        Hi {name}! Here are your {count} saved article{s} ready to read.
      </p>
      {articles}
      <div style="margin-top: 32px; padding-top: 24px; border-top: 1px solid #e5e7eb; text-align: center;">
        <a href="{base}" style="background: #3b82f6; color: white; padding: 12px 24px; border-radius: 6px; text-decoration: none; font-weight: 500; display: inline-block;">View All Articles</a>
      </div>
    </div>
    <div style="text-align: center; color: #9ca3af; font-size: 12px;">
      <p>
        Sent by <a href="{base}" style="color: #3b82f6; text-decoration: none;">Read Later Pro</a>
        <br>
        <a href="{unsubscribe}" style="color: #9ca3af; text-decoration: none;">Unsubscribe</a>
      </p>
      <img src="{base}/track/open?user={user}" width="1" height="1" style="display: block; margin: 0 auto;" alt="">
    </div>
  </body>
</html>
"#,
            name = text(user.display_name()),
            s = plural(count),
            articles = self.render_groups_html(user, groups),
            base = attr(self.base_url),
            unsubscribe = attr(&self.unsubscribe_url(email)),
            user = urlencoding::encode(email),
        )
    }

    fn render_text(
        &self,
        user: &User,
        groups: &[ArticleGroup<'_>],
        count: usize,
        is_test: bool,
    ) -> String {
        let mut body = String::new();
        let mut index = 0;
        for group in groups {
            if let Some(label) = &group.label {
                body.push_str(&format!("== {label} ==\n\n"));
            }
            for article in &group.articles {
                index += 1;
                body.push_str(&text_item(index, article, user.wants_summaries()));
                body.push('\n');
            }
        }

        format!(
            "{prefix}📚 Your Read Later Digest\n\
             \n\
             Hi {name}!\n\
             \n\
             Here are your {count} saved article{s} ready to read:\n\
             \n\
             {body}\n\
             View all your articles: {base}\n\
             \n\
             ---\n\
             Sent by Read Later Pro ({base})\n\
             Unsubscribe: {unsubscribe}\n",
            prefix = if is_test { "[TEST EMAIL]\n\n" } else { "" },
            name = user.display_name(),
            s = plural(count),
            base = self.base_url,
            unsubscribe = self.unsubscribe_url(&user.metadata.email),
        )
    }
}

fn text_item(index: usize, article: &Article, with_summary: bool) -> String {
    let read_time = article
        .metadata
        .estimated_read_time
        .filter(|minutes| *minutes > 0)
        .map(|minutes| format!(" ({minutes} min read)"))
        .unwrap_or_default();
    let description = match article.description() {
        Some(desc) if with_summary => format!("\n   {desc}"),
        _ => String::new(),
    };
    let tags = if article.metadata.tags.is_empty() {
        String::new()
    } else {
        format!("\n   Tags: {}", article.metadata.tags.join(", "))
    };

    format!(
        "{index}. {title}{read_time}\n   {url}\n   Source: {domain}{description}{tags}\n",
        title = article.display_title(),
        url = article.metadata.url,
        domain = domain_label(article),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article(id: &str, url: &str, domain: Option<&str>, tags: &[&str], added: &str) -> Article {
        serde_json::from_value(json!({
            "id": id,
            "title": format!("Article {id}"),
            "metadata": {
                "title": format!("Article {id}"),
                "url": url,
                "domain": domain,
                "description": format!("Secret summary {id}"),
                "tags": tags,
                "estimated_read_time": 5,
                "date_added": added,
                "status": "scheduled",
                "user_id": "u1"
            }
        }))
        .unwrap()
    }

    fn user(grouping: EmailGrouping, summaries: bool) -> User {
        let mut user = User::placeholder("reader@example.com", 0);
        user.metadata.name = Some("Ada".into());
        user.metadata.email_grouping = Some(grouping);
        user.metadata.include_summaries = Some(summaries);
        user
    }

    fn fixtures() -> Vec<Article> {
        vec![
            article("1", "https://a.example.com/x", None, &["Tech", "AI"], "2024-01-15T09:30:00Z"),
            article(
                "2",
                "https://b.example.com/y",
                Some("b.example.com"),
                &[],
                "2024-01-14T15:00:00Z",
            ),
            article("3", "https://c.example.com/z", None, &["Design"], "2024-01-15T20:00:00Z"),
            article("4", "https://d.example.com/w", None, &["Tech"], "not a date"),
        ]
    }

    fn flattened<'a>(groups: &[ArticleGroup<'a>]) -> Vec<&'a str> {
        groups
            .iter()
            .flat_map(|g| g.articles.iter().map(|a| a.id.as_str()))
            .collect()
    }

    #[test]
    fn test_mixed_is_one_unlabeled_group() {
        let articles = fixtures();
        let groups = group_articles(&articles, EmailGrouping::Mixed);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].label.is_none());
        assert_eq!(flattened(&groups), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_by_category_uses_first_tag_in_first_seen_order() {
        let articles = fixtures();
        let groups = group_articles(&articles, EmailGrouping::ByCategory);
        let labels: Vec<_> = groups.iter().map(|g| g.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["Tech", "Uncategorized", "Design"]);
        assert_eq!(flattened(&groups), vec!["1", "4", "2", "3"]);
    }

    #[test]
    fn test_by_date_added_uses_long_dates() {
        let articles = fixtures();
        let groups = group_articles(&articles, EmailGrouping::ByDateAdded);
        let labels: Vec<_> = groups.iter().map(|g| g.label.clone().unwrap()).collect();
        assert_eq!(
            labels,
            vec!["Monday, January 15, 2024", "Sunday, January 14, 2024", "Undated"]
        );
        assert_eq!(groups[0].articles.len(), 2);
    }

    #[test]
    fn test_grouping_neither_drops_nor_duplicates() {
        let articles = fixtures();
        let modes = [
            EmailGrouping::Mixed,
            EmailGrouping::ByCategory,
            EmailGrouping::ByDateAdded,
        ];
        for grouping in modes {
            let mut ids = flattened(&group_articles(&articles, grouping));
            ids.sort();
            assert_eq!(ids, vec!["1", "2", "3", "4"], "{grouping:?}");
        }
    }

    #[test]
    fn test_subject_pluralization() {
        assert_eq!(subject(1, false), "Your Read Later Digest - 1 article");
        assert_eq!(subject(3, true), "[TEST] Your Read Later Digest - 3 articles");
    }

    #[test]
    fn test_summaries_hidden_when_disabled() {
        let articles = fixtures();
        let composer = DigestComposer::new("https://app.example.com");
        for grouping in [EmailGrouping::Mixed, EmailGrouping::ByCategory] {
            let email = composer.compose(&user(grouping, false), &articles, false);
            assert!(!email.html.contains("Secret summary"));
            assert!(!email.text.contains("Secret summary"));
        }

        let email = composer.compose(&user(EmailGrouping::Mixed, true), &articles, false);
        assert!(email.html.contains("Secret summary 1"));
        assert!(email.text.contains("Secret summary 1"));
    }

    #[test]
    fn test_domain_label_fallbacks() {
        let explicit = article("1", "https://x.example.com", Some("custom.org"), &[], "");
        assert_eq!(domain_label(&explicit), "custom.org");

        let from_url = article("2", "https://www.news.example.com/a?b=c", None, &[], "");
        assert_eq!(domain_label(&from_url), "www.news.example.com");

        let malformed = article("3", "not a url", None, &[], "");
        assert_eq!(domain_label(&malformed), "");

        let empty_domain = article("4", "https://y.example.com", Some(""), &[], "");
        assert_eq!(domain_label(&empty_domain), "y.example.com");
    }

    #[test]
    fn test_malformed_url_renders_without_panicking() {
        let articles = vec![article("1", "not a url", None, &[], "")];
        let email = DigestComposer::new("https://app.example.com")
            .compose(&user(EmailGrouping::ByDateAdded, true), &articles, false);
        assert!(email.text.contains("Source: \n   Secret summary 1"));
        assert!(email.html.contains("Undated"));
    }

    #[test]
    fn test_tracking_link_requires_id_email_and_url() {
        let composer = DigestComposer::new("https://app.example.com/");
        let a = article("a 1", "https://x.example.com/p?q=1", None, &[], "");
        assert_eq!(
            composer.article_link(&a, "r@example.com"),
            "https://app.example.com/track/click?article=a%201&user=r%40example.com&url=https%3A%2F%2Fx.example.com%2Fp%3Fq%3D1"
        );
        assert_eq!(composer.article_link(&a, ""), "https://x.example.com/p?q=1");

        let mut no_id = a.clone();
        no_id.id.clear();
        assert_eq!(composer.article_link(&no_id, "r@example.com"), "https://x.example.com/p?q=1");
    }

    #[test]
    fn test_html_escapes_article_content() {
        let mut a = article("1", "https://x.example.com", None, &["<b>"], "");
        a.metadata.title = Some("<script>alert(1)</script>".into());
        let email = DigestComposer::new("https://app.example.com")
            .compose(&user(EmailGrouping::Mixed, true), &[a], false);
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_test_marker_and_greeting() {
        let articles = fixtures();
        let email = DigestComposer::new("https://app.example.com")
            .compose(&user(EmailGrouping::Mixed, false), &articles, true);
        assert!(email.html.contains("TEST EMAIL"));
        assert!(email.text.starts_with("[TEST EMAIL]\n\n"));
        assert!(email.text.contains("Hi Ada!"));
        assert!(email.text.contains("Here are your 4 saved articles ready to read:"));
        assert!(email
            .text
            .contains("Unsubscribe: https://app.example.com/unsubscribe?email=reader%40example.com"));
    }

    #[test]
    fn test_text_groups_number_continuously() {
        let articles = fixtures();
        let email = DigestComposer::new("https://app.example.com")
            .compose(&user(EmailGrouping::ByCategory, false), &articles, false);
        assert!(email.text.contains("== Tech ==\n\n1. Article 1"));
        assert!(email.text.contains("2. Article 4"));
        assert!(email.text.contains("== Design ==\n\n4. Article 3"));
    }
}

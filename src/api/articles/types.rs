use crate::filters::{ArticleFilter, SortKey, SortOrder};
use crate::models::article::{Article, ArticleStatus, Page, PartialArticle, SearchFilters};
use actix_web::web;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ArticlePath {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SlugPath {
    pub slug: String,
}

pub type RqArticleId = web::Path<ArticlePath>;
pub type RqSlug = web::Path<SlugPath>;

/// Comma-separated tag list from a query string; blanks dropped.
pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct ArticleListQuery {
    pub user_id: Option<String>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    pub search: Option<String>,
    pub status: Option<ArticleStatus>,
    pub tags: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub order: SortOrder,
}

impl ArticleListQuery {
    pub fn page(&self) -> Page {
        let default = Page::default();
        Page {
            limit: self.limit.unwrap_or(default.limit).clamp(1, MAX_PAGE_SIZE),
            skip: self.skip.unwrap_or(default.skip),
        }
    }

    pub fn filter(&self) -> ArticleFilter {
        ArticleFilter {
            search: self.search.clone(),
            status: self.status,
            tags: split_tags(self.tags.as_deref()),
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ArticleSearchQuery {
    pub user_id: Option<String>,
    #[serde(default)]
    pub q: String,
    pub status: Option<ArticleStatus>,
    pub tags: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl ArticleSearchQuery {
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            status: self.status,
            tags: split_tags(self.tags.as_deref()),
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub total: usize,
    pub counts: BTreeMap<&'static str, usize>,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Schedule,
    MarkRead,
    Archive,
    Delete,
}

#[derive(Debug, Default, Deserialize)]
pub struct SchedulePayload {
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub ids: Vec<String>,
    pub action: BulkAction,
    #[serde(default)]
    pub payload: Option<SchedulePayload>,
}

impl BulkRequest {
    /// Metadata patch applied to every id; `None` for deletes.
    pub fn updates(&self) -> Option<PartialArticle> {
        let status = match self.action {
            BulkAction::Schedule => ArticleStatus::Scheduled,
            BulkAction::MarkRead => ArticleStatus::Read,
            BulkAction::Archive => ArticleStatus::Archived,
            BulkAction::Delete => return None,
        };

        let mut updates = PartialArticle {
            status: Some(status),
            ..Default::default()
        };
        if let (BulkAction::Schedule, Some(payload)) = (self.action, &self.payload) {
            updates.scheduled_date = payload.scheduled_date.clone();
            updates.scheduled_time = payload.scheduled_time.clone();
        }
        Some(updates)
    }
}

#[derive(Debug, Serialize)]
pub struct BulkFailure {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BulkResponse {
    pub processed: usize,
    pub failed: Vec<BulkFailure>,
}

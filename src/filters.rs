//! In-memory filtering and sorting of an already-fetched article list.

use crate::models::article::{Article, ArticleStatus};
use crate::utils::parse_date;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub search: Option<String>,
    pub status: Option<ArticleStatus>,
    pub tags: Vec<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Title,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

fn matches_search(article: &Article, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

    article.metadata.title.as_deref().is_some_and(contains)
        || contains(&article.title)
        || article.description().is_some_and(contains)
        || contains(&article.metadata.url)
}

fn matches_tags(article: &Article, wanted: &[String]) -> bool {
    wanted.iter().any(|tag| article.metadata.tags.contains(tag))
}

fn matches_range(article: &Article, from: Option<&str>, to: Option<&str>) -> bool {
    let from = from.and_then(parse_date);
    let to = to.and_then(parse_date);
    if from.is_none() && to.is_none() {
        return true;
    }

    let Some(date) = article.effective_date() else {
        return false;
    };
    from.map_or(true, |from| date >= from) && to.map_or(true, |to| date <= to)
}

/// Keeps the articles that satisfy every active predicate, in input order.
pub fn filter_articles(articles: &[Article], filter: &ArticleFilter) -> Vec<Article> {
    let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    articles
        .iter()
        .filter(|article| search.map_or(true, |needle| matches_search(article, needle)))
        .filter(|article| filter.status.map_or(true, |status| article.metadata.status == status))
        .filter(|article| filter.tags.is_empty() || matches_tags(article, &filter.tags))
        .filter(|article| {
            matches_range(article, filter.date_from.as_deref(), filter.date_to.as_deref())
        })
        .cloned()
        .collect()
}

fn compare(a: &Article, b: &Article, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.effective_date().cmp(&b.effective_date()),
        SortKey::Title => a.display_title().cmp(b.display_title()),
        SortKey::Status => a.metadata.status.as_str().cmp(b.metadata.status.as_str()),
    }
}

/// Stable sort; equal keys keep their relative order in both directions.
pub fn sort_articles(articles: &mut [Article], key: SortKey, order: SortOrder) {
    articles.sort_by(|a, b| match order {
        SortOrder::Asc => compare(a, b, key),
        SortOrder::Desc => compare(b, a, key),
    });
}

/// Article counts per status, every status present.
pub fn count_by_status(articles: &[Article]) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> =
        ArticleStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for article in articles {
        *counts.entry(article.metadata.status.as_str()).or_default() += 1;
    }
    counts
}

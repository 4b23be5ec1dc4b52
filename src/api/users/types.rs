use crate::filters::count_by_status;
use crate::models::article::Article;
use crate::models::user::{SubscriptionTier, User};
use actix_web::web;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct UserPath {
    pub user_id: String,
}

pub type RqUserId = web::Path<UserPath>;

#[derive(Debug, Deserialize)]
pub struct UserLookup {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub user_id: String,
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub articles_saved_this_week: usize,
    pub articles_limit: u32,
    pub subscription_tier: SubscriptionTier,
}

impl UserStats {
    pub fn compute(user: &User, articles: &[Article], now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);
        let saved_this_week = articles
            .iter()
            .filter(|a| a.added_at().is_some_and(|added| added >= week_ago))
            .count();

        Self {
            user_id: user.id.clone(),
            total: articles.len(),
            by_status: count_by_status(articles),
            articles_saved_this_week: saved_this_week,
            articles_limit: user.metadata.articles_limit,
            subscription_tier: user.metadata.subscription_tier,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DigestResponse {
    pub success: bool,
    pub message_id: String,
    pub article_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
}

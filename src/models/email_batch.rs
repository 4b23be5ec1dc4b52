use super::object::{null_as_default, CmsObject, NewObject, ObjectKind, ObjectMetadata};
use crate::storage::error::BucketResultExt;
use crate::storage::{BucketClient, StoreResult};
use crate::utils::{format_short_date, slugify};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    #[default]
    Scheduled,
    Sent,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailBatchMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sent_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub article_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub batch_status: BatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_opened: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub articles_clicked: Vec<String>,
    #[serde(
        default,
        alias = "mailgun_message_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_message_id: Option<String>,
}

impl ObjectMetadata for EmailBatchMetadata {
    const KIND: ObjectKind = ObjectKind::EmailBatches;
}

/// Log record of one digest send attempt.
pub type EmailBatch = CmsObject<EmailBatchMetadata>;

#[derive(Debug, Clone)]
pub struct NewEmailBatch {
    pub user_id: String,
    pub article_count: u32,
    pub batch_status: BatchStatus,
    pub provider_message_id: Option<String>,
    pub is_test: bool,
}

impl EmailBatch {
    pub async fn create(store: &BucketClient, batch: &NewEmailBatch) -> StoreResult<EmailBatch> {
        let now = Utc::now();
        let prefix = if batch.is_test { "test-batch" } else { "batch" };
        let slug = slugify(&format!(
            "{}-{}-{}",
            prefix,
            batch.user_id,
            now.timestamp_millis()
        ));
        let title = format!(
            "{}Email Batch - {}",
            if batch.is_test { "Test " } else { "" },
            format_short_date(&now)
        );

        let metadata = EmailBatchMetadata {
            user_id: batch.user_id.clone(),
            sent_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            article_count: batch.article_count,
            batch_status: batch.batch_status,
            email_opened: Some(false),
            articles_clicked: Vec::new(),
            provider_message_id: batch.provider_message_id.clone(),
        };

        store
            .insert_one(&NewObject::new(&title, &slug, &metadata))
            .await
            .or_fail("create email batch")
    }
}

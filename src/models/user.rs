use super::object::{null_as_default, CmsObject, NewObject, ObjectKind, ObjectMetadata};
use crate::storage::error::BucketResultExt;
use crate::storage::{meta, BucketClient, ObjectQuery, StoreResult};
use crate::utils::{now_iso, slugify};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Paid,
}

impl SubscriptionTier {
    /// Weekly article allowance shown to the user.
    pub fn articles_limit(&self) -> u32 {
        match self {
            SubscriptionTier::Free => 5,
            SubscriptionTier::Paid => 999,
        }
    }
}

/// How a digest email groups its articles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailGrouping {
    ByCategory,
    ByDateAdded,
    #[default]
    Mixed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscription_tier: SubscriptionTier,
    #[serde(default, deserialize_with = "null_as_default")]
    pub articles_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_grouping: Option<EmailGrouping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_summaries: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_email_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub articles_saved_this_week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_articles_read: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_created: String,
}

impl ObjectMetadata for UserMetadata {
    const KIND: ObjectKind = ObjectKind::Users;
}

pub type User = CmsObject<UserMetadata>;

pub enum UserQuery<'a> {
    Id(&'a str),
    Email(&'a str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub subscription_tier: Option<SubscriptionTier>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_tier: Option<SubscriptionTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_grouping: Option<EmailGrouping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_summaries: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_email_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles_saved_this_week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_articles_read: Option<u32>,
}

impl PartialUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.subscription_tier.is_none()
            && self.articles_limit.is_none()
            && self.email_grouping.is_none()
            && self.include_summaries.is_none()
            && self.default_email_time.is_none()
            && self.articles_saved_this_week.is_none()
            && self.total_articles_read.is_none()
    }
}

impl User {
    /// Name used in greetings: profile name, then object title, then "Reader".
    pub fn display_name(&self) -> &str {
        self.metadata
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| Some(self.title.as_str()).filter(|t| !t.trim().is_empty()))
            .unwrap_or("Reader")
    }

    pub fn grouping(&self) -> EmailGrouping {
        self.metadata.email_grouping.unwrap_or_default()
    }

    pub fn wants_summaries(&self) -> bool {
        self.metadata.include_summaries.unwrap_or(false)
    }

    /// Stand-in profile for test sends to an address with no account.
    pub fn placeholder(email: &str, saved_this_week: u32) -> User {
        User {
            id: String::new(),
            slug: String::new(),
            title: "Test User".to_string(),
            created_at: None,
            modified_at: None,
            metadata: UserMetadata {
                email: email.to_string(),
                name: Some("Test User".to_string()),
                subscription_tier: SubscriptionTier::Free,
                articles_limit: SubscriptionTier::Free.articles_limit(),
                email_grouping: Some(EmailGrouping::Mixed),
                include_summaries: Some(true),
                default_email_time: Some("9:00 AM".to_string()),
                articles_saved_this_week: Some(saved_this_week),
                total_articles_read: Some(0),
                account_created: now_iso(),
            },
        }
    }

    pub async fn get(store: &BucketClient, query: UserQuery<'_>) -> StoreResult<Option<User>> {
        let query = match query {
            UserQuery::Id(id) => ObjectQuery::new(ObjectKind::Users).eq("id", id),
            UserQuery::Email(email) => ObjectQuery::new(ObjectKind::Users).eq(meta("email"), email),
        };
        store
            .find_one::<UserMetadata>(&query)
            .await
            .optional("fetch user")
    }

    pub async fn create(store: &BucketClient, new_user: &NewUser) -> StoreResult<User> {
        let tier = new_user.subscription_tier.unwrap_or_default();
        let name = new_user.name.clone().unwrap_or_default();
        let title = if name.trim().is_empty() {
            new_user.email.clone()
        } else {
            name.clone()
        };
        let slug = slugify(&new_user.email);

        let metadata = UserMetadata {
            email: new_user.email.clone(),
            name: Some(name),
            subscription_tier: tier,
            articles_limit: tier.articles_limit(),
            articles_saved_this_week: Some(0),
            total_articles_read: Some(0),
            account_created: now_iso(),
            ..Default::default()
        };

        store
            .insert_one(&NewObject::new(&title, &slug, &metadata))
            .await
            .or_fail("create user")
    }

    /// A tier change without an explicit limit also resets the limit.
    pub async fn update(
        store: &BucketClient,
        id: &str,
        updates: &PartialUser,
    ) -> StoreResult<User> {
        let mut updates = updates.clone();
        if let (Some(tier), None) = (updates.subscription_tier, updates.articles_limit) {
            updates.articles_limit = Some(tier.articles_limit());
        }
        store
            .update_one::<UserMetadata, _>(id, &updates)
            .await
            .or_fail("update user")
    }
}

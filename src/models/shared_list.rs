use super::object::{null_as_default, CmsObject, ObjectKind, ObjectMetadata};
use crate::storage::error::BucketResultExt;
use crate::storage::{meta, BucketClient, Direction, ObjectQuery, StoreResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedListMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub list_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_by_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub article_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shared_with_users: Vec<String>,
}

impl ObjectMetadata for SharedListMetadata {
    const KIND: ObjectKind = ObjectKind::SharedLists;
}

pub type SharedList = CmsObject<SharedListMetadata>;

impl SharedList {
    pub async fn list_for_user(
        store: &BucketClient,
        user_id: &str,
    ) -> StoreResult<Vec<SharedList>> {
        let query = ObjectQuery::new(ObjectKind::SharedLists)
            .eq(meta("created_by_user_id"), user_id)
            .props(&["id", "title", "slug", "metadata"])
            .sort("created_at", Direction::Descending);

        store
            .find::<SharedListMetadata>(&query)
            .await
            .or_empty("fetch shared lists")
    }
}

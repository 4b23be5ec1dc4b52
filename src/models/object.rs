use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use std::fmt;

/// The object types stored in the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Articles,
    Users,
    EmailBatches,
    SharedLists,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Articles => "articles",
            ObjectKind::Users => "users",
            ObjectKind::EmailBatches => "email-batches",
            ObjectKind::SharedLists => "shared-lists",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ties a metadata shape to the object type it is stored under.
pub trait ObjectMetadata: Serialize + DeserializeOwned {
    const KIND: ObjectKind;
}

/// A bucket object: common envelope plus typed metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsObject<M> {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    pub metadata: M,
}

/// Payload for inserting a new object.
#[derive(Debug, Serialize)]
pub struct NewObject<'a, M> {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub title: &'a str,
    pub slug: &'a str,
    pub metadata: &'a M,
}

impl<'a, M: ObjectMetadata> NewObject<'a, M> {
    pub fn new(title: &'a str, slug: &'a str, metadata: &'a M) -> Self {
        Self {
            kind: M::KIND,
            title,
            slug,
            metadata,
        }
    }
}

/// The bucket returns `null` for cleared fields, including empty repeater
/// and multi-select fields.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

use super::error::BucketError;
use super::query::ObjectQuery;
use crate::config::StoreConfig;
use crate::models::object::{CmsObject, NewObject, ObjectMetadata};
use log::debug;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Client for the hosted object bucket. Cheap to clone; built once at startup.
#[derive(Clone)]
pub struct BucketClient {
    http: Client,
    api_url: String,
    bucket_slug: String,
    read_key: String,
    write_key: String,
}

#[derive(Deserialize)]
struct ObjectsEnvelope<M> {
    #[serde(default = "Vec::new")]
    objects: Vec<CmsObject<M>>,
}

#[derive(Deserialize)]
struct ObjectEnvelope<M> {
    object: CmsObject<M>,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: Option<String>,
}

#[derive(Serialize)]
struct MetadataPatch<'a, P> {
    metadata: &'a P,
}

impl BucketClient {
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &StoreConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bucket_slug: config.bucket_slug.clone(),
            read_key: config.read_key.clone(),
            write_key: config.write_key.clone(),
        }
    }

    fn objects_url(&self) -> String {
        format!("{}/buckets/{}/objects", self.api_url, self.bucket_slug)
    }

    fn object_url(&self, id: &str) -> String {
        format!("{}/{}", self.objects_url(), urlencoding::encode(id))
    }

    pub async fn find<M: ObjectMetadata>(
        &self,
        query: &ObjectQuery,
    ) -> Result<Vec<CmsObject<M>>, BucketError> {
        debug!("find {} objects: {}", query.kind(), query.filter_json());

        let response = self
            .http
            .get(self.objects_url())
            .query(&[("read_key", self.read_key.as_str())])
            .query(&query.to_params())
            .send()
            .await?;

        let envelope: ObjectsEnvelope<M> = decode(check_status(response).await?).await?;
        Ok(envelope.objects)
    }

    pub async fn find_one<M: ObjectMetadata>(
        &self,
        query: &ObjectQuery,
    ) -> Result<CmsObject<M>, BucketError> {
        let query = query.clone().limit(1);
        self.find::<M>(&query)
            .await?
            .into_iter()
            .next()
            .ok_or(BucketError::NotFound)
    }

    pub async fn insert_one<M: ObjectMetadata>(
        &self,
        object: &NewObject<'_, M>,
    ) -> Result<CmsObject<M>, BucketError> {
        debug!("insert {} object '{}'", object.kind, object.slug);

        let response = self
            .http
            .post(self.objects_url())
            .bearer_auth(&self.write_key)
            .json(object)
            .send()
            .await?;

        let envelope: ObjectEnvelope<M> = decode(check_status(response).await?).await?;
        Ok(envelope.object)
    }

    /// Merges `metadata` into the object's existing metadata.
    pub async fn update_one<M: ObjectMetadata, P: Serialize>(
        &self,
        id: &str,
        metadata: &P,
    ) -> Result<CmsObject<M>, BucketError> {
        debug!("update object {}", id);

        let response = self
            .http
            .patch(self.object_url(id))
            .bearer_auth(&self.write_key)
            .json(&MetadataPatch { metadata })
            .send()
            .await?;

        let envelope: ObjectEnvelope<M> = decode(check_status(response).await?).await?;
        Ok(envelope.object)
    }

    pub async fn delete_one(&self, id: &str) -> Result<(), BucketError> {
        debug!("delete object {}", id);

        let response = self
            .http
            .delete(self.object_url(id))
            .bearer_auth(&self.write_key)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, BucketError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(BucketError::NotFound);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiMessage>(&body)
        .ok()
        .and_then(|m| m.message)
        .unwrap_or(body);

    Err(BucketError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BucketError> {
    response
        .json::<T>()
        .await
        .map_err(|e| BucketError::Decode(e.to_string()))
}

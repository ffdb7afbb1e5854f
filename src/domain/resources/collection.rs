use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::client::{ApiClient, ApiRequest};
use crate::domain::shared::ClientResult;

/// `{"results": [...]}` - shape of every list endpoint
#[derive(Debug, Deserialize)]
pub struct ResultsPage<T> {
    pub results: Vec<T>,
}

/// `{"message": ..., "data": {...}}` - shape of create/update responses
#[derive(Debug, Deserialize)]
pub struct Saved<T> {
    pub message: String,
    pub data: T,
}

/// CRUD plumbing shared by the resource handles, rooted at one collection path
#[derive(Clone, Copy)]
pub(crate) struct Collection<'a> {
    client: &'a ApiClient,
    base: &'static str,
}

impl<'a> Collection<'a> {
    pub(crate) fn new(client: &'a ApiClient, base: &'static str) -> Self {
        Self { client, base }
    }

    pub(crate) fn client(&self) -> &'a ApiClient {
        self.client
    }

    pub(crate) fn path(&self) -> &'static str {
        self.base
    }

    pub(crate) fn item_path(&self, id: i64) -> String {
        format!("{}{}/", self.base, id)
    }

    pub(crate) fn action_path(&self, id: i64, action: &str) -> String {
        format!("{}{}/{}/", self.base, id, action)
    }

    pub(crate) fn list_request(&self) -> ApiRequest {
        ApiRequest::get(self.base)
    }

    pub(crate) async fn list<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<Vec<T>> {
        let page: ResultsPage<T> = self.client.fetch(&request).await?;
        Ok(page.results)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, id: i64) -> ClientResult<T> {
        self.client.fetch(&ApiRequest::get(self.item_path(id))).await
    }

    pub(crate) async fn create<B, T>(&self, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let saved: Saved<T> = self.client.fetch(&ApiRequest::post(self.base, body)?).await?;
        tracing::debug!(path = self.base, message = %saved.message, "Resource created");
        Ok(saved.data)
    }

    pub(crate) async fn update<B, T>(&self, id: i64, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let saved: Saved<T> = self
            .client
            .fetch(&ApiRequest::put(self.item_path(id), body)?)
            .await?;
        Ok(saved.data)
    }

    pub(crate) async fn partial_update<B, T>(&self, id: i64, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let saved: Saved<T> = self
            .client
            .fetch(&ApiRequest::patch(self.item_path(id), body)?)
            .await?;
        Ok(saved.data)
    }

    pub(crate) async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client
            .execute_ok(&ApiRequest::delete(self.item_path(id)))
            .await
    }
}

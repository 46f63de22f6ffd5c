use async_trait::async_trait;
use reqwest::{header, StatusCode};

use super::{validate_name, FileStore};
use crate::error::StorageError;

/// Object store reached over plain HTTP.
///
/// Files live at `{base_url}/{name}`: `GET` downloads, `PUT` uploads and
/// `DELETE` removes. Works against any bucket endpoint or file host that
/// accepts bearer tokens.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStore {
    pub fn new(client: reqwest::Client, base_url: String, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url_for(&self, name: &str) -> Result<String, StorageError> {
        validate_name(name)?;
        Ok(format!("{}/{}", self.base_url, name))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Map a non-success response to a storage error
async fn error_for(response: reqwest::Response) -> StorageError {
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StorageError::AuthenticationFailed(format!("HTTP {}: {}", status.as_u16(), message))
        }
        _ => StorageError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl FileStore for HttpStore {
    fn kind(&self) -> &'static str {
        "http"
    }

    async fn load(&self, name: &str) -> Result<Option<String>, StorageError> {
        let url = self.url_for(name)?;
        let response = self.authorize(self.client.get(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let err = error_for(response).await;
            tracing::error!("Download of {} failed: {}", url, err);
            return Err(err);
        }

        Ok(Some(response.text().await?))
    }

    async fn save(&self, name: &str, contents: &str) -> Result<(), StorageError> {
        let url = self.url_for(name)?;
        let response = self
            .authorize(self.client.put(&url))
            .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
            .body(contents.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            let err = error_for(response).await;
            tracing::error!("Upload of {} failed: {}", url, err);
            return Err(err);
        }

        tracing::info!("Uploaded {} to {}", name, self.base_url);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        let url = self.url_for(name)?;
        let response = self.authorize(self.client.delete(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::warn!("{} does not exist in the file store", name);
            return Ok(false);
        }
        if !response.status().is_success() {
            let err = error_for(response).await;
            tracing::error!("Delete of {} failed: {}", url, err);
            return Err(err);
        }

        tracing::info!("Deleted {} from {}", name, self.base_url);
        Ok(true)
    }
}

//! Firestore REST API client
//!
//! Talks to the Firestore document list endpoint with bearer-token
//! authentication, page-by-page. Study data is laid out as one document
//! per user under a top-level collection, with the raw FHIR resources in
//! a per-user sub-collection.

use super::models::ListDocumentsResponse;
use crate::config::FirestoreConfig;
use crate::domain::errors::FirestoreError;
use crate::domain::ids::UserId;
use crate::domain::{Result, VeneerError};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;

/// Firestore REST client
pub struct FirestoreClient {
    /// HTTP client for making requests
    client: Client,

    /// Firestore configuration
    config: FirestoreConfig,
}

impl FirestoreClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`VeneerError::Configuration`] if the HTTP client cannot
    /// be built.
    pub fn new(config: FirestoreConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                VeneerError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// The documents root for the configured project and database
    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.config.base_url, self.config.project_id, self.config.database
        )
    }

    fn auth_header_value(&self) -> Option<String> {
        self.config
            .token
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret().as_ref()))
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.config.retry.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries || !is_retryable(&e) {
                        return Err(e);
                    }

                    let delay_ms = self.config.retry.initial_delay_ms
                        * (self
                            .config
                            .retry
                            .backoff_multiplier
                            .powf((attempt - 1) as f64) as u64);
                    let delay_ms = delay_ms.min(self.config.retry.max_delay_ms);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying Firestore request after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    /// Fetches one page of a document list
    async fn list_page(&self, url: &str, page_token: Option<&str>) -> Result<ListDocumentsResponse> {
        let mut request = self
            .client
            .get(url)
            .query(&[("pageSize", self.config.page_size.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        if let Some(auth) = self.auth_header_value() {
            request = request.header("Authorization", auth);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                VeneerError::Firestore(FirestoreError::Timeout(e.to_string()))
            } else {
                VeneerError::Firestore(FirestoreError::ConnectionFailed(e.to_string()))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VeneerError::Firestore(status_error(status, url, body)));
        }

        response
            .json::<ListDocumentsResponse>()
            .await
            .map_err(|e| VeneerError::Firestore(FirestoreError::InvalidResponse(e.to_string())))
    }

    /// Lists every document under a collection URL, following pagination
    async fn list_all(&self, url: &str) -> Result<ListDocumentsResponse> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .retry_request(|| self.list_page(url, page_token.as_deref()))
                .await?;
            documents.extend(page.documents);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(ListDocumentsResponse {
            documents,
            next_page_token: None,
        })
    }

    /// Lists the user ids present in the study collection
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a document id is not a
    /// valid user id.
    pub async fn list_user_ids(&self) -> Result<Vec<UserId>> {
        let url = format!("{}/{}", self.documents_root(), self.config.collection);
        let response = self.list_all(&url).await?;

        let mut user_ids = Vec::new();
        for document in &response.documents {
            let user_id = UserId::new(document.document_id()).map_err(|e| {
                VeneerError::Firestore(FirestoreError::InvalidResponse(format!(
                    "Invalid user document id: {e}"
                )))
            })?;
            user_ids.push(user_id);
        }

        tracing::info!(count = user_ids.len(), "Fetched user ids from Firestore");
        Ok(user_ids)
    }

    /// Fetches and decodes the raw resources of one user
    ///
    /// Each document's typed fields are lowered to plain JSON; documents
    /// without an `id` field inherit their Firestore document id.
    pub async fn fetch_user_documents(&self, user_id: &UserId) -> Result<Vec<Value>> {
        let url = format!(
            "{}/{}/{}/{}",
            self.documents_root(),
            self.config.collection,
            user_id,
            self.config.sub_collection
        );
        let response = self.list_all(&url).await?;

        let mut resources = Vec::new();
        for document in &response.documents {
            let mut decoded = document.decode().map_err(VeneerError::Firestore)?;
            if let Some(object) = decoded.as_object_mut() {
                object
                    .entry("id")
                    .or_insert_with(|| Value::String(document.document_id().to_string()));
            }
            resources.push(decoded);
        }

        tracing::debug!(
            user_id = %user_id,
            count = resources.len(),
            "Fetched raw resources for user"
        );
        Ok(resources)
    }

    /// Fetches the raw resources of every user in the study collection
    pub async fn fetch_all_documents(&self) -> Result<Vec<Value>> {
        let user_ids = self.list_user_ids().await?;

        let mut all = Vec::new();
        for user_id in &user_ids {
            let mut documents = self.fetch_user_documents(user_id).await?;
            all.append(&mut documents);
        }

        tracing::info!(
            users = user_ids.len(),
            documents = all.len(),
            collection = %self.config.collection,
            sub_collection = %self.config.sub_collection,
            "Fetched raw document batch from Firestore"
        );
        Ok(all)
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

fn is_retryable(error: &VeneerError) -> bool {
    matches!(
        error,
        VeneerError::Firestore(
            FirestoreError::ConnectionFailed(_)
                | FirestoreError::Timeout(_)
                | FirestoreError::ServerError { .. }
        )
    )
}

fn status_error(status: StatusCode, url: &str, body: String) -> FirestoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            FirestoreError::AuthenticationFailed(format!("status {status}: {body}"))
        }
        StatusCode::NOT_FOUND => FirestoreError::CollectionNotFound(url.to_string()),
        s if s.is_server_error() => FirestoreError::ServerError {
            status: s.as_u16(),
            message: body,
        },
        s => FirestoreError::ClientError {
            status: s.as_u16(),
            message: body,
        },
    }
}

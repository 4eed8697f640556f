//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `EngineClient`
//! using the OpenSearch Rust crate.

use std::fmt::Debug;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::{
        headers::HeaderMap,
        request::JsonBody,
        response::Response,
        transport::{ConnectionPool, SingleNodeConnectionPool, Transport, TransportBuilder},
        Method,
    },
    indices::{
        IndicesCloseParts, IndicesCreateParts, IndicesDeleteParts, IndicesExistsAliasParts,
        IndicesExistsParts, IndicesGetMappingParts, IndicesGetSettingsParts, IndicesOpenParts,
        IndicesPutMappingParts, IndicesPutSettingsParts,
    },
    OpenSearch,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio_retry::RetryIf;
use tracing::{debug, error, info, warn};
use url::Url;

use super::pool::RoundRobinConnectionPool;
use crate::config::{ConnectionConfig, RetryConfig};
use crate::errors::EngineError;
use crate::interfaces::EngineClient;
use crate::types::{AliasActions, ReindexRequest};

/// Query parameters for the reindex endpoint.
#[derive(Debug, Serialize)]
struct ReindexQuery {
    slices: u32,
    wait_for_completion: bool,
}

/// Whether a call may be sent again after the engine reported a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    /// Repeating the call has no additional effect.
    Idempotent,
    /// The call must not run twice. Only a 429, which the engine answers
    /// before doing any work, or a missing response is retried.
    Unapplied,
}

/// OpenSearch engine client.
///
/// Each `EngineClient` call maps onto one REST endpoint. Transient failures
/// (no response, or a retryable status) are retried with exponential backoff
/// according to the configured `RetryConfig`. Index creation and reindex are
/// not retried on gateway errors, since the engine may already have applied
/// them.
///
/// # Example
///
/// ```ignore
/// use index_keeper_repository::{ConnectionConfig, EngineClient, OpenSearchClient};
///
/// let client = OpenSearchClient::new(ConnectionConfig::new("http://localhost:9200"))?;
/// if !client.index_exists("a-v1").await? {
///     client.create_index("a-v1", None).await?;
/// }
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    retry: RetryConfig,
}

impl OpenSearchClient {
    /// Create a new client for the cluster described by `config`.
    ///
    /// No request is sent; connectivity problems surface on the first call.
    pub fn new(config: ConnectionConfig) -> Result<Self, EngineError> {
        let urls = config
            .urls
            .iter()
            .map(|url| Url::parse(url).map_err(|e| EngineError::connection(format!("{}: {}", url, e))))
            .collect::<Result<Vec<Url>, EngineError>>()?;

        let transport = match urls.len() {
            0 => return Err(EngineError::connection("no cluster URL configured")),
            1 => Self::transport(SingleNodeConnectionPool::new(urls[0].clone()), &config)?,
            _ => Self::transport(RoundRobinConnectionPool::new(urls)?, &config)?,
        };

        info!(
            urls = ?config.urls,
            authenticated = config.username.is_some(),
            max_retries = config.retry.max_retries,
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            retry: config.retry,
        })
    }

    fn transport<P>(pool: P, config: &ConnectionConfig) -> Result<Transport, EngineError>
    where
        P: ConnectionPool + Debug + Clone + Send + 'static,
    {
        let mut builder = TransportBuilder::new(pool).disable_proxy();
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
        }
        builder
            .build()
            .map_err(|e| EngineError::connection(e.to_string()))
    }

    /// Send a request, retrying transient failures.
    ///
    /// `request` is invoked once per attempt. A retryable status becomes a
    /// `RequestFailed` error once retries are exhausted or not allowed by
    /// `replay`; any other response is returned whatever its status, so use
    /// `ensure_success` to turn failures into errors.
    async fn execute<F, Fut>(
        &self,
        operation: &str,
        replay: Replay,
        request: F,
    ) -> Result<Response, EngineError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<Response, opensearch::Error>> + Send,
    {
        let request = &request;
        let retry = &self.retry;
        let action = move || async move {
            match request().await {
                Ok(response) => {
                    let status = response.status_code().as_u16();
                    if !retry.should_retry_status(status) {
                        return Ok(response);
                    }
                    let body = response.text().await.unwrap_or_default();
                    Err(EngineError::request_failed(operation, status, body))
                }
                Err(e) => Err(EngineError::transport(format!("{}: {}", operation, e))),
            }
        };

        let mut attempt: u32 = 0;
        let condition = |e: &EngineError| {
            let again = self.retryable(replay, e);
            if again {
                attempt += 1;
                warn!(operation, error = %e, attempt, "Retrying engine request");
            }
            again
        };

        RetryIf::spawn(self.retry.strategy(), action, condition)
            .await
            .inspect_err(|e| error!(operation, error = %e, "Engine request failed"))
    }

    fn retryable(&self, replay: Replay, error: &EngineError) -> bool {
        match error {
            EngineError::TransportError(_) => true,
            EngineError::RequestFailed { status, .. } => {
                self.retry.should_retry_status(*status)
                    && (replay == Replay::Idempotent || *status == 429)
            }
            _ => false,
        }
    }

    /// A retried create that finds its index was answered by an earlier attempt.
    fn created_by_earlier_attempt(error: &EngineError) -> bool {
        error.status_code() == Some(400)
            && error
                .response_body()
                .is_some_and(|body| body.contains("resource_already_exists_exception"))
    }

    /// Convert a non-success response into `EngineError::RequestFailed`.
    async fn ensure_success(operation: &str, response: Response) -> Result<Response, EngineError> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error!(operation, status = %status, body = %body, "Engine request failed");
        Err(EngineError::request_failed(operation, status.as_u16(), body))
    }

    /// Interpret a HEAD response: 2xx is present, 404 is absent.
    async fn exists_from(operation: &str, response: Response) -> Result<bool, EngineError> {
        match response.status_code().as_u16() {
            404 => Ok(false),
            _ => Self::ensure_success(operation, response).await.map(|_| true),
        }
    }

    async fn json_body(operation: &str, response: Response) -> Result<Value, EngineError> {
        response
            .json::<Value>()
            .await
            .map_err(|e| EngineError::parse(format!("{}: {}", operation, e)))
    }

    /// Strip the `{"<index>": {"<section>": ...}}` envelope of GET responses.
    fn unwrap_section(response: Value, index: &str, section: &str) -> Result<Value, EngineError> {
        let entry = match response.get(index) {
            Some(entry) => entry,
            // Requests by alias answer with the concrete index name.
            None => response
                .as_object()
                .and_then(|indices| indices.values().next())
                .ok_or_else(|| {
                    EngineError::parse(format!("{} response has no entry for {}", section, index))
                })?,
        };
        Ok(entry.get(section).cloned().unwrap_or_else(|| json!({})))
    }
}

#[async_trait]
impl EngineClient for OpenSearchClient {
    async fn index_exists(&self, name: &str) -> Result<bool, EngineError> {
        let index = [name];
        let response = self
            .execute("check index exists", Replay::Idempotent, move || async move {
                self.client
                    .indices()
                    .exists(IndicesExistsParts::Index(&index))
                    .send()
                    .await
            })
            .await?;
        Self::exists_from("check index exists", response).await
    }

    async fn create_index(&self, name: &str, body: Option<&Value>) -> Result<(), EngineError> {
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let response = self
            .execute("create index", Replay::Unapplied, move || async move {
                attempts.fetch_add(1, Ordering::Relaxed);
                let indices = self.client.indices();
                let request = indices.create(IndicesCreateParts::Index(name));
                match body {
                    Some(body) => request.body(body.clone()).send().await,
                    None => request.send().await,
                }
            })
            .await?;
        match Self::ensure_success("create index", response).await {
            Ok(_) => debug!(index = %name, "Index created"),
            Err(e) if attempts.load(Ordering::Relaxed) > 1 && Self::created_by_earlier_attempt(&e) => {
                warn!(index = %name, "Index already existed on retry, treating as created");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<(), EngineError> {
        let index = [name];
        let response = self
            .execute("delete index", Replay::Idempotent, move || async move {
                self.client
                    .indices()
                    .delete(IndicesDeleteParts::Index(&index))
                    .send()
                    .await
            })
            .await?;
        Self::ensure_success("delete index", response).await?;
        debug!(index = %name, "Index deleted");
        Ok(())
    }

    async fn open_index(&self, name: &str) -> Result<(), EngineError> {
        let index = [name];
        let response = self
            .execute("open index", Replay::Idempotent, move || async move {
                self.client
                    .indices()
                    .open(IndicesOpenParts::Index(&index))
                    .send()
                    .await
            })
            .await?;
        Self::ensure_success("open index", response).await?;
        debug!(index = %name, "Index opened");
        Ok(())
    }

    async fn close_index(&self, name: &str) -> Result<(), EngineError> {
        let index = [name];
        let response = self
            .execute("close index", Replay::Idempotent, move || async move {
                self.client
                    .indices()
                    .close(IndicesCloseParts::Index(&index))
                    .send()
                    .await
            })
            .await?;
        Self::ensure_success("close index", response).await?;
        debug!(index = %name, "Index closed");
        Ok(())
    }

    async fn get_mapping(&self, name: &str) -> Result<Value, EngineError> {
        let index = [name];
        let response = self
            .execute("get mapping", Replay::Idempotent, move || async move {
                self.client
                    .indices()
                    .get_mapping(IndicesGetMappingParts::Index(&index))
                    .send()
                    .await
            })
            .await?;
        let response = Self::ensure_success("get mapping", response).await?;
        let body = Self::json_body("get mapping", response).await?;
        Self::unwrap_section(body, name, "mappings")
    }

    async fn put_mapping(&self, name: &str, mapping: &Value) -> Result<(), EngineError> {
        let index = [name];
        let response = self
            .execute("put mapping", Replay::Idempotent, move || async move {
                self.client
                    .indices()
                    .put_mapping(IndicesPutMappingParts::Index(&index))
                    .body(mapping.clone())
                    .send()
                    .await
            })
            .await?;
        Self::ensure_success("put mapping", response).await?;
        debug!(index = %name, "Mapping updated");
        Ok(())
    }

    async fn get_settings(&self, name: &str) -> Result<Value, EngineError> {
        let index = [name];
        let response = self
            .execute("get settings", Replay::Idempotent, move || async move {
                self.client
                    .indices()
                    .get_settings(IndicesGetSettingsParts::Index(&index))
                    .send()
                    .await
            })
            .await?;
        let response = Self::ensure_success("get settings", response).await?;
        let body = Self::json_body("get settings", response).await?;
        Self::unwrap_section(body, name, "settings")
    }

    async fn put_settings(&self, name: &str, settings: &Value) -> Result<(), EngineError> {
        let index = [name];
        let response = self
            .execute("put settings", Replay::Idempotent, move || async move {
                self.client
                    .indices()
                    .put_settings(IndicesPutSettingsParts::Index(&index))
                    .body(settings.clone())
                    .send()
                    .await
            })
            .await?;
        Self::ensure_success("put settings", response).await?;
        debug!(index = %name, "Settings updated");
        Ok(())
    }

    async fn alias_exists(&self, name: &str) -> Result<bool, EngineError> {
        let alias = [name];
        let response = self
            .execute("check alias exists", Replay::Idempotent, move || async move {
                self.client
                    .indices()
                    .exists_alias(IndicesExistsAliasParts::Name(&alias))
                    .send()
                    .await
            })
            .await?;
        Self::exists_from("check alias exists", response).await
    }

    async fn update_aliases(&self, actions: &AliasActions) -> Result<(), EngineError> {
        let body =
            serde_json::to_value(actions).map_err(|e| EngineError::serialization(e.to_string()))?;
        let body = &body;
        let response = self
            .execute("update aliases", Replay::Idempotent, move || async move {
                self.client
                    .indices()
                    .update_aliases()
                    .body(body.clone())
                    .send()
                    .await
            })
            .await?;
        Self::ensure_success("update aliases", response).await?;
        debug!(actions = actions.len(), "Aliases updated");
        Ok(())
    }

    async fn reindex(&self, request: &ReindexRequest) -> Result<(), EngineError> {
        let query = ReindexQuery {
            slices: request.slices,
            wait_for_completion: request.wait_for_completion,
        };
        let query = &query;
        let body = request.body();
        let body = &body;
        let response = self
            .execute("reindex", Replay::Unapplied, move || async move {
                self.client
                    .send(
                        Method::Post,
                        "/_reindex",
                        HeaderMap::new(),
                        Some(query),
                        Some(JsonBody::new(body.clone())),
                        None,
                    )
                    .await
            })
            .await?;
        let response = Self::ensure_success("reindex", response).await?;

        if request.wait_for_completion {
            let result = Self::json_body("reindex", response).await?;
            let failed = result
                .get("failures")
                .and_then(Value::as_array)
                .is_some_and(|failures| !failures.is_empty());
            if failed {
                error!(source = %request.source, dest = %request.dest, "Reindex reported failures");
                return Err(EngineError::request_failed("reindex", 200, result.to_string()));
            }
        }

        debug!(
            source = %request.source,
            dest = %request.dest,
            slices = request.slices,
            "Reindex finished"
        );
        Ok(())
    }
}

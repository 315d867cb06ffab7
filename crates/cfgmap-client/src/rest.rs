//! CRUD over a REST configuration API
//!
//! Requests run on the blocking pool; the HTTP agent is synchronous. There
//! is no retry: a non-2xx status is returned to the caller as-is.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use cfgmap_core::wire;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::credentials::{Credentials, Headers};
use crate::error::{Error, Result};
use crate::service::{CrudService, Entity, Stub};

#[derive(Debug, Deserialize)]
struct StubList {
    #[serde(default)]
    values: Vec<Stub>,
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

pub struct RestService<T> {
    kind: String,
    collection_url: String,
    credentials: Arc<dyn Credentials>,
    agent: ureq::Agent,
    _entity: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for RestService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestService")
            .field("kind", &self.kind)
            .field("collection_url", &self.collection_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl<T: Entity> RestService<T> {
    /// Service for the collection at `base_url` + `path`.
    pub fn new(
        kind: impl Into<String>,
        base_url: &str,
        path: &str,
        credentials: Arc<dyn Credentials>,
    ) -> Self {
        Self {
            kind: kind.into(),
            collection_url: join_url(base_url, path),
            credentials,
            agent: ureq::Agent::new_with_defaults(),
            _entity: PhantomData,
        }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    fn headers(&self) -> Result<Headers> {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        self.credentials.authenticate(&mut headers)?;
        Ok(headers)
    }

    /// Send one request and return the parsed JSON body, if any.
    async fn send(&self, method: Method, url: String, body: Option<Value>) -> Result<Option<Value>> {
        let headers = self.headers()?;
        let agent = self.agent.clone();
        debug!(kind = %self.kind, method = method.as_str(), %url, "request");

        let task_url = url.clone();
        tokio::task::spawn_blocking(move || execute(&agent, method, &task_url, &headers, body))
            .await
            .map_err(|e| Error::Transport {
                url,
                status: None,
                message: format!("request task failed: {e}"),
            })?
    }

    fn classify(&self, id: &str, err: Error) -> Error {
        match err {
            Error::Transport {
                status: Some(404), ..
            } => Error::not_found(&self.kind, id),
            other => other,
        }
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn with_headers<B>(mut request: ureq::RequestBuilder<B>, headers: &Headers) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

fn execute(
    agent: &ureq::Agent,
    method: Method,
    url: &str,
    headers: &Headers,
    body: Option<Value>,
) -> Result<Option<Value>> {
    let transport = |e: ureq::Error| match e {
        ureq::Error::StatusCode(status) => Error::Transport {
            url: url.to_string(),
            status: Some(status),
            message: format!("{} returned {status}", method.as_str()),
        },
        other => Error::Transport {
            url: url.to_string(),
            status: None,
            message: other.to_string(),
        },
    };

    let body = body.unwrap_or(Value::Null);
    let response = match method {
        Method::Get => with_headers(agent.get(url), headers).call(),
        Method::Delete => with_headers(agent.delete(url), headers).call(),
        Method::Post => with_headers(agent.post(url), headers).send_json(&body),
        Method::Put => with_headers(agent.put(url), headers).send_json(&body),
    }
    .map_err(transport)?;

    if response.status().as_u16() == 204 {
        return Ok(None);
    }
    let text = response.into_body().read_to_string().map_err(transport)?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(&text).map_err(|e| Error::Transport {
        url: url.to_string(),
        status: None,
        message: format!("response is not JSON: {e}"),
    })?;
    Ok(Some(value))
}

#[async_trait]
impl<T: Entity> CrudService<T> for RestService<T> {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn create(&self, entity: &T) -> Result<String> {
        let payload = wire::to_value(entity)?;
        let url = self.collection_url.clone();
        let response = self.send(Method::Post, url.clone(), Some(payload)).await?;
        let stub: Stub = response
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| Error::Transport {
                url: url.clone(),
                status: None,
                message: format!("unexpected create response: {e}"),
            })?
            .ok_or_else(|| Error::Transport {
                url,
                status: None,
                message: "create response carried no identifier".to_string(),
            })?;
        Ok(stub.id)
    }

    async fn update(&self, id: &str, entity: &T) -> Result<()> {
        let payload = wire::to_value(entity)?;
        self.send(Method::Put, self.item_url(id), Some(payload))
            .await
            .map_err(|e| self.classify(id, e))?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.send(Method::Delete, self.item_url(id), None)
            .await
            .map_err(|e| self.classify(id, e))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<T> {
        let document = self
            .send(Method::Get, self.item_url(id), None)
            .await
            .map_err(|e| self.classify(id, e))?
            .ok_or_else(|| Error::not_found(&self.kind, id))?;
        Ok(wire::from_value(document)?)
    }

    async fn list(&self) -> Result<Vec<Stub>> {
        let url = self.collection_url.clone();
        let Some(document) = self.send(Method::Get, url.clone(), None).await? else {
            return Ok(Vec::new());
        };
        let list: StubList = serde_json::from_value(document).map_err(|e| Error::Transport {
            url,
            status: None,
            message: format!("unexpected list response: {e}"),
        })?;
        Ok(list.values)
    }
}

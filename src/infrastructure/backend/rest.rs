use async_trait::async_trait;
use reqwest::{header::HeaderValue, Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use url::Url;
use zeroize::Zeroizing;

use crate::{
    backend::{query::Query, store::TableStore},
    errors::BackendError,
};

const UNIQUE_VIOLATION: &str = "23505";

/// PostgREST client for the hosted row store.
#[derive(Clone)]
pub struct RestTableStore {
    client: Client,
    base_url: Url,
    anon_key: Zeroizing<String>,
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl RestTableStore {
    pub fn new(client: Client, base_url: &str, anon_key: &str) -> Result<Self, BackendError> {
        Ok(RestTableStore {
            client,
            base_url: normalize_base(base_url)?,
            anon_key: Zeroizing::new(anon_key.to_string()),
        })
    }

    fn request(&self, method: Method, query: &Query) -> Result<RequestBuilder, BackendError> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{}", query.table))
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            if method == Method::GET {
                pairs.append_pair("select", &query.select_clause());
            }
            for (key, value) in query.query_pairs() {
                pairs.append_pair(&key, &value);
            }
        }

        let bearer = query.bearer.as_deref().unwrap_or(self.anon_key.as_str());
        let mut builder = self
            .client
            .request(method.clone(), url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(bearer);

        if method != Method::GET {
            let prefer = if query.returning { "return=representation" } else { "return=minimal" };
            builder = builder.header("Prefer", HeaderValue::from_static(prefer));
        }
        Ok(builder)
    }

    async fn rows(response: Response) -> Result<Vec<Value>, BackendError> {
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Vec::new());
            }
            return Ok(serde_json::from_slice(&body)?);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<PostgrestError> = serde_json::from_str(&body).ok();

        match parsed {
            Some(err) if err.code.as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(BackendError::UniqueViolation(
                    err.details.or(err.message).unwrap_or_else(|| "unique constraint".into()),
                ))
            }
            Some(err) => Err(BackendError::Rejected {
                status: status.as_u16(),
                message: err.message.unwrap_or(body),
            }),
            None => Err(BackendError::Rejected {
                status: status.as_u16(),
                message: body,
            }),
        }
    }
}

#[async_trait]
impl TableStore for RestTableStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        let response = self.request(Method::GET, query)?.send().await?;
        Self::rows(response).await
    }

    async fn insert(&self, query: &Query, rows: Vec<Value>) -> Result<Vec<Value>, BackendError> {
        let response = self
            .request(Method::POST, query)?
            .json(&rows)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError> {
        let response = self
            .request(Method::PATCH, query)?
            .json(&patch)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        let response = self.request(Method::DELETE, query)?.send().await?;
        Self::rows(response).await
    }
}

/// Parses the project URL, making sure it ends with a slash so that relative
/// joins keep the full path.
pub fn normalize_base(base_url: &str) -> Result<Url, BackendError> {
    let mut raw = base_url.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| BackendError::Transport(format!("invalid backend URL: {}", e)))
}

// src/fetch/mod.rs

use reqwest::{header::CONTENT_TYPE, Client};
use std::{future::Future, time::Duration};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub mod urls;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What the fetcher needs to know about an HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: BoxError,
    },
    #[error("{url} answered with status {status}")]
    Status { url: Url, status: u16 },
    #[error("{url} did not return html (content-type {content_type:?})")]
    NotHtml {
        url: Url,
        content_type: Option<String>,
    },
}

/// A single-shot HTTP GET. Implemented by `ReqwestTransport` in production
/// and by fakes in tests.
pub trait Transport {
    fn get(&self, url: &Url) -> impl Future<Output = Result<RawResponse, BoxError>> + Send;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, BoxError> {
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?.to_vec();
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

/// GET `url` once and return the body if it is a 200 HTML page.
pub async fn fetch_html<T: Transport>(transport: &T, url: &Url) -> Result<Vec<u8>, FetchError> {
    debug!(%url, "fetching");
    let resp = match transport.get(url).await {
        Ok(r) => r,
        Err(source) => {
            warn!("Error during requests to {} : {}", url, source);
            return Err(FetchError::Transport {
                url: url.clone(),
                source,
            });
        }
    };

    if resp.status != 200 {
        return Err(FetchError::Status {
            url: url.clone(),
            status: resp.status,
        });
    }
    if !is_html(resp.content_type.as_deref()) {
        return Err(FetchError::NotHtml {
            url: url.clone(),
            content_type: resp.content_type,
        });
    }
    Ok(resp.body)
}

fn is_html(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("html"))
}

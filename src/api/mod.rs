pub mod auth;
pub mod middleware;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use log::trace;
use reqwest::{header, Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::{
    config::Config,
    error::{Error, Result},
};

use middleware::LogFailures;

const CLIENT_INFO: &str = concat!("rollermate/", env!("CARGO_PKG_VERSION"));

/// Shared transport for every backend service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    semaphore: Arc<Semaphore>,
    base: String,
    anon_key: String,
    retries: u32,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_options(config.url(), config.anon_key(), config.limit(), config.retries())
    }

    pub fn with_options(base: &str, anon_key: &str, limit: usize, retries: u32) -> Self {
        Self {
            client: Client::new(),
            semaphore: Arc::new(Semaphore::new(limit.max(1))),
            base: base.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            retries,
        }
    }

    async fn client(&self) -> Result<(ClientWithMiddleware, SemaphorePermit)> {
        let semaphore = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| Error::Network("request pool closed".to_string()))?;
        Ok((self.client_without_semaphore(), semaphore))
    }

    fn client_without_semaphore(&self) -> ClientWithMiddleware {
        let builder = ClientBuilder::new(self.client.clone()).with(LogFailures);
        if self.retries == 0 {
            return builder.build();
        }

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(self.retries);
        builder
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Attach the API key, and the session token when there is one.
    fn wrap_request(&self, builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let bearer = token.filter(|t| !t.is_empty()).unwrap_or(&self.anon_key);
        builder
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
            .header("X-Client-Info", CLIENT_INFO)
    }

    /// Send a request and collect the status and the whole body.
    pub async fn send<F>(&self, token: Option<&str>, build: F) -> Result<(StatusCode, Vec<u8>)>
    where
        F: FnOnce(&ClientWithMiddleware) -> RequestBuilder,
    {
        let (client, _semaphore) = self.client().await?;
        let request = self.wrap_request(build(&client), token);
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if log::log_enabled!(log::Level::Trace) {
            trace!("{} {}", status, String::from_utf8_lossy(&body));
        }

        Ok((status, body))
    }
}

use std::fmt::Display;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

use super::ApiClient;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Relational query against one table of the REST endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            params: vec![],
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        let value = urlencoding::encode(&value.to_string()).into_owned();
        self.params.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.params.push(("order".to_string(), format!("{}.desc", column)));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.params.push(("limit".to_string(), limit.to_string()));
        self
    }

    pub fn path(&self) -> String {
        let mut path = format!("rest/v1/{}", self.table);
        for (index, (key, value)) in self.params.iter().enumerate() {
            path.push(if index == 0 { '?' } else { '&' });
            path.push_str(key);
            path.push('=');
            path.push_str(value);
        }
        path
    }
}

/// Client of the relational REST endpoint (`/rest/v1`).
#[derive(Debug, Clone)]
pub struct RestClient {
    inner: ApiClient,
}

impl RestClient {
    pub fn new(inner: ApiClient) -> Self {
        Self { inner }
    }

    pub async fn select<T: DeserializeOwned>(&self, token: &str, query: &Query) -> Result<Vec<T>> {
        let url = self.inner.endpoint(&query.path());
        let (status, body) = self
            .inner
            .send(Some(token), |client| client.get(&url))
            .await?;

        if !status.is_success() {
            return Err(Error::from_response(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Exactly one row, `NotFound` otherwise.
    pub async fn select_single<T: DeserializeOwned>(&self, token: &str, query: &Query) -> Result<T> {
        let url = self.inner.endpoint(&query.path());
        let (status, body) = self
            .inner
            .send(Some(token), |client| {
                client.get(&url).header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            })
            .await?;

        if !status.is_success() {
            return Err(Error::from_response(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn insert<T: Serialize + Sync>(&self, token: &str, table: &str, rows: &[T]) -> Result<()> {
        let url = self.inner.endpoint(&Query::table(table).path());
        let (status, body) = self
            .inner
            .send(Some(token), |client| {
                client
                    .post(&url)
                    .header("Prefer", "return=minimal")
                    .json(rows)
            })
            .await?;

        if !status.is_success() {
            return Err(Error::from_response(status, &body));
        }
        Ok(())
    }

    /// Delete matching rows and return what was deleted.
    pub async fn delete<T: DeserializeOwned>(&self, token: &str, query: &Query) -> Result<Vec<T>> {
        let url = self.inner.endpoint(&query.path());
        let (status, body) = self
            .inner
            .send(Some(token), |client| {
                client
                    .delete(&url)
                    .header("Prefer", "return=representation")
            })
            .await?;

        if !status.is_success() {
            return Err(Error::from_response(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

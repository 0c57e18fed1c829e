use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Client for the PostgREST-style document store holding users, doctors
/// and appointments.
pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StoreClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_api_key.clone(),
        }
    }

    fn get_headers(&self, returning: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.api_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).unwrap(),
        );

        if returning {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        headers
    }

    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making store request to {}", url);

        let returning = matches!(method, Method::POST | Method::PATCH);
        let headers = self.get_headers(returning);

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        Ok(response)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(method, path, body).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Select rows from a table. Filters are raw PostgREST query parts,
    /// e.g. `doctor_id=eq.<uuid>` or `specialization=ilike.*cardio*`.
    pub async fn select<T>(
        &self,
        table: &str,
        filters: &[String],
        order: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut parts: Vec<String> = filters.to_vec();
        if let Some(order_by) = order {
            parts.push(format!("order={}", order_by));
        }
        if let Some(n) = limit {
            parts.push(format!("limit={}", n));
        }

        let path = if parts.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, parts.join("&"))
        };

        self.request(Method::GET, &path, None).await
    }

    /// Insert a row, returning the stored representation.
    pub async fn insert<T>(&self, table: &str, body: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}", table);
        let rows: Vec<T> = self.request(Method::POST, &path, Some(body)).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no rows", table))
    }

    /// Update rows matching the filters, returning the updated representations.
    pub async fn update<T>(&self, table: &str, filters: &[String], body: Value) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?{}", table, filters.join("&"));
        self.request(Method::PATCH, &path, Some(body)).await
    }

    /// Delete rows matching the filters. The store replies with no body.
    pub async fn delete(&self, table: &str, filters: &[String]) -> Result<()> {
        let path = format!("/rest/v1/{}?{}", table, filters.join("&"));
        self.execute(Method::DELETE, &path, None).await?;
        Ok(())
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

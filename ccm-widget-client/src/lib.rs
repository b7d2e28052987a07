/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! HTTP client for the CCM widget endpoints.
//!
//! Fetches the widget configuration and the pre-chat form bodies. Every
//! failure (network, status, malformed body) comes back as a typed
//! [`FetchError`]; nothing is swallowed.
//!
//! # Example
//!
//! ```no_run
//! use ccm_widget_client::ApiClient;
//!
//! # async fn example() -> Result<(), ccm_widget_client::FetchError> {
//! let ccm = ApiClient::new("https://ccm.example.com");
//! let config = ccm.widget_config("widget-42").await?;
//! println!("Dialing {}", config.dialer.dialer_uri);
//!
//! let forms = ApiClient::new("https://forms.example.com");
//! let form = forms.pre_chat_form("pre-chat").await?;
//! println!("{}", form.as_value());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod forms;
pub mod widget_config;

pub use ccm_widget_types;
pub use error::FetchError;

use log::debug;
use reqwest::Client;
use serde_json::Value;

/// A typed client for one CCM base URL.
///
/// The widget configuration and the forms are usually served by different
/// hosts; create one client per base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Create a new client pointing at the given base URL.
    ///
    /// # Arguments
    ///
    /// * `base_url` - e.g. `"https://ccm.example.com/ccm"`
    pub fn new(base_url: &str) -> Self {
        Self::with_http_client(base_url, Client::new())
    }

    /// Create a client that reuses an existing `reqwest` connection pool.
    pub fn with_http_client(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` under the base URL and parse the body as JSON.
    pub(crate) async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url(path)?;
        debug!("GET {url}");
        let response = self.http.get(&url).send().await?;
        parse_json_response(response).await
    }

    fn url(&self, path: &str) -> Result<String, FetchError> {
        if self.base_url.is_empty() {
            return Err(FetchError::InvalidUrl("base URL is empty".to_string()));
        }
        let url = format!("{}{}", self.base_url, path);
        reqwest::Url::parse(&url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(url)
    }
}

/// Reject an empty identifier or one that would escape its path segment.
pub(crate) fn path_segment<'a>(name: &str, value: &'a str) -> Result<&'a str, FetchError> {
    if value.is_empty() {
        return Err(FetchError::InvalidUrl(format!("{name} is empty")));
    }
    if value.contains(['/', '?', '#']) {
        return Err(FetchError::InvalidUrl(format!(
            "{name} '{value}' is not a single path segment"
        )));
    }
    Ok(value)
}

/// Parse a JSON body, mapping non-2xx statuses to [`FetchError::Status`].
pub(crate) async fn parse_json_response(response: reqwest::Response) -> Result<Value, FetchError> {
    let status = response.status().as_u16();
    match status {
        200..=299 => {
            let text = response.text().await?;
            Ok(serde_json::from_str(&text)?)
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(FetchError::Status { status, body })
        }
    }
}

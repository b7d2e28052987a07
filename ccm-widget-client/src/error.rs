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

//! Error types for the widget API client.

use ccm_widget_types::DecodeError;
use thiserror::Error;

/// A failed fetch from [`ApiClient`](crate::ApiClient).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("Fetch failed ({status}): {body}")]
    Status { status: u16, body: String },

    /// A network or transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The body was not JSON.
    #[error("Malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The body was JSON but did not match the expected schema.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The base URL or an identifier could not form a valid request URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Returns the HTTP status code if the server rejected the request.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

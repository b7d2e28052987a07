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

//! Boundary decoding errors.

use thiserror::Error;

/// Raised when a JSON value does not match the schema expected for a
/// message kind.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The value is structurally wrong for `kind`.
    #[error("invalid {kind} payload: {source}")]
    Schema {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A required field was present but empty.
    #[error("invalid {kind} payload: `{field}` must not be empty")]
    EmptyField {
        kind: &'static str,
        field: &'static str,
    },
}

impl DecodeError {
    pub(crate) fn schema(kind: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Schema { kind, source }
    }
}

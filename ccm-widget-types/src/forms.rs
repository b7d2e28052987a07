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

//! Pre-chat form bodies served by the form service.
//!
//! The form schema is owned by the backend and rendered by the widget, so
//! both types carry the body verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `GET /forms/{form_id}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct FormDefinition(pub Value);

/// Body of `GET /formValidation`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct FormValidation(pub Value);

impl FormDefinition {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl FormValidation {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

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

//! Pre-chat form endpoints: `/forms/{form_id}` and `/formValidation`.

use ccm_widget_types::{FormDefinition, FormValidation};

use crate::error::FetchError;
use crate::{path_segment, ApiClient};

impl ApiClient {
    /// Fetch a pre-chat form definition.
    ///
    /// Calls `GET /forms/{form_id}`.
    pub async fn pre_chat_form(&self, form_id: &str) -> Result<FormDefinition, FetchError> {
        let form_id = path_segment("form id", form_id)?;
        let path = format!("/forms/{form_id}");
        Ok(FormDefinition(self.get_json(&path).await?))
    }

    /// Fetch the validation rules applied to pre-chat form fields.
    ///
    /// Calls `GET /formValidation`.
    pub async fn form_validation(&self) -> Result<FormValidation, FetchError> {
        Ok(FormValidation(self.get_json("/formValidation").await?))
    }
}

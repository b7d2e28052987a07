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

//! Widget configuration endpoint: `/widget-configs/{widget_identifier}`.

use ccm_widget_types::WidgetConfig;
use log::info;

use crate::error::FetchError;
use crate::{path_segment, ApiClient};

impl ApiClient {
    /// Fetch the widget configuration and derive the dialer settings.
    ///
    /// Calls `GET /widget-configs/{widget_identifier}`. The returned value
    /// keeps the raw body alongside the typed `webRtc` section, so callers
    /// that render other parts of the configuration still have them.
    pub async fn widget_config(&self, widget_identifier: &str) -> Result<WidgetConfig, FetchError> {
        let widget_identifier = path_segment("widget identifier", widget_identifier)?;
        let path = format!("/widget-configs/{widget_identifier}");
        let body = self.get_json(&path).await?;
        let config = WidgetConfig::from_value(body)?;
        info!(
            "Loaded widget config '{widget_identifier}' (dialer {}, sip logs {})",
            config.dialer.dialer_uri, config.dialer.enable_logs
        );
        Ok(config)
    }
}

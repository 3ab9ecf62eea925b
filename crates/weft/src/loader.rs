//! Remote template and data loading.

use serde_json::{Map, Value};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::template::TemplateDef;

impl Engine {
    /// Fetch a remote template and parse it into a detached definition.
    ///
    /// A non-success status, or markup that cannot be parsed, is logged and
    /// yields an empty definition. Nothing is cached: every call fetches.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn fetch_template(&self, url: &str) -> Result<TemplateDef, EngineError> {
        let response = self.fetcher.fetch(url).await?;
        if !response.is_success() {
            tracing::warn!(url = %url, status = response.status, "Failed to fetch template");
            return Ok(TemplateDef::empty(&self.dom));
        }

        match self.dom.parse_fragment(&response.body) {
            Ok(content) => {
                tracing::debug!(url = %url, "Fetched template");
                Ok(TemplateDef::new(content))
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to parse template markup");
                Ok(TemplateDef::empty(&self.dom))
            }
        }
    }

    /// Fetch remote JSON data.
    ///
    /// A non-success status is logged and yields an empty object.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and bodies that are not valid JSON.
    pub async fn fetch_data(&self, url: &str) -> Result<Value, EngineError> {
        let response = self.fetcher.fetch(url).await?;
        if !response.is_success() {
            tracing::warn!(url = %url, status = response.status, "Failed to fetch data");
            return Ok(Value::Object(Map::new()));
        }
        tracing::debug!(url = %url, "Fetched data");
        Ok(serde_json::from_str(&response.body)?)
    }
}

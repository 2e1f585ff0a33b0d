use super::{NimApi, Query, KEY_ERROR_SENTINEL};
use crate::bootstrap::{LoadContext, LoadedModule, ModuleSource, ScriptModuleLoader};
use crate::ui::SharedUi;
use nimlink_common::{Error, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Request timeout for NIM API queries
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the contents of `nim.key`.
pub const KEY_HEADER: &str = "X-NIM-API-KEY";

/// Alert shown once when the server rejects the auth token.
pub const KEY_REJECTED_MESSAGE: &str =
    "NIM API key rejected. Please check your API key and try again.";

/// [`NimApi`] over HTTP.
pub struct HttpNimApi {
    client: Client,
    url: String,
    token: String,
    ui: SharedUi,
}

impl HttpNimApi {
    pub fn new(url: impl Into<String>, token: impl Into<String>, ui: SharedUi) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            url: url.into(),
            token: token.into(),
            ui,
        }
    }

    fn key_rejected(&self) -> Value {
        self.ui.alert(KEY_REJECTED_MESSAGE);
        Value::String(KEY_ERROR_SENTINEL.to_string())
    }
}

impl NimApi for HttpNimApi {
    fn query(&self, query: &Query) -> Result<Value> {
        let mut request = self.client.get(&self.url).query(&query.pairs());
        if !self.token.is_empty() {
            request = request.header(KEY_HEADER, &self.token);
        }

        tracing::debug!("NIM query {} -> {}", query.name(), self.url);
        let response = request
            .send()
            .map_err(|e| Error::unreachable(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::warn!("NIM API answered {} to {}", status, query.name());
            return Ok(self.key_rejected());
        }
        if !status.is_success() {
            return Err(Error::unreachable(format!("{} answered {}", self.url, status)));
        }

        let body = response
            .text()
            .map_err(|e| Error::unreachable(format!("{}: {}", self.url, e)))?;
        let body = body.trim();
        if body == KEY_ERROR_SENTINEL || body == format!("\"{KEY_ERROR_SENTINEL}\"") {
            tracing::warn!("NIM API rejected the key for {}", query.name());
            return Ok(self.key_rejected());
        }

        serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("{} response: {}", query.name(), e)))
    }
}

/// Loader for the API member that binds it to the configured endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpApiLoader;

impl ScriptModuleLoader for HttpApiLoader {
    fn load(&self, source: &ModuleSource, ctx: &LoadContext<'_>) -> Result<LoadedModule> {
        tracing::debug!("Binding {} to {}", source.name(), ctx.config.api_url);
        Ok(LoadedModule::Api(Box::new(HttpNimApi::new(
            ctx.config.api_url.clone(),
            ctx.auth_token,
            ctx.ui.clone(),
        ))))
    }
}

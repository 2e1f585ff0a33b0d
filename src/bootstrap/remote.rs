//! Deferred activation of a validated script bundle.

use super::manifest::ScriptBundleManifest;
use super::modules::{LoadContext, ModuleRegistry, ModuleSource};
use super::ConfigError;
use crate::api::{Handshake, Query, TEST_API_QUERY};
use crate::panel::{PanelAction, PanelHandle, UserIdentity};

/// Why a launch ended without a panel and without a new dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The endpoint rejected the auth token; the query layer reported it.
    AuthRejected,
    /// The panel declined to open and reported why.
    PanelDeclined,
}

/// Result of [`RemoteScripts::launch`].
#[derive(Debug)]
pub enum LaunchOutcome {
    /// The panel is up.
    Ready(PanelHandle),
    /// Recoverable: prompt for corrected preferences.
    ConfigError(ConfigError),
    /// Unrecoverable: show this message once and stop.
    Failed(String),
    /// Stop without any further dialog.
    Aborted(AbortReason),
}

/// A bundle whose members are all present, ready to activate.
///
/// Validation happens once when this is built; [`RemoteScripts::launch`] can
/// then be retried without re-reading the bundle.
#[derive(Debug, Clone)]
pub struct RemoteScripts {
    manifest: ScriptBundleManifest,
    api_source: ModuleSource,
    panel_source: ModuleSource,
}

impl RemoteScripts {
    pub(crate) fn new(
        manifest: ScriptBundleManifest,
        api_source: ModuleSource,
        panel_source: ModuleSource,
    ) -> Self {
        Self {
            manifest,
            api_source,
            panel_source,
        }
    }

    pub fn manifest(&self) -> &ScriptBundleManifest {
        &self.manifest
    }

    pub fn api_source(&self) -> &ModuleSource {
        &self.api_source
    }

    pub fn panel_source(&self) -> &ModuleSource {
        &self.panel_source
    }

    /// Load the API module, run the handshake, then load and open the panel.
    pub fn launch(
        &self,
        registry: &ModuleRegistry,
        ctx: &LoadContext<'_>,
        user: &UserIdentity,
        action: PanelAction,
    ) -> LaunchOutcome {
        let api = match registry.load(&self.api_source, ctx).map(|m| m.into_api()) {
            Ok(Ok(api)) => api,
            Ok(Err(found)) => {
                return script_load_failed(format!(
                    "{} provides {} instead of query",
                    self.api_source.name(),
                    found
                ))
            }
            Err(e) => return script_load_failed(e.to_string()),
        };

        match Handshake::decode(api.query(&Query::new(TEST_API_QUERY))) {
            Handshake::Ok(_) => {
                tracing::info!(
                    "Handshake with {} succeeded ({} {})",
                    ctx.config.api_url,
                    self.api_source.name(),
                    self.api_source.version().unwrap_or("unversioned")
                );
            }
            Handshake::AuthError => {
                tracing::warn!("NIM API rejected the stored key");
                return LaunchOutcome::Aborted(AbortReason::AuthRejected);
            }
            Handshake::Malformed(detail) => {
                tracing::warn!("Handshake with {} failed: {}", ctx.config.api_url, detail);
                return LaunchOutcome::ConfigError(ConfigError::ApiNotFound {
                    url: ctx.config.api_url.clone(),
                    detail,
                });
            }
        }

        let panel = match registry.load(&self.panel_source, ctx).map(|m| m.into_panel()) {
            Ok(Ok(panel)) => panel,
            Ok(Err(found)) => {
                return script_load_failed(format!(
                    "{} provides {} instead of build-panel",
                    self.panel_source.name(),
                    found
                ))
            }
            Err(e) => return script_load_failed(e.to_string()),
        };

        tracing::info!(
            "Opening {} panel for {} ({})",
            self.manifest.host(),
            user.name,
            action
        );
        match panel.build_panel(&*api, user, action) {
            Some(handle) => LaunchOutcome::Ready(handle),
            None => LaunchOutcome::Aborted(AbortReason::PanelDeclined),
        }
    }
}

fn script_load_failed(detail: String) -> LaunchOutcome {
    tracing::error!("Script loading failed: {}", detail);
    LaunchOutcome::Failed(format!("Error: Script loading failed! ({detail})"))
}

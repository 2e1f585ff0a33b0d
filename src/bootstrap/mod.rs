//! Bootstrap of a host panel from a remote script bundle.
//!
//! The bootstrap reads the preferences, resolves and validates the script
//! bundle, performs the `testAPI` handshake, and hands control to the panel.
//! Every recoverable problem routes to the preferences prompt; after the user
//! confirms new values the run starts over.
//!
//! ```text
//! Start -> ValidatingPath -> {ConfigError | ValidatingManifest}
//!       -> {ConfigError | AwaitingHandshake} -> {ConfigError | Ready | Aborted}
//! ConfigError -> Start (confirmed) | Aborted (cancelled)
//! ```
//!
//! # Module layout
//!
//! - [`config`] -- Host application and derived bootstrap settings.
//! - [`manifest`] -- Bundle directory resolution and member checks.
//! - [`modules`] -- Loader registry for bundle members.
//! - [`remote`] -- Handshake and panel activation.

pub mod config;
pub mod manifest;
pub mod modules;
pub mod remote;

pub use config::{BootstrapConfig, HostApp};
pub use manifest::{check_scripts_dir, ScriptBundleManifest, API_MODULE, PANEL_MODULE};
pub use modules::{
    Capability, LoadContext, LoadedModule, ModuleRegistry, ModuleSource, ScriptModuleLoader,
};
pub use remote::{AbortReason, LaunchOutcome, RemoteScripts};

use crate::panel::{PanelAction, PanelHandle, UserIdentity};
use crate::ui::{PrefsPrompt, SharedUi};
use nimlink_prefs::{PreferencesRecord, PrefsStore};

/// Alert shown when the user cancels the preferences prompt.
pub const PROMPT_CANCELLED_MESSAGE: &str =
    "Your files won't be connected to NIM until you have a valid preferences file.";

/// Alert shown when confirmed preferences cannot be written.
pub const SAVE_FAILED_MESSAGE: &str = "Error: Unable to save NIM preferences.";

/// A recoverable configuration problem. The message is shown in the
/// preferences prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("The scripts path in NIM preferences doesn't exist ({path}); it should be the path to a valid directory containing NIM's script files.")]
    ScriptsDirMissing { path: String },

    #[error("Your scripts folder is missing the following files: {}", .0.join(", "))]
    MissingMembers(Vec<String>),

    #[error("The NIM API was not found at given URL; please provide a valid URL to NIM's API.")]
    ApiNotFound { url: String, detail: String },
}

/// Where a bootstrap run currently is.
#[derive(Debug)]
pub enum BootstrapState {
    /// Read preferences from disk, or use values the user just entered.
    Start { entered: Option<PreferencesRecord> },
    ValidatingPath(BootstrapConfig),
    ValidatingManifest(BootstrapConfig),
    AwaitingHandshake(BootstrapConfig, RemoteScripts),
    /// Prompt the user, pre-filled with `known`.
    ConfigError {
        known: PreferencesRecord,
        message: String,
    },
    Ready(PanelHandle),
    Aborted,
}

impl BootstrapState {
    pub fn initial() -> Self {
        Self::Start { entered: None }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Aborted)
    }

    fn config_error(config: &BootstrapConfig, error: ConfigError) -> Self {
        Self::ConfigError {
            known: config.to_record(),
            message: error.to_string(),
        }
    }
}

/// Drives one bootstrap run for a host application.
///
/// All collaborators are passed in; the bootstrap keeps no state between
/// runs.
pub struct Bootstrap<'a> {
    store: &'a PrefsStore,
    registry: &'a ModuleRegistry,
    ui: SharedUi,
    host: HostApp,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        store: &'a PrefsStore,
        registry: &'a ModuleRegistry,
        ui: SharedUi,
        host: HostApp,
    ) -> Self {
        Self {
            store,
            registry,
            ui,
            host,
        }
    }

    /// Run until the panel is up or the run is abandoned.
    ///
    /// Returns `None` on failure; the user has been told why exactly once,
    /// or not at all when the query layer already reported it.
    pub fn run(&self, user: &UserIdentity, action: PanelAction) -> Option<PanelHandle> {
        let mut state = BootstrapState::initial();
        loop {
            state = self.step(state, user, action);
            match state {
                BootstrapState::Ready(handle) => return Some(handle),
                BootstrapState::Aborted => return None,
                _ => {}
            }
        }
    }

    /// Perform one transition.
    pub fn step(
        &self,
        state: BootstrapState,
        user: &UserIdentity,
        action: PanelAction,
    ) -> BootstrapState {
        match state {
            BootstrapState::Start { entered } => self.start(entered),
            BootstrapState::ValidatingPath(config) => match check_scripts_dir(&config) {
                Ok(()) => BootstrapState::ValidatingManifest(config),
                Err(e) => BootstrapState::config_error(&config, e),
            },
            BootstrapState::ValidatingManifest(config) => {
                match ScriptBundleManifest::resolve(&config.scripts_path, self.host).collect() {
                    Ok(scripts) => BootstrapState::AwaitingHandshake(config, scripts),
                    Err(e) => BootstrapState::config_error(&config, e),
                }
            }
            BootstrapState::AwaitingHandshake(config, scripts) => {
                self.handshake(config, &scripts, user, action)
            }
            BootstrapState::ConfigError { known, message } => self.prompt(&known, message),
            terminal @ (BootstrapState::Ready(_) | BootstrapState::Aborted) => terminal,
        }
    }

    fn start(&self, entered: Option<PreferencesRecord>) -> BootstrapState {
        let (record, diagnostic) = match entered {
            Some(record) => {
                let diagnostic = record.diagnostic();
                (record, diagnostic)
            }
            None => {
                let loaded = self.store.load();
                (loaded.record, loaded.diagnostic)
            }
        };

        if let Some(diagnostic) = diagnostic {
            return BootstrapState::ConfigError {
                known: record,
                message: diagnostic.to_string(),
            };
        }

        match BootstrapConfig::from_record(&record) {
            Some(config) => {
                tracing::info!(
                    "Bootstrapping {} from {:?} against {}",
                    self.host,
                    config.scripts_path,
                    config.api_url
                );
                BootstrapState::ValidatingPath(config)
            }
            None => BootstrapState::ConfigError {
                message: record
                    .diagnostic()
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                known: record,
            },
        }
    }

    fn handshake(
        &self,
        config: BootstrapConfig,
        scripts: &RemoteScripts,
        user: &UserIdentity,
        action: PanelAction,
    ) -> BootstrapState {
        let auth_token = self.store.read_auth_token();
        let ctx = LoadContext {
            config: &config,
            auth_token: &auth_token,
            ui: &self.ui,
        };

        match scripts.launch(self.registry, &ctx, user, action) {
            LaunchOutcome::Ready(handle) => BootstrapState::Ready(handle),
            LaunchOutcome::ConfigError(e) => BootstrapState::config_error(&config, e),
            LaunchOutcome::Failed(message) => {
                self.ui.alert(&message);
                BootstrapState::Aborted
            }
            LaunchOutcome::Aborted(reason) => {
                tracing::info!("Bootstrap aborted: {:?}", reason);
                BootstrapState::Aborted
            }
        }
    }

    fn prompt(&self, known: &PreferencesRecord, message: String) -> BootstrapState {
        let event = self.ui.prompt_preferences(&PrefsPrompt::new(message, known));
        let Some(record) = PrefsPrompt::apply(known, event) else {
            self.ui.alert(PROMPT_CANCELLED_MESSAGE);
            return BootstrapState::Aborted;
        };

        if let Err(e) = self.store.save(&record) {
            tracing::error!("Failed to save preferences: {}", e);
            self.ui.alert(SAVE_FAILED_MESSAGE);
            return BootstrapState::Aborted;
        }

        BootstrapState::Start {
            entered: Some(record),
        }
    }
}

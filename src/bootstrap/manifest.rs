//! Resolution and validation of the remote script bundle.

use super::modules::ModuleSource;
use super::remote::RemoteScripts;
use super::{BootstrapConfig, ConfigError, HostApp};
use nimlink_common::paths::{trim_trailing_separators, SeparatorStyle};
use std::path::{Path, PathBuf};

/// Member providing the NIM API query function.
pub const API_MODULE: &str = "nimMain.jsx";

/// Member providing the panel entry point.
pub const PANEL_MODULE: &str = "nimPanel.jsx";

/// The required bundle members and the directory they must be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBundleManifest {
    host: HostApp,
    base_dir: String,
}

impl ScriptBundleManifest {
    /// Resolve the bundle directory for `scripts_path`.
    ///
    /// Trailing separators are stripped, then `plugins/<Host>/` is appended
    /// using the separator convention of the configured path.
    pub fn resolve(scripts_path: &str, host: HostApp) -> Self {
        let trimmed = trim_trailing_separators(scripts_path);
        let style = SeparatorStyle::detect(trimmed);
        Self {
            host,
            base_dir: style.join_dir(trimmed, &["plugins", host.folder()]),
        }
    }

    pub fn host(&self) -> HostApp {
        self.host
    }

    /// Bundle directory, ending in a separator.
    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    pub fn member_path(&self, member: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.base_dir, member))
    }

    /// Member name as shown to users, e.g. `plugins/Photoshop/nimMain.jsx`.
    pub fn display_name(&self, member: &str) -> String {
        format!("plugins/{}/{}", self.host.folder(), member)
    }

    /// Read both members, reporting every missing one, API member first.
    pub fn collect(&self) -> Result<RemoteScripts, ConfigError> {
        let api = ModuleSource::read(API_MODULE, self.member_path(API_MODULE));
        let panel = ModuleSource::read(PANEL_MODULE, self.member_path(PANEL_MODULE));

        match (api, panel) {
            (Some(api), Some(panel)) => Ok(RemoteScripts::new(self.clone(), api, panel)),
            (api, panel) => {
                let absent = [(API_MODULE, api.is_none()), (PANEL_MODULE, panel.is_none())];
                let missing: Vec<String> = absent
                    .into_iter()
                    .filter(|(_, absent)| *absent)
                    .map(|(member, _)| self.display_name(member))
                    .collect();
                tracing::warn!("Script bundle at {} is missing {:?}", self.base_dir, missing);
                Err(ConfigError::MissingMembers(missing))
            }
        }
    }
}

/// Check that the configured scripts directory exists.
pub fn check_scripts_dir(config: &BootstrapConfig) -> Result<(), ConfigError> {
    if Path::new(&config.scripts_path).is_dir() {
        Ok(())
    } else {
        tracing::warn!("Scripts path does not exist: {:?}", config.scripts_path);
        Err(ConfigError::ScriptsDirMissing {
            path: config.scripts_path.clone(),
        })
    }
}

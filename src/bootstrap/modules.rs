//! Registration and loading of script-bundle members.
//!
//! A script bundle on disk only proves which members exist; it is never
//! evaluated. Each member name is mapped to a [`ScriptModuleLoader`] that
//! turns the member's source into a typed module, and the bootstrap checks
//! that the module provides the capability its manifest slot requires.

use super::BootstrapConfig;
use crate::api::NimApi;
use crate::panel::PanelBuilder;
use crate::ui::SharedUi;
use nimlink_common::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// What a loaded module can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Answers NIM API queries.
    Query,
    /// Builds the main panel.
    BuildPanel,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => f.write_str("query"),
            Self::BuildPanel => f.write_str("build-panel"),
        }
    }
}

/// A bundle member read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    name: String,
    path: PathBuf,
    contents: String,
}

impl ModuleSource {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        contents: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Read `name` from `path`, or `None` if it does not exist.
    pub(crate) fn read(name: &str, path: PathBuf) -> Option<Self> {
        match std::fs::read(&path) {
            Ok(bytes) => Some(Self {
                name: name.to_string(),
                contents: String::from_utf8_lossy(&bytes).into_owned(),
                path,
            }),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read script {:?}: {}", path, e);
                }
                None
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// The `Version:` field of the script's header comment, if any.
    ///
    /// Only the first 20 lines are searched.
    pub fn version(&self) -> Option<&str> {
        self.contents.lines().take(20).find_map(|line| {
            let (_, rest) = line.split_once("Version:")?;
            let version = rest.trim();
            (!version.is_empty()).then_some(version)
        })
    }
}

/// A loaded bundle member.
pub enum LoadedModule {
    Api(Box<dyn NimApi>),
    Panel(Box<dyn PanelBuilder>),
}

impl LoadedModule {
    pub fn capability(&self) -> Capability {
        match self {
            Self::Api(_) => Capability::Query,
            Self::Panel(_) => Capability::BuildPanel,
        }
    }

    /// The API module, or the capability actually provided.
    pub fn into_api(self) -> std::result::Result<Box<dyn NimApi>, Capability> {
        match self {
            Self::Api(api) => Ok(api),
            other => Err(other.capability()),
        }
    }

    /// The panel module, or the capability actually provided.
    pub fn into_panel(self) -> std::result::Result<Box<dyn PanelBuilder>, Capability> {
        match self {
            Self::Panel(panel) => Ok(panel),
            other => Err(other.capability()),
        }
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LoadedModule").field(&self.capability()).finish()
    }
}

/// Everything a loader may bind a module to.
pub struct LoadContext<'a> {
    pub config: &'a BootstrapConfig,
    pub auth_token: &'a str,
    pub ui: &'a SharedUi,
}

/// Turns a bundle member into a module.
pub trait ScriptModuleLoader {
    fn load(&self, source: &ModuleSource, ctx: &LoadContext<'_>) -> Result<LoadedModule>;
}

impl<F> ScriptModuleLoader for F
where
    F: Fn(&ModuleSource, &LoadContext<'_>) -> Result<LoadedModule>,
{
    fn load(&self, source: &ModuleSource, ctx: &LoadContext<'_>) -> Result<LoadedModule> {
        self(source, ctx)
    }
}

/// Loaders keyed by bundle member name.
///
/// Registering a name twice replaces the earlier loader.
#[derive(Default)]
pub struct ModuleRegistry {
    loaders: Vec<(String, Box<dyn ScriptModuleLoader>)>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        member: impl Into<String>,
        loader: impl ScriptModuleLoader + 'static,
    ) {
        let member = member.into();
        self.loaders.retain(|(name, _)| *name != member);
        self.loaders.push((member, Box::new(loader)));
    }

    pub fn contains(&self, member: &str) -> bool {
        self.loaders.iter().any(|(name, _)| name == member)
    }

    /// Registered member names, in registration order.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.loaders.iter().map(|(name, _)| name.as_str())
    }

    /// Load `source` with the loader registered for its name.
    pub fn load(&self, source: &ModuleSource, ctx: &LoadContext<'_>) -> Result<LoadedModule> {
        let (_, loader) = self
            .loaders
            .iter()
            .find(|(name, _)| name == source.name())
            .ok_or_else(|| Error::module_load(source.name(), "no loader registered"))?;

        let module = loader.load(source, ctx)?;
        tracing::debug!(
            "Loaded {} ({}) from {:?}",
            source.name(),
            source.version().unwrap_or("unversioned"),
            source.path()
        );
        Ok(module)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.members()).finish()
    }
}

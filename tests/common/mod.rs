//! Shared test harness for integration tests.
//!
//! Provides [`RecordingUi`], which counts every dialog the bootstrap shows,
//! [`ScriptedApi`] for canned NIM responses, and [`Fixture`], which lays out
//! a preferences directory and a script bundle in a temp dir.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use nimlink::api::{NimApi, Query};
use nimlink::bootstrap::{
    HostApp, LoadContext, LoadedModule, ModuleRegistry, ModuleSource, ScriptModuleLoader,
    API_MODULE, PANEL_MODULE,
};
use nimlink::panel::{PanelAction, PanelBuilder, PanelHandle, UserIdentity};
use nimlink::ui::{HostUi, PrefsPrompt, PromptEvent, SharedUi};
use nimlink_common::Result;
use nimlink_prefs::{PrefsPaths, PrefsStore};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Host UI that records every dialog and answers prompts from a script.
///
/// Prompts beyond the scripted answers are cancelled.
#[derive(Default)]
pub struct RecordingUi {
    alerts: Mutex<Vec<String>>,
    prompts: Mutex<Vec<PrefsPrompt>>,
    answers: Mutex<VecDeque<PromptEvent>>,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answering(answers: impl IntoIterator<Item = PromptEvent>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        })
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<PrefsPrompt> {
        self.prompts.lock().unwrap().clone()
    }

    /// Alerts plus prompts.
    pub fn dialog_count(&self) -> usize {
        self.alerts.lock().unwrap().len() + self.prompts.lock().unwrap().len()
    }
}

impl HostUi for RecordingUi {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn prompt_preferences(&self, prompt: &PrefsPrompt) -> PromptEvent {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PromptEvent::Cancelled)
    }
}

/// Answers every query from a per-name table, recording what was asked.
#[derive(Clone, Default)]
pub struct ScriptedApi {
    responses: Arc<Mutex<Vec<(String, Value)>>>,
    queries: Arc<Mutex<Vec<Query>>>,
}

impl ScriptedApi {
    pub fn with(self, query: &str, response: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((query.to_string(), response));
        self
    }

    /// A server that passes the handshake.
    pub fn healthy() -> Self {
        Self::default().with("testAPI", json!([{ "error": "" }]))
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }
}

impl NimApi for ScriptedApi {
    fn query(&self, query: &Query) -> Result<Value> {
        self.queries.lock().unwrap().push(query.clone());
        let responses = self.responses.lock().unwrap();
        match responses.iter().find(|(name, _)| name == query.name()) {
            Some((_, value)) => Ok(value.clone()),
            None => Err(nimlink_common::Error::unreachable(format!(
                "no response for {}",
                query.name()
            ))),
        }
    }
}

/// Panel that records it was opened and echoes the action.
pub struct EchoPanel;

impl PanelBuilder for EchoPanel {
    fn build_panel(
        &self,
        _api: &dyn NimApi,
        user: &UserIdentity,
        action: PanelAction,
    ) -> Option<PanelHandle> {
        Some(PanelHandle {
            title: "NIM".to_string(),
            action,
            entries: vec![user.name.clone()],
        })
    }
}

/// Registry whose API member is `api` and whose panel member is [`EchoPanel`].
pub fn registry_with(api: ScriptedApi) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register(API_MODULE, ScriptedApiLoader(api));
    registry.register(PANEL_MODULE, echo_panel_loader);
    registry
}

/// Loader handing out clones of a [`ScriptedApi`].
pub struct ScriptedApiLoader(pub ScriptedApi);

impl ScriptModuleLoader for ScriptedApiLoader {
    fn load(&self, _source: &ModuleSource, _ctx: &LoadContext<'_>) -> Result<LoadedModule> {
        Ok(LoadedModule::Api(Box::new(self.0.clone())))
    }
}

fn echo_panel_loader(_: &ModuleSource, _: &LoadContext<'_>) -> Result<LoadedModule> {
    Ok(LoadedModule::Panel(Box::new(EchoPanel)))
}

/// Temp preferences directory plus a scripts checkout.
pub struct Fixture {
    pub dir: TempDir,
    pub store: PrefsStore,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::new(PrefsPaths::in_dir(dir.path().join(".nim")));
        Self { dir, store }
    }

    /// Root of the scripts checkout (not created until a bundle is written).
    pub fn scripts_dir(&self) -> PathBuf {
        self.dir.path().join("scripts")
    }

    pub fn scripts_path(&self) -> String {
        self.scripts_dir().to_str().unwrap().to_string()
    }

    /// Write the given bundle members for `host`.
    pub fn write_bundle(&self, host: HostApp, members: &[&str]) -> PathBuf {
        let bundle = self.scripts_dir().join("plugins").join(host.folder());
        std::fs::create_dir_all(&bundle).unwrap();
        for member in members {
            std::fs::write(
                bundle.join(member),
                format!(
                    "/* ****\n# Filename: {}/{}\n# Version:  v2.5.0.161015\n*/\n",
                    host.folder(),
                    member
                ),
            )
            .unwrap();
        }
        bundle
    }

    /// Write a full bundle for `host`.
    pub fn write_full_bundle(&self, host: HostApp) -> PathBuf {
        self.write_bundle(host, &[API_MODULE, PANEL_MODULE])
    }

    /// Write the preferences file verbatim.
    pub fn write_prefs(&self, contents: &str) {
        let paths = self.store.paths();
        std::fs::create_dir_all(&paths.dir).unwrap();
        std::fs::write(&paths.prefs_file, contents).unwrap();
    }

    /// Preferences pointing at this fixture's scripts dir and `url`.
    pub fn write_valid_prefs(&self, url: &str) {
        self.write_prefs(&format!(
            "NIM_URL={url}\nNIM_User=alice\nNIM_Scripts={}\nNIM_DebugMode=False\n",
            self.scripts_path()
        ));
    }

    pub fn prefs_contents(&self) -> String {
        std::fs::read_to_string(&self.store.paths().prefs_file).unwrap()
    }

    pub fn prefs_dir(&self) -> &Path {
        &self.store.paths().dir
    }
}

/// Cast a recording UI to the shared handle the bootstrap takes.
pub fn shared(ui: &Arc<RecordingUi>) -> SharedUi {
    ui.clone()
}

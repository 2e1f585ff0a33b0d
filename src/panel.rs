//! The panel entry point handed control after a successful handshake.

use crate::api::{NimApi, Query, KEY_ERROR_SENTINEL};
use crate::ui::SharedUi;
use nimlink_common::Error;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// What the artist asked the panel to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelAction {
    #[default]
    Open,
    SaveAs,
    VersionUp,
}

impl PanelAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::SaveAs => "saveAs",
            Self::VersionUp => "versionUp",
        }
    }
}

impl fmt::Display for PanelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "" | "open" => Ok(Self::Open),
            "saveas" => Ok(Self::SaveAs),
            "versionup" => Ok(Self::VersionUp),
            _ => Err(Error::invalid_input(format!("unknown panel action: {s}"))),
        }
    }
}

/// The artist the panel acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub name: String,
    /// NIM user ID, when already resolved.
    pub id: Option<String>,
}

impl UserIdentity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Value to send as the `u` query parameter: the ID if known, else the name.
    pub fn query_value(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

/// Handle to a panel the host is now showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelHandle {
    pub title: String,
    pub action: PanelAction,
    /// Rows the panel was populated with.
    pub entries: Vec<String>,
}

/// Builds the main panel once the API module is live.
pub trait PanelBuilder {
    /// Build and show the panel. `None` means the panel declined to open and
    /// has already told the user why.
    fn build_panel(
        &self,
        api: &dyn NimApi,
        user: &UserIdentity,
        action: PanelAction,
    ) -> Option<PanelHandle>;
}

/// Query listing the jobs a user is assigned to.
pub const USER_JOBS_QUERY: &str = "getUserJobs";

/// Row shown when a user has no jobs.
const NO_JOBS: &str = "None";

#[derive(Debug, Deserialize)]
struct JobRow {
    #[serde(rename = "ID", default)]
    id: Value,
    #[serde(default)]
    number: Value,
    #[serde(default)]
    jobname: Value,
}

impl JobRow {
    /// The placeholder row some servers put first.
    fn is_placeholder(&self) -> bool {
        match &self.id {
            Value::Number(n) => n.as_i64() == Some(0),
            Value::String(s) => s == "0",
            _ => false,
        }
    }

    fn label(&self) -> String {
        format!("{}_{}", field_text(&self.number), field_text(&self.jobname))
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Panel listing the user's jobs as `number_jobname` rows.
pub struct JobsPanel {
    ui: SharedUi,
}

impl JobsPanel {
    pub fn new(ui: SharedUi) -> Self {
        Self { ui }
    }
}

impl PanelBuilder for JobsPanel {
    fn build_panel(
        &self,
        api: &dyn NimApi,
        user: &UserIdentity,
        action: PanelAction,
    ) -> Option<PanelHandle> {
        let query = Query::new(USER_JOBS_QUERY).with("u", user.query_value());
        let value = match api.query(&query) {
            Ok(Value::String(s)) if s == KEY_ERROR_SENTINEL => return None,
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to list jobs for {}: {}", user.name, e);
                self.ui.alert(&format!("Error: Unable to load jobs. ({e})"));
                return None;
            }
        };

        let rows: Vec<JobRow> = match serde_json::from_value(value) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Unexpected {} response: {}", USER_JOBS_QUERY, e);
                self.ui.alert(&format!("Error: Unable to load jobs. ({e})"));
                return None;
            }
        };

        let skip = usize::from(rows.first().is_some_and(JobRow::is_placeholder));
        let mut entries: Vec<String> = rows.iter().skip(skip).map(JobRow::label).collect();
        if entries.is_empty() {
            entries.push(NO_JOBS.to_string());
        }

        Some(PanelHandle {
            title: "NIM".to_string(),
            action,
            entries,
        })
    }
}

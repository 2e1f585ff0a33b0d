//! Recognized preference keys and the fresh-file schema.

/// Marker preceding the scripts directory value.
pub const SCRIPTS_MARKER: &str = "NIM_Scripts=";

/// Marker preceding the API endpoint value.
pub const URL_MARKER: &str = "NIM_URL=";

pub const USER_KEY: &str = "NIM_User";
pub const DEBUG_MODE_KEY: &str = "NIM_DebugMode";

/// Keys and default values written to a freshly created preferences file,
/// in file order.
pub const DEFAULT_SCHEMA: &[(&str, &str)] = &[
    ("NIM_URL", ""),
    ("NIM_User", ""),
    ("NIM_Scripts", ""),
    ("NIM_UserScripts", ""),
    ("NIM_DebugMode", "False"),
    ("NIM_Thumbnail", ""),
];

/// Marker for an arbitrary key (`KEY=`).
pub fn marker(key: &str) -> String {
    format!("{key}=")
}

/// Key under which a host panel remembers one of its settings,
/// e.g. `Photoshop_jobID`.
pub fn app_key(app: &str, key: &str) -> String {
    format!("{app}_{key}")
}

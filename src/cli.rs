use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nimlink")]
#[command(author, version, about = "Connect host applications to a NIM server")]
pub struct Cli {
    /// Directory holding prefs.nim and nim.key (default: ~/.nim/)
    #[arg(long, global = true)]
    pub prefs_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the preferences file with default keys if it does not exist
    Init,

    /// Display the scripts path, API URL and every stored key
    Show,

    /// Update the scripts path and API URL
    Set {
        /// Root of the NIM scripts checkout
        #[arg(long)]
        scripts: String,

        /// NIM API endpoint
        #[arg(long)]
        url: String,
    },

    /// Read or write a host panel setting
    Pref {
        #[command(subcommand)]
        command: PrefCommands,
    },

    /// Validate the preferences and script bundle without contacting NIM
    Check {
        /// Host application (photoshop, premiere)
        #[arg(long, default_value = "photoshop")]
        host: String,
    },

    /// Run the full bootstrap and open the panel
    Launch {
        /// Host application (photoshop, premiere)
        #[arg(long, default_value = "photoshop")]
        host: String,

        /// NIM user (default: NIM_User from preferences)
        #[arg(long)]
        user: Option<String>,

        /// Panel action (open, saveAs, versionUp)
        #[arg(long, default_value = "open")]
        action: String,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum PrefCommands {
    /// Print `<app>_<key>`
    Get { app: String, key: String },

    /// Store `<app>_<key>=<value>`
    Set {
        app: String,
        key: String,
        value: String,
    },
}

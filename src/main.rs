mod cli;
mod console;

use nimlink::{
    api::HttpApiLoader,
    bootstrap::{
        check_scripts_dir, BootstrapConfig, LoadContext, LoadedModule, ModuleRegistry,
        ModuleSource, ScriptBundleManifest, API_MODULE, PANEL_MODULE,
    },
    panel::{JobsPanel, PanelAction, UserIdentity},
    ui::SharedUi,
    Bootstrap, HostApp,
};
use nimlink_prefs::{PreferencesRecord, PrefsPaths, PrefsStore};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, PrefCommands};
use console::ConsoleUi;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = match &cli.prefs_dir {
        Some(dir) => PrefsStore::new(PrefsPaths::in_dir(dir)),
        None => PrefsStore::open_default(),
    };

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    // or NIM_DebugMode in the preferences file
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        let debug_mode = store.read_all().map(|e| e.debug_mode()).unwrap_or(false);
        if cli.verbose || debug_mode {
            "nimlink=debug,nimlink_prefs=debug,nimlink_common=debug".to_string()
        } else {
            "nimlink=warn,nimlink_prefs=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => init_prefs(&store),
        Commands::Show => show_prefs(&store),
        Commands::Set { scripts, url } => {
            store
                .save(&PreferencesRecord::new(scripts, url))
                .context("Failed to save NIM preferences")?;
            println!("Saved {}", store.paths().prefs_file.display());
            Ok(())
        }
        Commands::Pref { command } => match command {
            PrefCommands::Get { app, key } => match store.get_pref(&app, &key) {
                Some(value) => {
                    println!("{}", value);
                    Ok(())
                }
                None => anyhow::bail!("{}_{} is not set", app, key),
            },
            PrefCommands::Set { app, key, value } => store
                .set_pref(&app, &key, &value)
                .with_context(|| format!("Failed to store {}_{}", app, key)),
        },
        Commands::Check { host } => check_bundle(&store, host.parse()?),
        Commands::Launch { host, user, action } => {
            launch(&store, host.parse()?, user, action.parse()?)
        }
        Commands::Version => {
            println!("nimlink {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_prefs(store: &PrefsStore) -> Result<()> {
    let created = store
        .ensure_file_exists()
        .context("Failed to create NIM preferences")?;
    let path = store.paths().prefs_file.display();
    if created {
        println!("Created {}", path);
    } else {
        println!("Preferences already exist at {}", path);
    }
    Ok(())
}

fn show_prefs(store: &PrefsStore) -> Result<()> {
    let loaded = store.load();
    println!("File: {}", store.paths().prefs_file.display());
    println!(
        "Scripts path: {}",
        loaded.record.scripts_path.as_deref().unwrap_or("(not set)")
    );
    println!(
        "API URL: {}",
        loaded.record.api_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "Auth key: {}",
        if store.read_auth_token().is_empty() {
            "(none)"
        } else {
            "present"
        }
    );

    if let Some(diagnostic) = loaded.diagnostic {
        println!("\n{}", diagnostic);
        return Ok(());
    }

    let entries = store.read_all()?;
    println!("\nKeys: {}", entries.len());
    for (key, value) in entries.iter() {
        println!("  {}={}", key, value);
    }

    if store.has_orphan_temp() {
        println!(
            "\nWarning: leftover {} from an interrupted save",
            store.paths().temp_file().display()
        );
    }
    Ok(())
}

fn check_bundle(store: &PrefsStore, host: HostApp) -> Result<()> {
    let loaded = store.load();
    if let Some(diagnostic) = loaded.diagnostic {
        anyhow::bail!("{}", diagnostic);
    }
    let config = BootstrapConfig::from_record(&loaded.record)
        .context("NIM preferences are incomplete")?;

    check_scripts_dir(&config)?;
    let scripts = ScriptBundleManifest::resolve(&config.scripts_path, host).collect()?;

    println!("Host: {}", host);
    println!("Bundle: {}", scripts.manifest().base_dir());
    for source in [scripts.api_source(), scripts.panel_source()] {
        println!(
            "  {} {}",
            source.name(),
            source.version().unwrap_or("(unversioned)")
        );
    }
    println!("API URL: {}", config.api_url);
    Ok(())
}

fn launch(
    store: &PrefsStore,
    host: HostApp,
    user: Option<String>,
    action: PanelAction,
) -> Result<()> {
    let user = user
        .or_else(|| {
            store
                .read_all()
                .ok()
                .and_then(|entries| entries.user().map(str::to_string))
        })
        .context("No NIM user given; pass --user or set NIM_User in preferences")?;

    let mut registry = ModuleRegistry::new();
    registry.register(API_MODULE, HttpApiLoader);
    registry.register(PANEL_MODULE, jobs_panel_loader);

    let ui: SharedUi = Arc::new(ConsoleUi);
    let bootstrap = Bootstrap::new(store, &registry, ui, host);

    let Some(panel) = bootstrap.run(&UserIdentity::named(user), action) else {
        anyhow::bail!("NIM panel was not opened");
    };

    println!("{} ({})", panel.title, panel.action);
    for entry in &panel.entries {
        println!("  {}", entry);
    }
    Ok(())
}

fn jobs_panel_loader(
    _: &ModuleSource,
    ctx: &LoadContext<'_>,
) -> nimlink_common::Result<LoadedModule> {
    Ok(LoadedModule::Panel(Box::new(JobsPanel::new(ctx.ui.clone()))))
}

//! bndedit CLI
//!
//! Entry point for the `bndedit` command-line tool.

use clap::{Parser, Subcommand};
use bndedit::settings::{host_settings_path, overlay_at, PROJECT_SETTINGS_FILE};
use bndedit::{
    EditModel, InheritanceChain, Layer, ModelSettings, Registry, ResolvedSettings, SaveReport,
};
use bndedit_header::{format_clause, ClauseFormat};
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "bndedit")]
#[command(about = "Typed, format-preserving editor for bnd files", version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); overrides log.level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Path to project settings (default: .bndedit.toml)
    #[arg(long, short = 'c', global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value of a key
    Get {
        file: PathBuf,
        key: String,

        /// Parent file to inherit from, nearest first (repeatable)
        #[arg(long = "parent", short = 'p')]
        parents: Vec<PathBuf>,

        /// Resolve through parents and macros
        #[arg(long)]
        effective: bool,

        /// Output the typed value as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a key; the value is canonicalized by the key's type
    Set {
        file: PathBuf,
        key: String,
        value: String,
    },

    /// Remove a key
    Unset { file: PathBuf, key: String },

    /// Append an item to a list-valued key
    Add {
        file: PathBuf,
        key: String,
        item: String,
    },

    /// Print the canonical document form of a value without touching a file
    Format { key: String, value: String },

    /// Show the members of a merged instruction (e.g. -plugin)
    Merge {
        file: PathBuf,
        stem: String,

        /// Parent file to inherit from, nearest first (repeatable)
        #[arg(long = "parent", short = 'p')]
        parents: Vec<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List the keys defined in a file
    Keys { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let settings = load_settings(cli.settings.as_deref(), cli.log_level.as_deref());
    init_logging(&settings.log.level);

    match cli.command {
        Commands::Get {
            file,
            key,
            parents,
            effective,
            json,
        } => run_get(&settings, &file, &key, &parents, effective, json),
        Commands::Set { file, key, value } => run_set(&settings, &file, &key, &value),
        Commands::Unset { file, key } => run_unset(&settings, &file, &key),
        Commands::Add { file, key, item } => run_add(&settings, &file, &key, &item),
        Commands::Format { key, value } => run_format(&key, &value),
        Commands::Merge {
            file,
            stem,
            parents,
            json,
        } => run_merge(&settings, &file, &stem, &parents, json),
        Commands::Keys { file } => run_keys(&settings, &file),
    }
}

fn load_settings(project: Option<&Path>, log_level: Option<&str>) -> ModelSettings {
    let host = host_settings_path();
    let project = project
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(PROJECT_SETTINGS_FILE));
    let cli = log_level.map(|level| overlay_at("log.level", serde_json::json!(level)));

    match ResolvedSettings::build(host.as_deref(), Some(&project), cli) {
        Ok(resolved) => resolved.into_model(),
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    }
}

fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error installing logger: {}", e);
    }
}

fn open_model(settings: &ModelSettings, file: &Path) -> EditModel {
    match EditModel::open_file(file) {
        Ok(model) => model.with_settings(settings.clone()),
        Err(e) => {
            eprintln!("Error loading {}: {}", file.display(), e);
            process::exit(1);
        }
    }
}

fn load_chain(parents: &[PathBuf]) -> InheritanceChain {
    let mut chain = InheritanceChain::new();
    for path in parents {
        match Layer::load(path) {
            Ok(layer) => chain.push(layer),
            Err(e) => {
                eprintln!("Error loading parent: {}", e);
                process::exit(1);
            }
        }
    }
    chain
}

fn save(model: &mut EditModel, file: &Path) -> SaveReport {
    match model.save() {
        Ok(report) => {
            for diagnostic in &report.diagnostics {
                eprintln!(
                    "Warning: {}:{}: {}",
                    file.display(),
                    diagnostic.line,
                    diagnostic.message
                );
            }
            report
        }
        Err(e) => {
            eprintln!("Error saving {}: {}", file.display(), e);
            process::exit(1);
        }
    }
}

fn print_report(report: &SaveReport) {
    for entry in &report.entries {
        println!("{}: {}", entry.key, entry.outcome.as_str());
    }
}

fn run_get(
    settings: &ModelSettings,
    file: &Path,
    key: &str,
    parents: &[PathBuf],
    effective: bool,
    json: bool,
) {
    let model = open_model(settings, file).with_chain(load_chain(parents));
    let model = if effective { model.effective() } else { model };

    if json {
        match serde_json::to_string_pretty(&model.get(key)) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    match model.get_string(key) {
        Some(text) => println!("{}", text),
        None => {
            eprintln!("Key '{}' is not set.", key);
            process::exit(1);
        }
    }
}

fn run_set(settings: &ModelSettings, file: &Path, key: &str, value: &str) {
    let mut model = open_model(settings, file);
    if let Err(e) = model.set_text(key, value) {
        eprintln!("Error setting {}: {}", key, e);
        process::exit(1);
    }
    print_report(&save(&mut model, file));
}

fn run_unset(settings: &ModelSettings, file: &Path, key: &str) {
    let mut model = open_model(settings, file);
    if let Err(e) = model.remove(key) {
        eprintln!("Error removing {}: {}", key, e);
        process::exit(1);
    }
    print_report(&save(&mut model, file));
}

fn run_add(settings: &ModelSettings, file: &Path, key: &str, item: &str) {
    let mut model = open_model(settings, file);
    let line = match model.add(key, item) {
        Ok(line) => line,
        Err(e) => {
            eprintln!("Error adding to {}: {}", key, e);
            process::exit(1);
        }
    };
    save(&mut model, file);
    println!("{}", line);
}

fn run_format(key: &str, value: &str) {
    match Registry::global().format(key, value) {
        Ok(Some(raw)) => println!("{}", raw),
        Ok(None) => eprintln!("'{}' formats to nothing; the key would be removed.", key),
        Err(e) => {
            eprintln!("Error formatting {}: {}", key, e);
            process::exit(1);
        }
    }
}

fn run_merge(settings: &ModelSettings, file: &Path, stem: &str, parents: &[PathBuf], json: bool) {
    let model = open_model(settings, file).with_chain(load_chain(parents));
    let group = model.merge_group(stem);

    if json {
        match serde_json::to_string_pretty(&group) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if group.is_empty() {
        println!("No keys for {}.", stem);
        return;
    }
    let format = ClauseFormat::default();
    for entry in group.entries.values() {
        let origin = if entry.local { "local" } else { "inherited" };
        println!("{} ({})", entry.key, origin);
        for clause in &entry.clauses {
            println!("  {}", format_clause(clause, &format));
        }
    }
}

fn run_keys(settings: &ModelSettings, file: &Path) {
    let model = open_model(settings, file);
    for name in model.property_names() {
        println!("{}", name);
    }
}

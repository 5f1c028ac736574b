// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shufumate::config::{self, AppConfig, LoadedConfig};
use shufumate::logging::{init_logging, LogTarget};
use shufumate::panel::current_year;
use shufumate::{render, AppMode, CsvSource, PanelInputs};
use tracing::info;

#[derive(Parser)]
#[command(name = "shufumate", version, about = "ShufuMate｜主婦の味方アプリ")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Render one panel with default inputs and print it
    Render {
        /// Mode key (e.g. diet, education) or menu label
        mode: String,

        /// Print the panel as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Deals sheet URL or local CSV path (overrides config)
        #[arg(long)]
        sheet_url: Option<String>,
    },
    /// List the available modes
    Modes,
    /// Write the current configuration to disk and show where it lives
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = config::load_config();
    let config = loaded.effective();

    match cli.command {
        None => run_ui_mode(&loaded, &config),
        Some(Command::Render { mode, json, sheet_url }) => {
            init_logging(LogTarget::Stderr)?;
            loaded.log_load_error();
            run_render(&config, &mode, json, sheet_url)
        }
        Some(Command::Modes) => {
            for mode in AppMode::ALL {
                println!("{:<16} {}", mode.key(), mode.label());
            }
            Ok(())
        }
        Some(Command::Config) => {
            init_logging(LogTarget::Stderr)?;
            loaded.log_load_error();
            run_config(&loaded)
        }
    }
}

fn run_render(config: &AppConfig, mode: &str, json: bool, sheet_url: Option<String>) -> Result<()> {
    let mode = AppMode::parse(mode).with_context(|| format!("unknown mode '{}' (see `shufumate modes`)", mode))?;

    let url = sheet_url.unwrap_or_else(|| config.deals_sheet_url.clone());
    let mut inputs = PanelInputs::for_date(chrono::Local::now().date_naive(), &url);
    inputs.theme = config.theme;

    let source = CsvSource::new();
    let view = render(mode, &inputs, &source, current_year());
    info!(mode = mode.key(), lines = view.lines.len(), "rendered panel");

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.to_plain_text());
    }

    Ok(())
}

/// Writes the stored values only; environment overrides stay per-process
fn run_config(loaded: &LoadedConfig) -> Result<()> {
    let config = &loaded.stored;
    config::save_config(config).context("Failed to write configuration")?;

    match config::config_path() {
        Some(path) => println!("✓ Configuration written to {}", path.display()),
        None => println!("✓ Configuration written"),
    }
    println!("{}", serde_json::to_string_pretty(config)?);

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(loaded: &LoadedConfig, config: &AppConfig) -> Result<()> {
    match &config.log_file {
        Some(path) => init_logging(LogTarget::File(path))?,
        None => init_logging(LogTarget::Discard)?,
    }
    loaded.log_load_error();
    info!(sheet = %config.deals_sheet_url, "starting TUI");

    let mut inputs = PanelInputs::for_date(chrono::Local::now().date_naive(), &config.deals_sheet_url);
    inputs.theme = config.theme;

    let mut app = ui::App::new(inputs, Box::new(CsvSource::new()));
    ui::run_ui(&mut app)?;

    println!("\n✅ ShufuMate closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_loaded: &LoadedConfig, _config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin shufumate-server --features server");
    std::process::exit(1);
}

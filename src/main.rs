use clap::{Parser, builder::styling};
use eyre::Result;
use looker_activity_extractor::{
    cli::{load_looker_client, run_extraction, tables_to_extract},
    config::{Settings, TableCatalog},
    storage::OutputDirectory,
};
use owo_colors::OwoColorize;
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Looker Activity Extractor: --{lookex}-> pulls system activity explores into CSV files
#[derive(Parser)]
#[command(name = "lookex", version, styles = STYLES)]
struct Cli {
    /// Table name from the explore; all built-in tables when omitted
    #[arg(short, long)]
    table: Option<String>,

    /// Path to a Looker project mapping JSON file
    #[arg(short, long)]
    mapping_file: Option<PathBuf>,

    /// Table definitions
    #[arg(long, default_value = "schema.yaml")]
    schema_file: PathBuf,

    /// Per-table cursor start overrides
    #[arg(long, default_value = "cursor.yaml")]
    cursor_file: PathBuf,

    /// Output root, wiped at start (overrides CSV_DUMP_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// The dotenv file to source credentials from
    #[arg(short, long, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::from_filename(&cli.env);

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match dotenv {
        Ok(path) => log::debug!("Sourced {}", path.display().bright_black()),
        Err(e) if e.not_found() => log::debug!("No dotenv file at {}", cli.env.bright_black()),
        Err(e) => return Err(e.into()),
    }

    let mut settings = Settings::from_env()?;
    if let Some(dir) = cli.output_dir {
        settings.output_dir = dir;
    }

    let output = OutputDirectory::prepare(&settings.output_dir)?;
    log::info!("Writing CSV files to {}", output.path().display().bright_black());

    let catalog = TableCatalog::load(
        &cli.schema_file,
        &cli.cursor_file,
        cli.mapping_file.as_deref(),
    )?;

    log::info!("Connecting to Looker...");
    let client = load_looker_client().await?;
    log::info!("Connected to {}", client.cyan());

    let tables = tables_to_extract(cli.table.as_deref());
    let summary = run_extraction(&client, &catalog, &settings, &output, &tables).await;

    log::info!(
        "Extracted {} record(s) from {} table(s)",
        summary.total_records(),
        summary.extracted.len()
    );
    if !summary.failed.is_empty() {
        log::warn!("Failed tables: {}", summary.failed.join(", ").red());
    }

    Ok(())
}

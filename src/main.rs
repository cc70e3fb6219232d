mod db;
mod engine;
mod error;
mod report;
mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use engine::pipeline::Pipeline;
use engine::summary::Summary;
use settings::Settings;

#[derive(Parser)]
#[command(name = "rto_timeline", about = "Normalize return-to-office dates into policy timelines")]
struct Cli {
    /// Settings file (default: ./rto_timeline.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a JSON export of the tracking sheet into the local database
    Import {
        /// JSON array of employer rows
        input: PathBuf,
    },
    /// Build per-employer timelines in display order
    Timeline {
        /// JSON export or SQLite file (default: local database)
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
        /// Max rows to display (table only)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Headline counts: RTO, hybrid, remote-first
    Summary {
        /// JSON export or SQLite file (default: local database)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Show how date fields are interpreted
    Parse {
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    info!(
        horizon_end = %settings.horizon_end,
        interval_policy = ?settings.interval_policy,
        "settings loaded"
    );

    match cli.command {
        Commands::Import { input } => {
            let records = db::load_json(&input)?;
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let written = db::save_records(&conn, &records)?;
            println!("Imported {} employers into {:?}", written, db::path());
        }
        Commands::Timeline {
            input,
            format,
            limit,
        } => {
            let records = db::load_records(input.as_deref())?;
            if records.is_empty() {
                println!("No employers found. Run 'import' first.");
                return Ok(());
            }
            let pipeline = Pipeline::new(&settings);
            let output = pipeline.run(&records)?;
            let summary = Summary::compute(&pipeline, &output, settings.summary_as_of);
            let doc = report::chart_document(&output, summary, &settings);
            match format {
                Format::Table => print!("{}", report::render_table(&doc, limit)),
                Format::Json => println!("{}", serde_json::to_string_pretty(&doc)?),
            }
        }
        Commands::Summary { input } => {
            let records = db::load_records(input.as_deref())?;
            let pipeline = Pipeline::new(&settings);
            let output = pipeline.run(&records)?;
            let summary = Summary::compute(&pipeline, &output, settings.summary_as_of);
            println!("{}", summary.headline());
            if output.limited_data > 0 {
                println!("({} employers left out for limited data)", output.limited_data);
            }
        }
        Commands::Parse { texts } => {
            for text in &texts {
                let parsed = engine::dates::parse(text)
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "unknown".into());
                println!("{:<40} → {}", text, parsed);
            }
        }
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use evgrid::cli::{self, OutputMode};
use evgrid::config::{AppConfig, ConfigOverrides};
use evgrid::errors::AppError;
use evgrid::query::OverviewParams;
use evgrid::App;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "evgrid", version, about = "Electric-vehicle records: grid API server and admin tool")]
struct Cli {
    #[arg(long, global = true, help = "Config file (TOML)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Directory holding the collection logs")]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Keep all data in memory")]
    in_memory: bool,
    #[arg(long, global = true, help = "error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Print JSON instead of human-readable output")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Serve the HTTP API")]
    Serve {
        #[arg(long, help = "Listen address, e.g. 127.0.0.1:5001")]
        bind: Option<String>,
    },
    #[command(about = "Load records from a CSV, JSON or NDJSON file")]
    Seed {
        file: PathBuf,
        #[arg(long, help = "csv|json|ndjson (default: detect)")]
        format: Option<String>,
        #[arg(long, help = "Keep existing records")]
        append: bool,
    },
    #[command(about = "Count all records")]
    Count,
    #[command(about = "Print one grid page")]
    Overview {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        operator: Option<String>,
        #[arg(long)]
        value: Option<String>,
        #[arg(long = "filters-json")]
        filters_json: Option<String>,
        #[arg(long)]
        page: Option<String>,
        #[arg(long = "page-size")]
        page_size: Option<String>,
        #[arg(long = "sort-field")]
        sort_field: Option<String>,
        #[arg(long = "sort-order")]
        sort_order: Option<String>,
    },
    #[command(about = "Print one record")]
    Get { id: String },
    #[command(about = "Delete one record")]
    Delete { id: String },
    #[command(name = "error-logs", about = "List recorded request errors, newest first")]
    ErrorLogs {
        #[arg(long)]
        page: Option<String>,
        #[arg(long = "page-size")]
        page_size: Option<String>,
    },
    #[command(name = "clear-error-logs", about = "Delete recorded request errors")]
    ClearErrorLogs {
        #[arg(long, help = "Only entries strictly before this instant (RFC 3339 or YYYY-MM-DD)")]
        before: Option<String>,
    },
}

fn to_command(cmd: Commands) -> Option<cli::Command> {
    Some(match cmd {
        Commands::Serve { .. } => return None,
        Commands::Seed { file, format, append } => cli::Command::Seed { file, format, append },
        Commands::Count => cli::Command::Count,
        Commands::Overview {
            search,
            filter,
            operator,
            value,
            filters_json,
            page,
            page_size,
            sort_field,
            sort_order,
        } => cli::Command::Overview(OverviewParams {
            search,
            filter,
            operator,
            value,
            filters_json,
            page,
            page_size,
            sort_field,
            sort_order,
        }),
        Commands::Get { id } => cli::Command::Get { id },
        Commands::Delete { id } => cli::Command::Delete { id },
        Commands::ErrorLogs { page, page_size } => cli::Command::ErrorLogs { page, page_size },
        Commands::ClearErrorLogs { before } => cli::Command::ClearErrorLogs { before },
    })
}

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), AppError> {
    let args = Cli::parse();
    let overrides = ConfigOverrides {
        bind: match &args.command {
            Commands::Serve { bind } => bind.clone(),
            _ => None,
        },
        data_dir: args.data_dir.clone(),
        in_memory: args.in_memory,
        log_level: args.log_level.clone(),
    };
    let cfg = AppConfig::load(args.config.as_deref(), &overrides)?;
    evgrid::init(&cfg)?;
    let app = App::open(&cfg)?;

    let mode = if args.json { OutputMode::Json } else { OutputMode::Human };
    match to_command(args.command) {
        Some(cmd) => {
            let stdout = std::io::stdout();
            cli::run(&app, cmd, mode, &mut stdout.lock())
        }
        None => {
            let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
            rt.block_on(app.serve(&cfg))
        }
    }
}

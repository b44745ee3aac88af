use clap::{Args, Parser, Subcommand};
use estatelite::cli as prog_cli;
use estatelite::config::AppConfig;
use estatelite::listing::ListingParams;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "estatelite", version, about = "EstateLite marketplace service", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). If omitted, the usual locations are searched.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Override the snapshot directory. Takes precedence over config/env.")]
    data_dir: Option<PathBuf>,
    #[arg(long, help = "Override the log level (error|warn|info|debug|trace)")]
    log_level: Option<String>,
    #[arg(long, help = "Print machine-readable JSON instead of text")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the HTTP API")]
    Serve {
        #[arg(long, help = "Bind address")]
        host: Option<String>,
        #[arg(long, help = "Bind port")]
        port: Option<u16>,
    },
    #[command(about = "Create demo accounts and listings")]
    Seed {
        #[arg(long, default_value_t = 5, help = "Number of agent accounts")]
        agents: usize,
        #[arg(long, default_value_t = 30, help = "Number of listings")]
        properties: usize,
    },
    #[command(about = "Run a property listing query")]
    Query(QueryArgs),
    #[command(about = "Print the effective configuration")]
    Config,
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[arg(long, help = "Account id to query as; anonymous when omitted")]
    user: Option<String>,
    #[arg(long)]
    page: Option<String>,
    #[arg(long)]
    limit: Option<String>,
    #[arg(long = "type", help = "buy|rent")]
    listing_type: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    price_min: Option<String>,
    #[arg(long)]
    price_max: Option<String>,
    #[arg(long, help = "Case-insensitive match on address, city or state")]
    location: Option<String>,
    #[arg(long, help = "Minimum bedrooms")]
    bedrooms: Option<String>,
    #[arg(long, help = "Minimum bathrooms")]
    bathrooms: Option<String>,
    #[arg(long)]
    area_min: Option<String>,
    #[arg(long)]
    area_max: Option<String>,
    #[arg(long, help = "Comma-separated amenities; all must be present")]
    amenities: Option<String>,
    #[arg(long, help = "Only featured listings when 'true'")]
    featured: Option<String>,
    #[arg(long, help = "Agent account id")]
    agent: Option<String>,
    #[arg(long, help = "Free-text search over title, description and city")]
    search: Option<String>,
    #[arg(long, allow_hyphen_values = true, help = "Sort field, '-' prefix for descending")]
    sort: Option<String>,
}

impl QueryArgs {
    fn into_parts(self) -> (ListingParams, Option<String>) {
        let a = self;
        let params = ListingParams {
            page: a.page,
            limit: a.limit,
            listing_type: a.listing_type,
            category: a.category,
            status: a.status,
            price_min: a.price_min,
            price_max: a.price_max,
            location: a.location,
            bedrooms: a.bedrooms,
            bathrooms: a.bathrooms,
            area_min: a.area_min,
            area_max: a.area_max,
            amenities: a.amenities,
            featured: a.featured,
            agent: a.agent,
            search: a.search,
            sort: a.sort,
        };
        (params, a.user)
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    // Precedence: CLI > env > config file > defaults
    let mut cfg = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        cfg.storage.data_dir = Some(dir.clone());
    }
    if let Some(level) = &cli.log_level {
        cfg.logging.level = level.clone();
    }
    if let Commands::Serve { host, port } = &cli.command {
        if let Some(h) = host {
            cfg.server.host = h.clone();
        }
        if let Some(p) = port {
            cfg.server.port = *p;
        }
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cfg = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) =
        estatelite::logger::configure_logging(cfg.logging.dir.as_deref(), &cfg.logging.level, cfg.logging.retention)
    {
        eprintln!("warning: logging not configured: {e}");
    }
    let mode = if cli.json { prog_cli::OutputMode::Json } else { prog_cli::OutputMode::Human };

    let cmd = match cli.command {
        Commands::Serve { .. } => prog_cli::Command::Serve,
        Commands::Seed { agents, properties } => prog_cli::Command::Seed { agents, properties },
        Commands::Query(args) => {
            let (params, user) = args.into_parts();
            prog_cli::Command::Query { params, user }
        }
        Commands::Config => prog_cli::Command::Config,
    };
    if let Err(e) = prog_cli::run_with_format(&cfg, cmd, mode).await {
        log::error!("command failed: {e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

use crate::config::AppConfig;

use super::command::Command;
use super::util::{format_price, open_marketplace};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
}

pub async fn run(config: &AppConfig, cmd: Command) -> Result<(), Box<dyn std::error::Error>> {
    run_with_format(config, cmd, OutputMode::Human).await
}

pub async fn run_with_format(
    config: &AppConfig,
    cmd: Command,
    mode: OutputMode,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Command::Serve => crate::http::serve(config).await,
        Command::Seed { agents, properties } => {
            let market = open_marketplace(config)?;
            let report = crate::seed::seed(&market, agents, properties)?;
            market.engine().checkpoint()?;
            match mode {
                OutputMode::Json => println!("{}", serde_json::to_string(&report)?),
                OutputMode::Human => println!(
                    "accounts={} properties={} approved={} featured={}",
                    report.accounts, report.properties, report.approved, report.featured
                ),
            }
            Ok(())
        }
        Command::Query { params, user } => {
            let market = open_marketplace(config)?;
            let caller = market.resolve_caller(user.as_deref())?;
            let page = market.list_properties(caller.as_ref(), &params)?;
            match mode {
                OutputMode::Json => {
                    let json = serde_json::json!({"properties": page.items, "pagination": page.pagination});
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                OutputMode::Human => {
                    for p in &page.items {
                        println!(
                            "{}  {:>10}  {:<4} {:<10} {:<12} {}{}",
                            p.id,
                            format_price(p.price),
                            p.listing_type,
                            p.category,
                            p.location.city,
                            p.title,
                            if p.is_approved { "" } else { "  [pending]" }
                        );
                    }
                    let pg = page.pagination;
                    println!("page {}/{} ({} total, {} per page)", pg.page, pg.pages, pg.total, pg.limit);
                }
            }
            Ok(())
        }
        Command::Config => {
            match mode {
                OutputMode::Json => println!("{}", serde_json::to_string_pretty(config)?),
                OutputMode::Human => print!("{}", config.to_toml()?),
            }
            Ok(())
        }
    }
}

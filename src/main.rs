mod browser;
mod config;
mod listing;
mod query;
mod storage;

use browser::service::{self, BrowserService};
use config::Config;
use query::RawFilter;
use storage::postgres::Storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    let storage = Storage::new(&cfg.database_url, cfg.max_db_connections).await?;
    let browser = BrowserService::new(storage);

    let result = browser.refresh(&RawFilter::default()).await;
    if !browser.is_current(&result) {
        // a newer pass superseded this one; nothing to render
        return Ok(());
    }

    println!("\n==============================");
    println!("LISTINGS: {}", result.records.len());
    println!("MATCHING: {}", result.filtered.len());
    println!("VALID FOR STATS: {}", result.stats.count);
    println!("MEAN PRICE: {:.0} EUR", result.stats.mean_price);
    println!("MEAN PRICE/M2: {:.0} EUR", result.stats.mean_price_per_m2);
    println!("==============================\n");

    for (dim, groups) in &result.groups {
        println!("BY {}:", dim.label().to_uppercase());
        for g in groups {
            println!(
                "  {:<16} n={:<5} mean={:.0} min={:.0} max={:.0}",
                g.key, g.count, g.mean_price, g.min_price, g.max_price
            );
        }
        println!();
    }

    println!("CATEGORIES: {}", service::distinct_categories(&result.records).join(", "));
    println!("DISTRICTS:  {}", service::distinct_districts(&result.records).join(", "));

    Ok(())
}

use std::error::Error;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;

use sales_dashboard::{
    DEFAULT_FEED_URL, DatabaseConfig, create_pool, fetch_feed, get_timezone,
    import_transactions, initialize_db, read_feed_file,
};

/// A utility for creating a sales dashboard database seeded from the product feed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    db_path: PathBuf,

    /// Read the feed from this JSON file instead of fetching it.
    #[arg(long, short, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Where to fetch the product feed from.
    #[arg(long, default_value = DEFAULT_FEED_URL)]
    url: String,

    /// The canonical timezone that dates of sale are converted to, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

/// Create a database and fill it with the products from the feed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();

    match args.db_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Database path must include a file extension (e.g., 'transactions.db').");
            exit(1);
        }
    }

    let Some(timezone) = get_timezone(&args.timezone) else {
        eprintln!("Unknown timezone {:?}.", args.timezone);
        exit(1);
    };

    let new_transactions = match &args.file {
        Some(path) => {
            println!("Reading products from {path:#?}");
            read_feed_file(path).await?
        }
        None => {
            println!("Fetching products from {}", args.url);
            let client = reqwest::Client::new();
            fetch_feed(&client, &args.url).await?
        }
    };

    println!("Creating database at {:#?}", args.db_path);
    let pool = create_pool(&DatabaseConfig::new(&args.db_path)).await?;
    initialize_db(&pool).await?;

    let inserted_count = import_transactions(new_transactions, timezone, &pool).await?;
    pool.close().await;

    println!("Inserted {inserted_count} products. Success!");

    Ok(())
}

use std::error::Error;

use clap::Parser;

use fintraq::{DEFAULT_DATABASE_NAME, TenantName, seed_all, shutdown, startup, today_in};

/// A utility for filling a FinTraQ database with starter categories and
/// sample transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Where tenant databases are stored: a directory, or `:memory:`.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// The tenant database to seed.
    #[arg(long, default_value = DEFAULT_DATABASE_NAME)]
    database: String,

    /// The canonical timezone used to date the sample transactions.
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,
}

/// Seed a tenant database.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let today = today_in(&args.timezone)?;
    let client = startup(&args.database_url, &args.database)?;
    let database = client.database(&TenantName::new(&args.database)?)?;

    println!("Seeding database {}...", database.name());
    let report = {
        let connection = database.lock()?;
        seed_all(today, &connection)?
    };
    drop(database);

    println!("Categories added: {}", report.categories_inserted);
    println!("Transactions added: {}", report.transactions_inserted);
    println!("Success!");

    shutdown(std::sync::Arc::new(client));

    Ok(())
}

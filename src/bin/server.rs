use std::{
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintraq::{
    AppState, DEFAULT_DATABASE_NAME, build_cors_layer, build_router, graceful_shutdown,
    logging_middleware, parse_origins, shutdown, startup,
};

/// The REST API server for FinTraQ.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Where tenant databases are stored: a directory, or `:memory:`.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// The database used when a request does not name a tenant.
    #[arg(long, env = "DB_NAME", default_value = DEFAULT_DATABASE_NAME)]
    default_database: String,

    /// Comma-separated origins allowed to make cross-origin requests.
    /// Leave empty to allow any origin.
    #[arg(long, env = "CORS_ORIGINS", default_value = "")]
    cors_origins: String,

    /// The address to listen on.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// The canonical timezone used to date new transactions, e.g. "Pacific/Auckland".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// File path for the debug log.
    #[arg(long, env = "LOG_PATH", default_value = "debug.log")]
    log_path: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(error) = setup_logging(&args.log_path) {
        eprintln!("Could not open log file {}: {error}", args.log_path);
        exit(1);
    }

    let client = match startup(&args.database_url, &args.default_database) {
        Ok(client) => Arc::new(client),
        Err(error) => {
            tracing::error!("Could not start storage: {error}");
            exit(1);
        }
    };

    let state = match AppState::new(client.clone(), &args.timezone) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not create app state: {error}");
            exit(1);
        }
    };

    let origins = parse_origins(&args.cors_origins);
    let router = build_router(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(build_cors_layer(&origins));
    let router = add_tracing_layer(router);

    let addr = SocketAddr::from((args.host, args.port));
    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    tracing::info!("HTTP server listening on {}", addr);
    let result = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await;

    if let Err(error) = result {
        tracing::error!("Server error: {error}");
    }

    shutdown(client);
}

fn setup_logging(log_path: &str) -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}

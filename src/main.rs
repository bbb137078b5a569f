//! Weather Proxy - caching HTTP proxy for the OpenWeather API
//!
//! Serves the weather dashboard's JSON API and memoizes upstream responses
//! so repeated lookups stay within the API's rate limits.

mod api;
mod cache;
mod config;
mod proxy;
mod upstream;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::env;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::ApiServer;
use cache::ResponseCache;
use config::Config;
use proxy::CachedFetchProxy;
use upstream::OpenWeatherClient;

/// CLI command
#[derive(Debug, PartialEq)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"Weather Proxy - Caching proxy for the OpenWeather API

USAGE:
    weather-proxy              # Run the HTTP server (default)
    weather-proxy serve
    weather-proxy help

ENVIRONMENT:
    PORT                   Listen port (default 3000)
    OPENWEATHER_API_KEY    OpenWeather API key
    OPENWEATHER_BASE_URL   Upstream API host (default https://api.openweathermap.org)
    CACHE_TTL_SECS         Response cache TTL in seconds (default 300)
    STATIC_DIR             Dashboard assets directory (default public)
    RUST_LOG               Log filter (trace, debug, info, warn, error)
"#
    );
}

fn parse_args(args: &[String]) -> Command {
    match args.get(1).map(String::as_str) {
        None | Some("serve") => Command::Serve,
        Some("help" | "--help" | "-h") => Command::Help,
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            Command::Help
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = env::args().collect();
    if parse_args(&args) == Command::Help {
        print_help();
        return Ok(());
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e);
        }
    };

    let client = OpenWeatherClient::new(&config.base_url, &config.api_key)?;
    let cache = Arc::new(ResponseCache::with_ttl(config.cache_ttl));
    let proxy = Arc::new(CachedFetchProxy::new(cache, client));

    info!(
        upstream = %config.base_url,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        api_key_configured = proxy.client().has_api_key(),
        "Starting weather proxy"
    );

    let mut server = ApiServer::new(proxy, Some(config.static_dir.clone()));
    if let Err(e) = server.start(&config.bind_address()).await {
        error!(error = %e, "Failed to start HTTP server");
        return Err(e);
    }

    server.run(shutdown_signal()).await?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_command_is_serve() {
        assert_eq!(parse_args(&args(&["weather-proxy"])), Command::Serve);
        assert_eq!(parse_args(&args(&["weather-proxy", "serve"])), Command::Serve);
    }

    #[test]
    fn test_help_command() {
        assert_eq!(parse_args(&args(&["weather-proxy", "--help"])), Command::Help);
        assert_eq!(parse_args(&args(&["weather-proxy", "bogus"])), Command::Help);
    }
}

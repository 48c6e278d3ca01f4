use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_server::http::{self, AppState};
use shared::config::{AssistantConfig, DEFAULT_BIND_ADDR, load_dotenv};
use shared::dictionaries::ReferenceDictionaries;
use shared::providers::{ImgwClient, KeywordAnalyzer, NominatimGeocoder};
use shared::service::AssistantService;
use shared::session_store::SessionStore;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "api_server=info,shared=info,axum=info".to_string()),
        )
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .init();

    let config = match AssistantConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let (dictionaries, report) = ReferenceDictionaries::load_from_dir(&config.data_dir);
    if report.total_entries() == 0 {
        warn!(
            data_dir = %config.data_dir.display(),
            "no reference dictionaries loaded; location resolution will miss"
        );
    }

    let geocoder = match NominatimGeocoder::new(config.geocoder.clone()) {
        Ok(geocoder) => geocoder,
        Err(err) => {
            error!("failed to build geocoder client: {err}");
            std::process::exit(1);
        }
    };

    let fetcher = match ImgwClient::new(config.imgw.clone()) {
        Ok(fetcher) => fetcher,
        Err(err) => {
            error!("failed to build imgw client: {err}");
            std::process::exit(1);
        }
    };

    let service = AssistantService::new(
        Arc::new(dictionaries),
        Arc::new(KeywordAnalyzer::new()),
        Arc::new(geocoder),
        Arc::new(fetcher),
        config.dialogue_settings(),
    );

    let sessions = SessionStore::new(
        Arc::new(service),
        Duration::from_secs(config.session_ttl_seconds),
    );
    let _pruner = sessions.spawn_pruner(Duration::from_secs(config.session_prune_interval_seconds));

    let app = http::build_router(AppState {
        sessions,
        dictionary_report: Arc::new(report),
    });

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(_) => {
            warn!(
                bind_addr = %config.bind_addr,
                "invalid bind address; falling back to {DEFAULT_BIND_ADDR}"
            );
            match DEFAULT_BIND_ADDR.parse() {
                Ok(addr) => addr,
                Err(err) => {
                    error!("invalid default bind address: {err}");
                    std::process::exit(1);
                }
            }
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    info!(
        "api server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server terminated: {err}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutdown signal received");
}

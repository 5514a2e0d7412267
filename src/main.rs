mod config;
mod dialer;
mod error;
mod gateway;
mod handlers;
mod phone;
mod signature;
#[cfg(test)]
mod test_support;
mod types;
mod vogent_types;

use crate::config::Config;
use crate::types::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

pub mod consts {
    pub const DEFAULT_PORT: u16 = 8_000;
    pub const DEFAULT_VOGENT_API_BASE_URL: &str = "https://api.vogent.ai";
    pub const DEFAULT_COUNTRY_CODE: &str = "1";
    pub const DIAL_TIMEOUT_MINUTES: u32 = 10;
    pub const EXTRACTOR_EVENT: &str = "dial.extractor";
    pub const SIGNATURE_HEADER: &str = "x-elto-signature";
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const MAX_LOGGED_RESPONSE_CHARS: usize = 500;
}

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            ("vogent_bridge", tracing_subscriber::filter::LevelFilter::DEBUG),
        ]));
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {e}");
    }
    config::load_dotenv();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error=%e, "configuration error");
            std::process::exit(1);
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let app_state = match AppState::new(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!(error=%e, "failed to build http client");
            std::process::exit(1);
        }
    };

    let app = handlers::router(app_state);

    let server = match axum::Server::try_bind(&addr) {
        Ok(builder) => builder,
        Err(e) => {
            error!(error=%e, addr=%addr, "failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(addr=%addr, "vogent integration server listening");
    if let Err(e) = server.serve(app.into_make_service()).await {
        error!(error=%e, "server error");
        std::process::exit(1);
    }
}

use std::io;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::bootstrap;
use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::start_server;

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn run() -> io::Result<()> {
    dotenvy::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing("info");
            error!(error = %err, "Failed to load configuration");
            return Err(io::Error::new(io::ErrorKind::InvalidInput, err.to_string()));
        }
    };
    init_tracing(&config.log_filter);

    actix_web::rt::System::new().block_on(async move {
        let state = bootstrap::setup(&config)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;

        info!(host = %config.host, port = config.port, "Starting patient intake API");
        start_server(state, &config.host, config.port)?.await
    })
}

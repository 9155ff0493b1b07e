use std::net::TcpListener;

use user_api::configuration::get_configuration;
use user_api::startup::{build_account_service, build_directory, run};
use user_api::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry("info");

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    if configuration.jwt.uses_default_secret() {
        tracing::warn!("Signing tokens with the built-in default secret; set APP_JWT__SECRET");
    }

    let directory = build_directory(&configuration).await.map_err(|e| {
        tracing::error!("Failed to open account directory: {}", e);
        std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Account directory error",
        )
    })?;

    let accounts = build_account_service(&configuration, directory);

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, accounts)?;
    server.await
}

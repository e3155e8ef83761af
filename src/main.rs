use std::net::TcpListener;
use std::sync::Arc;

use catalog_api::configuration::get_configuration;
use catalog_api::database::PgQueryExecutor;
use catalog_api::startup::run;
use catalog_api::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

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

    let executor = PgQueryExecutor::connect_lazy(&configuration.database).map_err(|e| {
        tracing::error!("Failed to create connection pool: {}", e);
        std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Database connection error",
        )
    })?;

    tracing::info!("Database connection pool created");

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(
        listener,
        Arc::new(executor),
        configuration.jwt.clone(),
        configuration.password.clone(),
    )?;
    tracing::info!("Server started successfully");

    server.await
}

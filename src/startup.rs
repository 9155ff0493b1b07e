use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use crate::auth::{CredentialHasher, TokenService};
use crate::configuration::{DirectoryBackend, Settings};
use crate::directory::{
    AccountDirectory, InMemoryAccountDirectory, PgAccountDirectory, TimeoutDirectory,
};
use crate::error::{AppError, DirectoryError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::AuthGate;
use crate::routes::{
    current_user, delete_user, get_user, health_check, list_users, login, register, update_user,
};
use crate::service::AccountService;

/// Open the configured directory backend, bounded by the configured timeout
pub async fn build_directory(
    settings: &Settings,
) -> Result<Arc<dyn AccountDirectory>, DirectoryError> {
    let inner: Arc<dyn AccountDirectory> = match settings.directory.backend {
        DirectoryBackend::Memory => {
            tracing::warn!("Using in-memory account directory; accounts are lost on restart");
            Arc::new(InMemoryAccountDirectory::new())
        }
        DirectoryBackend::Postgres => {
            tracing::info!(database = ?settings.database, "Connecting to account database");
            let pool = PgPoolOptions::new()
                .max_connections(settings.database.max_connections)
                .acquire_timeout(settings.directory.timeout())
                .connect(&settings.database.connection_string())
                .await?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| DirectoryError::Unavailable(format!("migration failed: {}", e)))?;

            tracing::info!("Account database ready");
            Arc::new(PgAccountDirectory::new(pool))
        }
    };

    Ok(Arc::new(TimeoutDirectory::new(
        inner,
        settings.directory.timeout(),
    )))
}

/// Wire the directory, hasher and token service from settings
pub fn build_account_service(
    settings: &Settings,
    directory: Arc<dyn AccountDirectory>,
) -> AccountService {
    let tokens = Arc::new(TokenService::from_settings(&settings.jwt));
    AccountService::new(directory, CredentialHasher::new(settings.hashing.cost), tokens)
}

pub fn run(listener: TcpListener, accounts: AccountService) -> Result<Server, std::io::Error> {
    let tokens = accounts.tokens().clone();
    let accounts = web::Data::new(accounts);

    // Body extraction failures get the same JSON error shape as everything else
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            .app_data(json_config.clone())
            .app_data(accounts.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            // Protected routes
            .service(
                web::resource("/auth/me")
                    .wrap(AuthGate::new(tokens.clone()))
                    .route(web::get().to(current_user)),
            )
            .service(
                web::scope("/users")
                    .wrap(AuthGate::new(tokens.clone()))
                    .route("", web::get().to(list_users))
                    .route("/{id}", web::get().to(get_user))
                    .route("/{id}", web::put().to(update_user))
                    .route("/{id}", web::delete().to(delete_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

use actix_files::Files;
use actix_web::cookie::Key;
use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::middleware::{DefaultHeaders, ErrorHandlers, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use campus_shield::app_config::AppConfig;
use campus_shield::email::{mailer_from_config, Mailer};
use campus_shield::middleware::ClientCtx;
use campus_shield::session::session_middleware;
use campus_shield::storage::{local::LocalStorage, StorageBackend};
use env_logger::Env;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_lib_mods();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = campus_shield::db::init_db(&config.database_url())
        .await
        .context("Failed to initialize database")?;

    let mailer = mailer_from_config(&config.email).context("Failed to configure mail")?;
    log::info!("Outgoing mail via {}", mailer.describe());

    let storage: Arc<dyn StorageBackend> = Arc::new(
        LocalStorage::new(config.storage.uploads_path(), &config.storage.uploads_dir)
            .context("Failed to prepare uploads directory")?,
    );

    let secret_key = load_secret_key();
    let bind_address = config.site.bind_address.clone();
    log::info!("{} listening on {}", config.site.name, bind_address);

    HttpServer::new(move || {
        let mailer_data: Data<Arc<dyn Mailer>> = Data::new(mailer.clone());
        let storage_data: Data<Arc<dyn StorageBackend>> = Data::new(storage.clone());

        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        // However, services are read top->down, higher traffic routes should be
        // placed higher
        App::new()
            .app_data(Data::new(db.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(mailer_data)
            .app_data(storage_data)
            // Security headers - applied to all responses
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::FORBIDDEN, campus_shield::web::error::render_403)
                    .handler(StatusCode::NOT_FOUND, campus_shield::web::error::render_404)
                    .handler(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        campus_shield::web::error::render_500,
                    ),
            )
            .wrap(ClientCtx::default())
            .wrap(session_middleware(secret_key.clone()))
            .wrap(Logger::new("%a %r %s %Dms"))
            .service(Files::new("/static", &config.storage.static_dir))
            .configure(campus_shield::web::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await?;

    Ok(())
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    // A missing .env is fine; the environment may already be configured.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Session signing key from `SECRET_KEY`, or a random one for this run.
fn load_secret_key() -> Key {
    let reason = match std::env::var("SECRET_KEY") {
        Ok(key) => match Key::try_from(key.as_bytes()) {
            Ok(key) => return key,
            Err(err) => format!("{}", err),
        },
        Err(err) => format!("{}", err),
    };

    let random_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect();
    log::warn!("SECRET_KEY was invalid. Reason: {}\r\nThis means the key used for signing session cookies will invalidate every time the application is restarted. A secret key must be at least 64 bytes to be accepted.", reason);
    Key::from(random_string.as_bytes())
}

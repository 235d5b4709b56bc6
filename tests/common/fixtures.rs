//! Test fixtures for creating test data
#![allow(dead_code)]

use super::database::setup_test_database;
use super::mailer::RecordingMailer;
use campus_shield::app_config::AppConfig;
use campus_shield::email::Mailer;
use campus_shield::session::hash_password;
use campus_shield::storage::{local::LocalStorage, StorageBackend};
use campus_shield::web::register::{register_user, RegisterOutcome};
use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;
use tempfile::TempDir;

/// Everything one test app needs. Dropping it removes the upload directory.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub mailer: Arc<RecordingMailer>,
    pub storage: Arc<dyn StorageBackend>,
    pub static_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_mailer(RecordingMailer::default()).await
    }

    pub async fn with_mailer(mailer: RecordingMailer) -> Self {
        let db = setup_test_database().await.unwrap();
        let static_dir = tempfile::tempdir().unwrap();

        let mut config = AppConfig::default();
        config.site.base_url = "http://campus.test".to_owned();
        config.email.admin_address = "admin@campus.test".to_owned();
        config.storage.static_dir = static_dir.path().to_string_lossy().into_owned();

        let storage: Arc<dyn StorageBackend> = Arc::new(
            LocalStorage::new(config.storage.uploads_path(), &config.storage.uploads_dir)
                .unwrap(),
        );

        Self {
            db,
            config,
            mailer: Arc::new(mailer),
            storage,
            static_dir,
        }
    }

    pub fn mailer_handle(&self) -> Arc<dyn Mailer> {
        self.mailer.clone()
    }
}

/// Test user fixture
pub struct TestUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String, // Plain text password for testing
}

/// Create a test user with known credentials
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
) -> Result<TestUser, DbErr> {
    let password_hash = hash_password(password)
        .map_err(|e| DbErr::Custom(format!("Password hashing failed: {}", e)))?;

    match register_user(db, name, email, &password_hash).await? {
        RegisterOutcome::Created(id) => Ok(TestUser {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        }),
        RegisterOutcome::EmailTaken => Err(DbErr::Custom(format!("{} already exists", email))),
    }
}

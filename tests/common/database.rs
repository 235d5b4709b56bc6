//! Test database setup
#![allow(dead_code)]

use sea_orm::{DatabaseConnection, DbErr};

/// Fresh in-memory database with the schema applied. Each call is isolated.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    campus_shield::db::init_db("sqlite::memory:").await
}

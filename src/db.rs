//! Database connection and schema bootstrap.

use crate::orm::{complaints, polls, users, votes};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
    Statement,
};

/// Opens a connection pool for `url`.
///
/// In-memory sqlite databases are private to a single connection, so their pool is capped at one.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url.to_owned());
    opt.sqlx_logging(false);
    if url.contains(":memory:") {
        opt.max_connections(1).min_connections(1);
    }
    let db = Database::connect(opt).await?;
    log::info!("Connected to database ({:?})", db.get_database_backend());
    Ok(db)
}

/// Creates every table that does not exist yet.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    // Parents before children for foreign keys.
    create_table(db, &schema, users::Entity).await?;
    create_table(db, &schema, polls::Entity).await?;
    create_table(db, &schema, complaints::Entity).await?;
    create_table(db, &schema, votes::Entity).await?;

    // One vote per (poll, user), also when two submissions race.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_votes_poll_user ON votes (poll_id, user_id)"
            .to_owned(),
    ))
    .await?;

    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    Ok(())
}

/// Connects and bootstraps the schema.
pub async fn init_db(url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = connect(url).await?;
    init_schema(&db).await?;
    Ok(db)
}

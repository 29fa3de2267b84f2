use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    // SQLite serialises writers; one connection avoids lock contention
    // between concurrent transactions.
    if db_url.starts_with("sqlite:") {
        opt.max_connections(1);
    }

    let db = Database::connect(opt).await?;
    sync_schema(&db).await?;
    crate::seed::ensure_indexes(&db).await?;

    Ok(db)
}

/// Creates or migrates every table declared under `entity`.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("tickets_server::entity::*")
        .sync(db)
        .await
}

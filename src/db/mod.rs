pub mod chats;
pub mod pets;
pub mod placement_requests;
pub mod relationships;
pub mod responses;
pub mod transfers;
pub mod users;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::AppConfig;

/// Create a SeaORM connection pool from the loaded configuration.
pub async fn create_pool(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .sqlx_logging(false);

    Database::connect(options).await
}

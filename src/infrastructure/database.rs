use crate::config::AppConfig;
use crate::entities::{categories, content_images, contents, sub_categories};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(config: &AppConfig) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", config.database_url);

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.max_connections(config.db_max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

/// Creates the schema if it does not exist yet.
///
/// Parents come before children so every foreign key points at an
/// existing table: categories -> sub_categories -> contents -> content_images.
pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    if builder == DatabaseBackend::Sqlite {
        // Cascades only fire when SQLite enforces foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
    }

    let stmts = vec![
        (
            "categories",
            schema
                .create_table_from_entity(categories::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "sub_categories",
            schema
                .create_table_from_entity(sub_categories::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "contents",
            schema
                .create_table_from_entity(contents::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "content_images",
            schema
                .create_table_from_entity(content_images::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        db.execute(stmt).await?;
        info!("   - Table '{}' checked/created", name);
    }

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_sub_categories_category_id ON sub_categories(category_id)",
        "CREATE INDEX IF NOT EXISTS idx_contents_category_id ON contents(category_id)",
        "CREATE INDEX IF NOT EXISTS idx_contents_sub_category_id ON contents(sub_category_id)",
        "CREATE INDEX IF NOT EXISTS idx_content_images_content_id ON content_images(content_id)",
    ];

    for query in indexes {
        db.execute_unprepared(query).await?;
    }

    Ok(())
}

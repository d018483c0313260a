//! Database setup for repository tests.
//!
//! Both backends run the real migrations so tests see the production schema.

#[cfg(feature = "database-sqlite")]
use sqlx::SqlitePool;

/// Fresh in-memory SQLite database with migrations applied.
///
/// One connection only: every new connection to `sqlite::memory:` would
/// open a separate, empty database.
#[cfg(feature = "database-sqlite")]
pub async fn migrated_sqlite_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::migrate!("./migrations_sqlx/sqlite")
        .run(&pool)
        .await
        .expect("Failed to run SQLite migrations");

    pool
}

/// PostgreSQL databases backed by one shared testcontainers instance.
#[cfg(feature = "database-postgres")]
pub mod postgres {
    use sqlx::PgPool;
    use testcontainers_modules::{
        postgres::Postgres,
        testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner},
    };
    use tokio::sync::OnceCell;

    struct Container {
        // Held so the container outlives every test using it
        _handle: ContainerAsync<Postgres>,
        url: String,
    }

    static CONTAINER: OnceCell<Container> = OnceCell::const_new();

    async fn container() -> &'static Container {
        CONTAINER
            .get_or_init(|| async {
                let handle = Postgres::default()
                    .with_tag("17-alpine")
                    .start()
                    .await
                    .expect("Failed to start PostgreSQL container");
                let host = handle.get_host().await.expect("Failed to get host");
                let port = handle
                    .get_host_port_ipv4(5432)
                    .await
                    .expect("Failed to get port");

                Container {
                    url: format!("postgres://postgres:postgres@{}:{}/postgres", host, port),
                    _handle: handle,
                }
            })
            .await
    }

    /// Pool bound to a fresh schema with migrations applied.
    ///
    /// Each test gets its own schema through `search_path`, so tests share
    /// the container but never see each other's rows.
    pub async fn migrated_postgres_pool() -> PgPool {
        let container = container().await;
        let schema = format!("test_{}", uuid::Uuid::new_v4().simple());

        let admin = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&container.url)
            .await
            .expect("Failed to connect to PostgreSQL");
        sqlx::query(&format!("CREATE SCHEMA \"{}\"", schema))
            .execute(&admin)
            .await
            .expect("Failed to create test schema");
        admin.close().await;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&format!(
                "{}?options=-c search_path={}",
                container.url, schema
            ))
            .await
            .expect("Failed to connect to test schema");

        sqlx::migrate!("./migrations_sqlx/postgres")
            .run(&pool)
            .await
            .expect("Failed to run PostgreSQL migrations");

        pool
    }
}

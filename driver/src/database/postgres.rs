use std::str::FromStr;

use error_stack::{Report, ResultExt};
use sqlx::migrate::Migrator;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Error, Pool, Postgres};
use tracing::info;

use kernel::interface::database::DatabaseConnection;
use kernel::KernelError;

use crate::error::ConvertError;
use crate::{env, env_opt};

pub use self::book::*;

mod book;

static POSTGRES_URL: &str = "POSTGRES_URL";
static POSTGRES_AUTOMIGRATE: &str = "POSTGRES_AUTOMIGRATE";

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    /// Connects to `POSTGRES_URL`, running the embedded migrations first when
    /// `POSTGRES_AUTOMIGRATE` is `true`.
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let pool = Pool::connect(&url).await.convert_error()?;
        let db = Self { pool };

        let automigrate = env_opt(POSTGRES_AUTOMIGRATE)?
            .map(|value| bool::from_str(value.trim()))
            .transpose()
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable_lazy(|| format!("{POSTGRES_AUTOMIGRATE} must be true or false"))?
            .unwrap_or(false);
        if automigrate {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// A pool that opens connections on first use.
    pub fn lazy(url: &str) -> error_stack::Result<Self, KernelError> {
        let pool = PgPoolOptions::new().connect_lazy(url).convert_error()?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> error_stack::Result<(), KernelError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable("Failed to run migrations")?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for PostgresDatabase {
    type Connection = PoolConnection<Postgres>;
    async fn acquire(&self) -> error_stack::Result<Self::Connection, KernelError> {
        let con = self.pool.acquire().await.convert_error()?;
        Ok(con)
    }
}

impl<T> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| match error {
            Error::PoolTimedOut => Report::from(error).change_context(KernelError::Timeout),
            _ => Report::from(error).change_context(KernelError::Internal),
        })
    }
}

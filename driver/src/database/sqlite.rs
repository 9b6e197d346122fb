use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::str::FromStr;

use error_stack::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::DependOnBookQuery;
use kernel::interface::update::DependOnBookModifier;
use kernel::KernelError;

use crate::env_or_else;
use crate::error::ConvertError;

pub use self::book::*;

mod book;

static DATABASE_URL: &str = "DATABASE_URL";
static DEFAULT_DATABASE_URL: &str = "sqlite://new-books-collection.db";

#[derive(Clone)]
pub struct SqliteDatabase {
    pool: Pool<Sqlite>,
}

impl SqliteDatabase {
    /// Opens the database named by `DATABASE_URL`, creating the file and schema when missing.
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env_or_else(DATABASE_URL, || DEFAULT_DATABASE_URL.to_string())?;
        let options = SqliteConnectOptions::from_str(&url)
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable_lazy(|| format!("Invalid {DATABASE_URL}: {url}"))?;
        Self::connect_with(options).await
    }

    pub async fn open(path: impl AsRef<Path>) -> error_stack::Result<Self, KernelError> {
        let options = SqliteConnectOptions::new().filename(path);
        Self::connect_with(options).await
    }

    async fn connect_with(options: SqliteConnectOptions) -> error_stack::Result<Self, KernelError> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .convert_error()
            .attach_printable("Failed to open sqlite database")?;
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> error_stack::Result<(), KernelError> {
        // language=sqlite
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS book (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(250) NOT NULL UNIQUE,
                author VARCHAR(250) NOT NULL,
                rating FLOAT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .convert_error()
        .attach_printable("Failed to create book table")?;
        Ok(())
    }
}

pub struct SqliteTransaction(sqlx::Transaction<'static, Sqlite>);

impl Deref for SqliteTransaction {
    type Target = sqlx::SqliteConnection;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SqliteTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[async_trait::async_trait]
impl Transaction for SqliteTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for SqliteDatabase {
    type Transaction = SqliteTransaction;
    async fn transact(&self) -> error_stack::Result<SqliteTransaction, KernelError> {
        let transaction = self.pool.begin().await.convert_error()?;
        Ok(SqliteTransaction(transaction))
    }

    async fn transact_write(&self) -> error_stack::Result<SqliteTransaction, KernelError> {
        // A deferred transaction that reads first fails with SQLITE_BUSY_SNAPSHOT
        // once another writer commits. IMMEDIATE waits on busy_timeout instead.
        let transaction = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .convert_error()?;
        Ok(SqliteTransaction(transaction))
    }
}

impl DependOnBookQuery for SqliteDatabase {
    type BookQuery = SqliteBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &SqliteBookRepository
    }
}

impl DependOnBookModifier for SqliteDatabase {
    type BookModifier = SqliteBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &SqliteBookRepository
    }
}

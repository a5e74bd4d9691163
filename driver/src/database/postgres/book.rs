use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{
    AffectedRows, Book, BookAuthor, BookId, BookTitle, BookYear, CreatedAt, UpdatedAt, Version,
};
use kernel::KernelError;

use crate::database::postgres::PostgresDatabase;
use crate::error::ConvertError;

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery for PostgresBookRepository {
    type Connection = PoolConnection<Postgres>;

    async fn find_by_id(
        &self,
        con: &mut PoolConnection<Postgres>,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con, id).await
    }

    async fn find_all(
        &self,
        con: &mut PoolConnection<Postgres>,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_all(con).await
    }
}

#[async_trait::async_trait]
impl BookModifier for PostgresBookRepository {
    type Connection = PoolConnection<Postgres>;

    async fn create(
        &self,
        con: &mut PoolConnection<Postgres>,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::create(con, book).await
    }

    async fn update(
        &self,
        con: &mut PoolConnection<Postgres>,
        book: &Book,
    ) -> error_stack::Result<AffectedRows, KernelError> {
        PgBookInternal::update(con, book).await
    }

    async fn delete(
        &self,
        con: &mut PoolConnection<Postgres>,
        book_id: &BookId,
    ) -> error_stack::Result<AffectedRows, KernelError> {
        PgBookInternal::delete(con, book_id).await
    }
}

impl DependOnBookQuery for PostgresDatabase {
    type BookQuery = PostgresBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &PostgresBookRepository
    }
}

impl DependOnBookModifier for PostgresDatabase {
    type BookModifier = PostgresBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &PostgresBookRepository
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author: String,
    year: i32,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    version: i64,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        Book::new(
            BookId::new(value.id),
            BookTitle::new(value.title),
            BookAuthor::new(value.author),
            BookYear::new(value.year),
            CreatedAt::new(value.created_at),
            UpdatedAt::new(value.updated_at),
            Version::new(value.version),
        )
    }
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, year, created_at, updated_at, version
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        let found = row.map(Book::from);
        Ok(found)
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Book>, KernelError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, year, created_at, updated_at, version
            FROM books
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn create(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author, year, created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.year().as_ref())
        .bind(book.created_at().as_ref())
        .bind(book.updated_at().as_ref())
        .bind(book.version().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        debug!("Inserted book {}", book.id());
        Ok(())
    }

    async fn update(
        con: &mut PgConnection,
        book: &Book,
    ) -> error_stack::Result<AffectedRows, KernelError> {
        // $6 is the already incremented version; the row must still hold the one before it.
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3, year = $4, updated_at = $5, version = $6
            WHERE id = $1 AND version = $6 - 1
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.year().as_ref())
        .bind(book.updated_at().as_ref())
        .bind(book.version().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        debug!(
            "Conditional update of book {} affected {} row(s)",
            book.id(),
            result.rows_affected()
        );
        Ok(AffectedRows::new(result.rows_affected()))
    }

    async fn delete(
        con: &mut PgConnection,
        book_id: &BookId,
    ) -> error_stack::Result<AffectedRows, KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            DELETE FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(AffectedRows::new(result.rows_affected()))
    }
}

use error_stack::Report;
use sqlx::SqliteConnection;

use kernel::interface::query::BookQuery;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{Book, BookAuthor, BookId, BookRating, BookTitle, NewBook};
use kernel::KernelError;

use crate::database::sqlite::SqliteTransaction;
use crate::error::ConvertError;

pub struct SqliteBookRepository;

#[async_trait::async_trait]
impl BookQuery for SqliteBookRepository {
    type Transaction = SqliteTransaction;

    async fn find_all(
        &self,
        con: &mut SqliteTransaction,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        SqliteBookInternal::find_all(con).await
    }

    async fn find_by_id(
        &self,
        con: &mut SqliteTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        SqliteBookInternal::find_by_id(con, id).await
    }

    async fn find_by_title(
        &self,
        con: &mut SqliteTransaction,
        title: &BookTitle,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        SqliteBookInternal::find_by_title(con, title).await
    }
}

#[async_trait::async_trait]
impl BookModifier for SqliteBookRepository {
    type Transaction = SqliteTransaction;

    async fn create(
        &self,
        con: &mut SqliteTransaction,
        book: &NewBook,
    ) -> error_stack::Result<Book, KernelError> {
        SqliteBookInternal::create(con, book).await
    }

    async fn update_rating(
        &self,
        con: &mut SqliteTransaction,
        book_id: &BookId,
        rating: &BookRating,
    ) -> error_stack::Result<(), KernelError> {
        SqliteBookInternal::update_rating(con, book_id, rating).await
    }

    async fn delete(
        &self,
        con: &mut SqliteTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        SqliteBookInternal::delete(con, book_id).await
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    rating: f64,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        Book::new(
            BookId::new(value.id),
            BookTitle::new(value.title),
            BookAuthor::new(value.author),
            BookRating::new(value.rating),
        )
    }
}

pub(in crate::database) struct SqliteBookInternal;

impl SqliteBookInternal {
    async fn find_all(con: &mut SqliteConnection) -> error_stack::Result<Vec<Book>, KernelError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=sqlite
            r#"
            SELECT id, title, author, rating
            FROM book
            ORDER BY id
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(
        con: &mut SqliteConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=sqlite
            r#"
            SELECT id, title, author, rating
            FROM book
            WHERE id = ?
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn find_by_title(
        con: &mut SqliteConnection,
        title: &BookTitle,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=sqlite
            r#"
            SELECT id, title, author, rating
            FROM book
            WHERE title = ?
            "#,
        )
        .bind(title.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn create(
        con: &mut SqliteConnection,
        book: &NewBook,
    ) -> error_stack::Result<Book, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=sqlite
            r#"
            INSERT INTO book (title, author, rating)
            VALUES (?, ?, ?)
            RETURNING id, title, author, rating
            "#,
        )
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.rating().as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        let created = Book::from(row);
        tracing::info!("New book added: {} ({})", created.title().as_ref(), created.id());
        Ok(created)
    }

    async fn update_rating(
        con: &mut SqliteConnection,
        book_id: &BookId,
        rating: &BookRating,
    ) -> error_stack::Result<(), KernelError> {
        let result = sqlx::query(
            // language=sqlite
            r#"
            UPDATE book
            SET rating = ?
            WHERE id = ?
            "#,
        )
        .bind(rating.as_ref())
        .bind(book_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("No book with id {book_id} to update")));
        }
        Ok(())
    }

    async fn delete(
        con: &mut SqliteConnection,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        let result = sqlx::query(
            // language=sqlite
            r#"
            DELETE FROM book
            WHERE id = ?
            "#,
        )
        .bind(book_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("No book with id {book_id} to delete")));
        }
        Ok(())
    }
}

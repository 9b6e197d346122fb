use error_stack::Report;

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{BookAuthor, BookId, BookRating, BookTitle, NewBook};
use kernel::KernelError;

use crate::transfer::{
    BookDto, CreateBookDto, CreateBookOutcome, DeleteBookDto, GetBookDto, UpdateBookRatingDto,
};

#[async_trait::async_trait]
pub trait GetBookService: 'static + Sync + Send + DependOnBookQuery {
    async fn get_all_books(&self) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let books = self.book_query().find_all(&mut connection).await?;
        connection.roll_back().await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }

    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<Option<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let id = BookId::new(dto.id);
        let book = self.book_query().find_by_id(&mut connection, &id).await?;
        connection.roll_back().await?;
        Ok(book.map(BookDto::from))
    }
}

impl<T> GetBookService for T where T: DependOnBookQuery {}

#[async_trait::async_trait]
pub trait CreateBookService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier
{
    /// Stores a new book unless its title is taken, in which case nothing is written.
    async fn create_book(
        &self,
        dto: CreateBookDto,
    ) -> error_stack::Result<CreateBookOutcome, KernelError> {
        let mut connection = self.database_connection().transact_write().await?;

        let title = BookTitle::new(dto.title);
        if let Some(existing) = self
            .book_query()
            .find_by_title(&mut connection, &title)
            .await?
        {
            tracing::debug!("Book already exists: {}", existing.id());
            connection.roll_back().await?;
            return Ok(CreateBookOutcome::AlreadyExists {
                title: title.into(),
            });
        }

        let book = NewBook::new(title, BookAuthor::new(dto.author), BookRating::new(dto.rating));
        let created = match self.book_modifier().create(&mut connection, &book).await {
            Ok(created) => created,
            // Lost a race against another insert of the same title.
            Err(report) if report.current_context() == &KernelError::Conflict => {
                tracing::debug!("{report:?}");
                connection.roll_back().await?;
                return Ok(CreateBookOutcome::AlreadyExists {
                    title: book.title().clone().into(),
                });
            }
            Err(report) => return Err(report),
        };
        connection.commit().await?;

        Ok(CreateBookOutcome::Created(BookDto::from(created)))
    }
}

impl<T> CreateBookService for T where T: DependOnBookQuery + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait UpdateBookRatingService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier
{
    async fn update_book_rating(
        &self,
        dto: UpdateBookRatingDto,
    ) -> error_stack::Result<BookDto, KernelError> {
        let mut connection = self.database_connection().transact_write().await?;

        let id = BookId::new(dto.id);
        let Some(mut book) = self.book_query().find_by_id(&mut connection, &id).await? else {
            connection.roll_back().await?;
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("Book {id} not found")));
        };

        let rating = BookRating::new(dto.rating);
        self.book_modifier()
            .update_rating(&mut connection, &id, &rating)
            .await?;
        connection.commit().await?;
        tracing::info!("Book {id} rating updated to {}", rating.as_ref());

        book.substitute(|book| *book.rating = rating);
        Ok(BookDto::from(book))
    }
}

impl<T> UpdateBookRatingService for T where T: DependOnBookQuery + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait DeleteBookService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier
{
    /// Removes the book and hands back what it was.
    async fn delete_book(&self, dto: DeleteBookDto) -> error_stack::Result<BookDto, KernelError> {
        let mut connection = self.database_connection().transact_write().await?;

        let id = BookId::new(dto.id);
        let Some(book) = self.book_query().find_by_id(&mut connection, &id).await? else {
            connection.roll_back().await?;
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("Book {id} not found")));
        };

        self.book_modifier().delete(&mut connection, &id).await?;
        connection.commit().await?;
        tracing::info!("Book {id} deleted");

        Ok(BookDto::from(book))
    }
}

impl<T> DeleteBookService for T where T: DependOnBookQuery + DependOnBookModifier {}

use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Book, BookId, BookRating, NewBook};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    /// Fails with [`KernelError::Conflict`] when the title is already taken.
    async fn create(
        &self,
        con: &mut Self::Transaction,
        book: &NewBook,
    ) -> error_stack::Result<Book, KernelError>;
    /// Fails with [`KernelError::NotFound`] when no book has the id.
    async fn update_rating(
        &self,
        con: &mut Self::Transaction,
        book_id: &BookId,
        rating: &BookRating,
    ) -> error_stack::Result<(), KernelError>;
    /// Fails with [`KernelError::NotFound`] when no book has the id.
    async fn delete(
        &self,
        con: &mut Self::Transaction,
        book_id: &BookId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnBookModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookModifier: BookModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn book_modifier(&self) -> &Self::BookModifier;
}

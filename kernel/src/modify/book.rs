use crate::database::{DatabaseConnection, DependOnDatabaseConnection};
use crate::entity::{AffectedRows, Book, BookId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookModifier: 'static + Sync + Send {
    type Connection: 'static + Send;
    async fn create(
        &self,
        con: &mut Self::Connection,
        book: &Book,
    ) -> error_stack::Result<(), KernelError>;
    /// Writes `book` only if the stored version is exactly one behind `book.version()`.
    async fn update(
        &self,
        con: &mut Self::Connection,
        book: &Book,
    ) -> error_stack::Result<AffectedRows, KernelError>;
    async fn delete(
        &self,
        con: &mut Self::Connection,
        book_id: &BookId,
    ) -> error_stack::Result<AffectedRows, KernelError>;
}

pub trait DependOnBookModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookModifier: BookModifier<
        Connection = <Self::DatabaseConnection as DatabaseConnection>::Connection,
    >;
    fn book_modifier(&self) -> &Self::BookModifier;
}

use time::OffsetDateTime;
use uuid::Uuid;

use kernel::prelude::entity::{
    Book, BookAuthor, BookId, BookPatch, BookTitle, BookYear, CreatedAt, DestructBook, UpdatedAt,
    Version,
};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub version: i64,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        let DestructBook {
            id,
            title,
            author,
            year,
            created_at,
            updated_at,
            version,
        } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            year: year.into(),
            created_at: created_at.into(),
            updated_at: updated_at.into(),
            version: version.into(),
        }
    }
}

impl From<BookDto> for Book {
    fn from(value: BookDto) -> Self {
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

#[derive(Debug, Clone)]
pub struct GetBookDto {
    pub id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CreateBookDto {
    pub title: String,
    pub author: String,
    pub year: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBookDto {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
}

impl From<UpdateBookDto> for BookPatch {
    fn from(value: UpdateBookDto) -> Self {
        BookPatch::new(
            value.title.map(BookTitle::new),
            value.author.map(BookAuthor::new),
            value.year.map(BookYear::new),
        )
    }
}

#[derive(Debug, Clone)]
pub struct DeleteBookDto {
    pub id: Uuid,
}

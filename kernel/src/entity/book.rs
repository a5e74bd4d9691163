mod author;
mod id;
mod patch;
mod title;
mod year;

pub use self::{author::*, id::*, patch::*, title::*, year::*};
use crate::entity::common::{CreatedAt, UpdatedAt, Version};
use destructure::{Destructure, Mutation};
use time::OffsetDateTime;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    author: BookAuthor,
    year: BookYear,
    created_at: CreatedAt<Book>,
    updated_at: UpdatedAt<Book>,
    version: Version<Book>,
}

impl Book {
    pub fn new(
        id: BookId,
        title: BookTitle,
        author: BookAuthor,
        year: BookYear,
        created_at: CreatedAt<Book>,
        updated_at: UpdatedAt<Book>,
        version: Version<Book>,
    ) -> Self {
        Self {
            id,
            title,
            author,
            year,
            created_at,
            updated_at,
            version,
        }
    }

    /// A freshly created book: both timestamps are `now` and the version is the initial one.
    pub fn create(
        id: BookId,
        title: BookTitle,
        author: BookAuthor,
        year: BookYear,
        now: OffsetDateTime,
    ) -> Self {
        Self::new(
            id,
            title,
            author,
            year,
            CreatedAt::new(now),
            UpdatedAt::new(now),
            Version::initial(),
        )
    }

    /// Applies `patch` and stamps the result with `now` and the next version.
    ///
    /// `created_at` and `id` are never touched.
    pub fn patched(mut self, patch: BookPatch, now: OffsetDateTime) -> Self {
        let DestructBookPatch {
            title,
            author,
            year,
        } = patch.into_destruct();
        let version = self.version.next();
        self.substitute(|book| {
            if let Some(title) = title {
                *book.title = title;
            }
            if let Some(author) = author {
                *book.author = author;
            }
            if let Some(year) = year {
                *book.year = year;
            }
            *book.updated_at = UpdatedAt::new(now);
            *book.version = version;
        });
        self
    }
}

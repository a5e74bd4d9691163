use destructure::Destructure;

use crate::entity::{BookAuthor, BookTitle, BookYear};

/// Partial update of a [`Book`](crate::entity::Book).
///
/// `None` leaves the stored field untouched, `Some` replaces it.
#[derive(Debug, Clone, Default, Eq, PartialEq, Destructure)]
pub struct BookPatch {
    title: Option<BookTitle>,
    author: Option<BookAuthor>,
    year: Option<BookYear>,
}

impl BookPatch {
    pub fn new(
        title: Option<BookTitle>,
        author: Option<BookAuthor>,
        year: Option<BookYear>,
    ) -> Self {
        Self {
            title,
            author,
            year,
        }
    }
}

use error_stack::{Report, ResultExt};
use tracing::debug;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection};
use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{now_utc, Book, BookAuthor, BookId, BookPatch, BookTitle, BookYear};
use kernel::KernelError;

use crate::transfer::{BookDto, CreateBookDto, DeleteBookDto, GetBookDto, UpdateBookDto};

#[async_trait::async_trait]
pub trait GetBookService: 'static + Sync + Send + DependOnBookQuery {
    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<BookDto, KernelError> {
        let mut connection = self.database_connection().acquire().await?;

        let id = BookId::new(dto.id);
        let book = self
            .book_query()
            .find_by_id(&mut connection, &id)
            .await
            .attach_printable_lazy(|| format!("query: id[{id}]"))?;

        match book {
            Some(book) => Ok(BookDto::from(book)),
            None => Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("query: id[{id}]: book not found"))),
        }
    }
}

impl<T> GetBookService for T where T: DependOnBookQuery {}

#[async_trait::async_trait]
pub trait GetAllBookService: 'static + Sync + Send + DependOnBookQuery {
    /// Every book, most recently created first.
    async fn get_all_books(&self) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().acquire().await?;

        let books = self
            .book_query()
            .find_all(&mut connection)
            .await
            .attach_printable("query all")?;

        Ok(books.into_iter().map(BookDto::from).collect())
    }
}

impl<T> GetAllBookService for T where T: DependOnBookQuery {}

#[async_trait::async_trait]
pub trait CreateBookService: 'static + Sync + Send + DependOnBookModifier {
    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<BookDto, KernelError> {
        let mut connection = self.database_connection().acquire().await?;

        let book = Book::create(
            BookId::generate(),
            BookTitle::new(dto.title),
            BookAuthor::new(dto.author),
            BookYear::new(dto.year),
            now_utc(),
        );
        self.book_modifier()
            .create(&mut connection, &book)
            .await
            .attach_printable_lazy(|| format!("create: id[{}]", book.id()))?;

        debug!("Created book {}", book.id());
        Ok(BookDto::from(book))
    }
}

impl<T> CreateBookService for T where T: DependOnBookModifier {}

#[async_trait::async_trait]
pub trait UpdateBookService: 'static + Sync + Send + DependOnBookModifier {
    /// Applies `dto` onto `current` and writes the result only if the stored row
    /// still carries `current.version`.
    ///
    /// A row that vanished and a row that another writer already advanced both
    /// surface as [`KernelError::NotFound`]. Nothing is retried here.
    async fn update_book(
        &self,
        current: BookDto,
        dto: UpdateBookDto,
    ) -> error_stack::Result<BookDto, KernelError> {
        let mut connection = self.database_connection().acquire().await?;

        let current = Book::from(current);
        let expected = *current.version().as_ref();
        let updated = current.patched(BookPatch::from(dto), now_utc());
        let id = updated.id().clone();

        let affected = self
            .book_modifier()
            .update(&mut connection, &updated)
            .await
            .attach_printable_lazy(|| format!("update: id[{id}]"))?;

        if affected.is_none() {
            return Err(Report::new(KernelError::NotFound).attach_printable(format!(
                "update: id[{id}]: no row at version {expected}"
            )));
        }

        debug!("Updated book {id} to version {}", updated.version().as_ref());
        Ok(BookDto::from(updated))
    }
}

impl<T> UpdateBookService for T where T: DependOnBookModifier {}

#[async_trait::async_trait]
pub trait PatchBookService: 'static + Sync + Send + GetBookService + UpdateBookService {
    /// Fetches the current state of the book, then performs a single conditional update.
    async fn patch_book(
        &self,
        id: GetBookDto,
        dto: UpdateBookDto,
    ) -> error_stack::Result<BookDto, KernelError> {
        let current = self.get_book(id).await?;
        self.update_book(current, dto).await
    }
}

impl<T> PatchBookService for T where T: GetBookService + UpdateBookService {}

#[async_trait::async_trait]
pub trait DeleteBookService: 'static + Sync + Send + DependOnBookModifier {
    async fn delete_book(&self, dto: DeleteBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().acquire().await?;

        let id = BookId::new(dto.id);
        let affected = self
            .book_modifier()
            .delete(&mut connection, &id)
            .await
            .attach_printable_lazy(|| format!("delete: id[{id}]"))?;

        if affected.is_none() {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("delete: id[{id}]: book not found")));
        }

        debug!("Deleted book {id}");
        Ok(())
    }
}

impl<T> DeleteBookService for T where T: DependOnBookModifier {}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::{BookQuery, DependOnBookQuery};
    use kernel::interface::update::{BookModifier, DependOnBookModifier};
    use kernel::prelude::entity::{AffectedRows, Book, BookId};
    use kernel::KernelError;
    use uuid::Uuid;

    use crate::service::{
        CreateBookService, DeleteBookService, GetAllBookService, GetBookService,
        PatchBookService, UpdateBookService,
    };
    use crate::transfer::{CreateBookDto, DeleteBookDto, GetBookDto, UpdateBookDto};

    type Rows = Arc<Mutex<HashMap<BookId, Book>>>;

    #[derive(Default)]
    struct InMemoryDatabase {
        rows: Rows,
    }

    #[async_trait::async_trait]
    impl DatabaseConnection for InMemoryDatabase {
        type Connection = Rows;
        async fn acquire(&self) -> error_stack::Result<Rows, KernelError> {
            Ok(self.rows.clone())
        }
    }

    struct InMemoryBookRepository;

    #[async_trait::async_trait]
    impl BookQuery for InMemoryBookRepository {
        type Connection = Rows;
        async fn find_by_id(
            &self,
            con: &mut Rows,
            id: &BookId,
        ) -> error_stack::Result<Option<Book>, KernelError> {
            Ok(con.lock().unwrap().get(id).cloned())
        }

        async fn find_all(&self, con: &mut Rows) -> error_stack::Result<Vec<Book>, KernelError> {
            let mut books = con.lock().unwrap().values().cloned().collect::<Vec<_>>();
            books.sort_by(|a, b| b.created_at().as_ref().cmp(a.created_at().as_ref()));
            Ok(books)
        }
    }

    #[async_trait::async_trait]
    impl BookModifier for InMemoryBookRepository {
        type Connection = Rows;
        async fn create(&self, con: &mut Rows, book: &Book) -> error_stack::Result<(), KernelError> {
            con.lock().unwrap().insert(book.id().clone(), book.clone());
            Ok(())
        }

        async fn update(
            &self,
            con: &mut Rows,
            book: &Book,
        ) -> error_stack::Result<AffectedRows, KernelError> {
            let mut rows = con.lock().unwrap();
            match rows.get_mut(book.id()) {
                Some(stored) if stored.version() == &book.version().previous() => {
                    *stored = book.clone();
                    Ok(AffectedRows::new(1u64))
                }
                _ => Ok(AffectedRows::new(0u64)),
            }
        }

        async fn delete(
            &self,
            con: &mut Rows,
            book_id: &BookId,
        ) -> error_stack::Result<AffectedRows, KernelError> {
            let removed = con.lock().unwrap().remove(book_id);
            Ok(AffectedRows::new(u64::from(removed.is_some())))
        }
    }

    impl DependOnBookQuery for InMemoryDatabase {
        type BookQuery = InMemoryBookRepository;
        fn book_query(&self) -> &Self::BookQuery {
            &InMemoryBookRepository
        }
    }

    impl DependOnBookModifier for InMemoryDatabase {
        type BookModifier = InMemoryBookRepository;
        fn book_modifier(&self) -> &Self::BookModifier {
            &InMemoryBookRepository
        }
    }

    fn new_book(title: &str) -> CreateBookDto {
        CreateBookDto {
            title: title.to_string(),
            author: "Kent Beck".to_string(),
            year: 2003,
        }
    }

    #[tokio::test]
    async fn create_starts_at_version_one() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::default();
        let created = db.create_book(new_book("Test Driven Development")).await?;

        assert_eq!(created.version, 1);
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(created.title, "Test Driven Development");

        let found = db.get_book(GetBookDto { id: created.id }).await?;
        assert_eq!(found, created);
        Ok(())
    }

    #[tokio::test]
    async fn update_merges_patch_and_bumps_version() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::default();
        let created = db.create_book(new_book("Test Driven Development")).await?;

        let patch = UpdateBookDto {
            title: Some("Refactoring".to_string()),
            author: None,
            year: Some(1999),
        };
        let updated = db.update_book(created.clone(), patch).await?;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Refactoring");
        assert_eq!(updated.author, created.author);
        assert_eq!(updated.year, 1999);
        assert_eq!(updated.version, created.version + 1);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let found = db.get_book(GetBookDto { id: created.id }).await?;
        assert_eq!(found, updated);
        Ok(())
    }

    #[tokio::test]
    async fn stale_update_is_rejected() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::default();
        let created = db.create_book(new_book("Test Driven Development")).await?;

        db.update_book(created.clone(), UpdateBookDto::default())
            .await?;
        let stale = db
            .update_book(
                created.clone(),
                UpdateBookDto {
                    title: Some("Lost update".to_string()),
                    ..UpdateBookDto::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(stale.current_context(), &KernelError::NotFound);

        let found = db.get_book(GetBookDto { id: created.id }).await?;
        assert_eq!(found.version, 2);
        assert_eq!(found.title, created.title);
        Ok(())
    }

    #[tokio::test]
    async fn patch_reads_latest_version() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::default();
        let created = db.create_book(new_book("Test Driven Development")).await?;

        for _ in 0..3 {
            db.patch_book(GetBookDto { id: created.id }, UpdateBookDto::default())
                .await?;
        }
        let found = db.get_book(GetBookDto { id: created.id }).await?;
        assert_eq!(found.version, 4);
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::default();
        let created = db.create_book(new_book("Test Driven Development")).await?;

        db.delete_book(DeleteBookDto { id: created.id }).await?;

        let report = db.get_book(GetBookDto { id: created.id }).await.unwrap_err();
        assert_eq!(report.current_context(), &KernelError::NotFound);

        let report = db
            .delete_book(DeleteBookDto { id: created.id })
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::NotFound);

        let report = db
            .update_book(created, UpdateBookDto::default())
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let db = InMemoryDatabase::default();
        let report = db
            .get_book(GetBookDto { id: Uuid::new_v4() })
            .await
            .unwrap_err();
        assert_eq!(report.current_context(), &KernelError::NotFound);
    }

    #[tokio::test]
    async fn get_all_is_newest_first() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::default();
        assert!(db.get_all_books().await?.is_empty());

        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            ids.push(db.create_book(new_book(title)).await?.id);
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let titles = db
            .get_all_books()
            .await?
            .into_iter()
            .map(|book| book.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, ["C", "B", "A"]);
        Ok(())
    }
}

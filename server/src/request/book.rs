use application::transfer::{CreateBookDto, DeleteBookDto, GetBookDto, UpdateBookDto};
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::controller::{Intake, TryIntake};
use crate::error::ValidationError;

const TITLE_MAX_CHARS: usize = 100;
const AUTHOR_MAX_CHARS: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct CreateBookRequest {
    title: Option<String>,
    author: Option<String>,
    year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookRequest {
    title: Option<String>,
    author: Option<String>,
    year: Option<i32>,
}

#[derive(Debug)]
pub struct GetBookRequest {
    id: Uuid,
}

impl GetBookRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct DeleteBookRequest {
    id: Uuid,
}

impl DeleteBookRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

pub struct BookTransformer;

impl TryIntake<CreateBookRequest> for BookTransformer {
    type To = CreateBookDto;
    type Error = ValidationError;
    fn emit(&self, input: CreateBookRequest) -> Result<Self::To, Self::Error> {
        let title = input.title.unwrap_or_default();
        let author = input.author.unwrap_or_default();
        let year = input.year.unwrap_or_default();

        let mut validation = ValidationError::default();
        validation.check(!title.is_empty(), "title", "title is required");
        check_title(&mut validation, &title);
        validation.check(!author.is_empty(), "author", "author is required");
        check_author(&mut validation, &author);
        check_year(&mut validation, year);

        validation.into_result(CreateBookDto {
            title,
            author,
            year,
        })
    }
}

impl TryIntake<(Uuid, UpdateBookRequest)> for BookTransformer {
    type To = (GetBookDto, UpdateBookDto);
    type Error = ValidationError;
    fn emit(&self, input: (Uuid, UpdateBookRequest)) -> Result<Self::To, Self::Error> {
        let (id, input) = input;

        let mut validation = ValidationError::default();
        if let Some(title) = &input.title {
            validation.check(!title.is_empty(), "title", "title must be provided");
            check_title(&mut validation, title);
        }
        if let Some(author) = &input.author {
            validation.check(!author.is_empty(), "author", "author must be provided");
            check_author(&mut validation, author);
        }
        if let Some(year) = input.year {
            check_year(&mut validation, year);
        }

        validation.into_result((
            GetBookDto { id },
            UpdateBookDto {
                title: input.title,
                author: input.author,
                year: input.year,
            },
        ))
    }
}

impl Intake<GetBookRequest> for BookTransformer {
    type To = GetBookDto;
    fn emit(&self, input: GetBookRequest) -> Self::To {
        GetBookDto { id: input.id }
    }
}

impl Intake<DeleteBookRequest> for BookTransformer {
    type To = DeleteBookDto;
    fn emit(&self, input: DeleteBookRequest) -> Self::To {
        DeleteBookDto { id: input.id }
    }
}

fn check_title(validation: &mut ValidationError, title: &str) {
    validation.check(
        title.chars().count() <= TITLE_MAX_CHARS,
        "title",
        format!("title must not exceed {TITLE_MAX_CHARS} characters"),
    );
}

fn check_author(validation: &mut ValidationError, author: &str) {
    validation.check(
        author.chars().count() <= AUTHOR_MAX_CHARS,
        "author",
        format!("author must not exceed {AUTHOR_MAX_CHARS} characters"),
    );
}

fn check_year(validation: &mut ValidationError, year: i32) {
    let current = OffsetDateTime::now_utc().year();
    validation.check(year >= 1, "year", "year must be a positive number");
    validation.check(
        year <= current,
        "year",
        format!("year cannot be in the future (max {current})"),
    );
}

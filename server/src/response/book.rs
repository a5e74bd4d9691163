use application::transfer::BookDto;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::controller::Exhaust;

#[derive(Debug, Serialize)]
pub struct BookResponse {
    id: Uuid,
    title: String,
    author: String,
    year: i32,
    #[serde(with = "time::serde::rfc3339")]
    date_created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    date_updated: OffsetDateTime,
}

impl From<BookDto> for BookResponse {
    fn from(value: BookDto) -> Self {
        Self {
            id: value.id,
            title: value.title,
            author: value.author,
            year: value.year,
            date_created: value.created_at,
            date_updated: value.updated_at,
        }
    }
}

impl IntoResponse for BookResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug)]
pub struct CreatedResponse(BookResponse);

impl IntoResponse for CreatedResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

pub struct BookPresenter;

impl Exhaust<BookDto> for BookPresenter {
    type To = BookResponse;
    fn emit(&self, input: BookDto) -> Self::To {
        BookResponse::from(input)
    }
}

impl Exhaust<Vec<BookDto>> for BookPresenter {
    type To = Json<Vec<BookResponse>>;
    fn emit(&self, input: Vec<BookDto>) -> Self::To {
        let result = input
            .into_iter()
            .map(BookResponse::from)
            .collect::<Vec<_>>();

        Json::from(result)
    }
}

impl Exhaust<()> for BookPresenter {
    type To = StatusCode;
    fn emit(&self, _: ()) -> Self::To {
        StatusCode::NO_CONTENT
    }
}

pub struct CreatedBookPresenter;

impl Exhaust<BookDto> for CreatedBookPresenter {
    type To = CreatedResponse;
    fn emit(&self, input: BookDto) -> Self::To {
        CreatedResponse(BookResponse::from(input))
    }
}

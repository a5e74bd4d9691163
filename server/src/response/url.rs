use application::transfer::ProcessedUrlDto;
use axum::Json;
use serde::Serialize;

use crate::controller::Exhaust;

#[derive(Debug, Serialize)]
pub struct ProcessedUrlResponse {
    processed_url: String,
}

pub struct UrlPresenter;

impl Exhaust<ProcessedUrlDto> for UrlPresenter {
    type To = Json<ProcessedUrlResponse>;
    fn emit(&self, input: ProcessedUrlDto) -> Self::To {
        Json(ProcessedUrlResponse {
            processed_url: input.processed_url,
        })
    }
}

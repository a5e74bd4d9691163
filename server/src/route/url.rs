use application::service::ProcessUrlService;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::request::{ProcessUrlRequest, UrlTransformer};
use crate::response::UrlPresenter;

pub trait UrlRouter {
    fn route_url(self) -> Self;
}

impl UrlRouter for Router<AppModule> {
    fn route_url(self) -> Self {
        self.route(
            "/url/process",
            post(
                |State(module): State<AppModule>, Json(req): Json<ProcessUrlRequest>| async move {
                    Controller::new(UrlTransformer, UrlPresenter)
                        .try_intake(req)?
                        .handle(|dto| async move { module.process_url(dto) })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}

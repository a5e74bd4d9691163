use application::service::{
    CreateBookService, DeleteBookService, GetAllBookService, GetBookService, PatchBookService,
};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::request::{
    BookTransformer, CreateBookRequest, DeleteBookRequest, GetBookRequest, UpdateBookRequest,
};
use crate::response::{BookPresenter, CreatedBookPresenter};

pub trait BookRouter {
    fn route_book(self) -> Self;
}

impl BookRouter for Router<AppModule> {
    fn route_book(self) -> Self {
        self.route(
            "/books",
            get(|State(module): State<AppModule>| async move {
                let scope = module.scope();
                Controller::new(BookTransformer, BookPresenter)
                    .bypass(|| scope.run(module.pgpool().get_all_books()))
                    .await
                    .map_err(ErrorStatus::from)
            })
            .post(
                |State(module): State<AppModule>, Json(req): Json<CreateBookRequest>| async move {
                    let scope = module.scope();
                    Controller::new(BookTransformer, CreatedBookPresenter)
                        .try_intake(req)?
                        .handle(|dto| scope.run(module.pgpool().create_book(dto)))
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    let scope = module.scope();
                    Controller::new(BookTransformer, BookPresenter)
                        .intake(GetBookRequest::new(id))
                        .handle(|dto| scope.run(module.pgpool().get_book(dto)))
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .put(
                |State(module): State<AppModule>,
                 Path(id): Path<Uuid>,
                 Json(req): Json<UpdateBookRequest>| async move {
                    let scope = module.scope();
                    Controller::new(BookTransformer, BookPresenter)
                        .try_intake((id, req))?
                        .handle(|(book, patch)| {
                            scope.run(module.pgpool().patch_book(book, patch))
                        })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    let scope = module.scope();
                    Controller::new(BookTransformer, BookPresenter)
                        .intake(DeleteBookRequest::new(id))
                        .handle(|dto| scope.run(module.pgpool().delete_book(dto)))
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}

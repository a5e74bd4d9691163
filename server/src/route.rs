mod book;
mod status;
mod url;

pub use self::{book::*, status::*, url::*};

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::AppModule;

pub fn app(module: AppModule) -> Router {
    Router::<AppModule>::new()
        .route_status()
        .route_book()
        .route_url()
        .layer(TraceLayer::new_for_http())
        .with_state(module)
}

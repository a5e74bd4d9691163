use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::handler::AppModule;

pub trait StatusRouter {
    fn route_status(self) -> Self;
}

impl StatusRouter for Router<AppModule> {
    fn route_status(self) -> Self {
        self.route(
            "/status",
            get(|| async { Json::<Value>(json!({ "status": "ok" })) }),
        )
    }
}

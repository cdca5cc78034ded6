pub mod incidents;

use axum::Router;

use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    incidents::router()
}

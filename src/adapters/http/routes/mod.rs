pub mod organization;
pub mod registration;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/organizations", organization::router())
        .merge(registration::router())
}

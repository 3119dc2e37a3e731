use anyhow::Result;
use askama::Template;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use sqlx::SqlitePool;
use tower_http::services::ServeDir;

use config::AppConfig;
use models::ModelError;

mod api;
mod config;
mod db;
mod models;
mod routes;
mod services;
mod views;

/// Any handler failure, rendered as `error.html`.
pub struct AppError(anyhow::Error);

/// Status for an error bubbled out of a handler. Model errors the user can act
/// on map to 4xx, everything else is a 500.
pub fn error_status(err: &anyhow::Error) -> StatusCode {
    if err.is::<JsonRejection>() || err.is::<PathRejection>() {
        return StatusCode::BAD_REQUEST;
    }
    match err.downcast_ref::<ModelError>() {
        Some(ModelError::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(ModelError::Duplicate(_)) => StatusCode::CONFLICT,
        Some(ModelError::Invalid(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPageTemplate {
    message: String,
    status_code: StatusCode,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = error_status(&self.0);
        if status_code.is_server_error() {
            log::error!("{:#}", self.0);
        }
        (
            status_code,
            ErrorPageTemplate {
                status_code,
                message: self.0.to_string(),
            },
        )
            .into_response()
    }
}

// Lets handlers use `?` on anything anyhow accepts.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

async fn not_found() -> (StatusCode, ErrorPageTemplate) {
    (
        StatusCode::NOT_FOUND,
        ErrorPageTemplate {
            status_code: StatusCode::NOT_FOUND,
            message: "Not found".to_string(),
        },
    )
}

pub fn app(pool: SqlitePool, config: &AppConfig) -> Router {
    Router::new()
        .merge(routes::get_routes())
        .route(
            "/book-list/export",
            get(views::books::export::download_book_csv),
        )
        .nest("/api", api::get_routes())
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .fallback(not_found)
        .layer(Extension(pool))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    pretty_env_logger::init();

    let pool = db::connect(&config.database_url).await?;
    let app = app(pool, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

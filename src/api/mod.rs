use axum::{
    extract::Path,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error_status,
    models::entity::{EntityKind, NameInput},
};

mod books;
mod entities;

/// JSON flavour of `AppError`: `{"detail": "..."}` with the same status mapping.
pub struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = error_status(&self.0);
        if status.is_server_error() {
            log::error!("{:#}", self.0);
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// `Json` body whose rejection is answered as an `ApiError`.
pub type ApiJson<T> = WithRejection<Json<T>, ApiError>;
/// `Path` whose rejection is answered as an `ApiError`.
pub type ApiPath<T> = WithRejection<Path<T>, ApiError>;

fn entity_routes(router: Router, kind: EntityKind) -> Router {
    let collection = format!("/{}", kind.table());
    let item = format!("/{}/:id", kind.table());
    router
        .route(
            &collection,
            get(move |Extension(pool): Extension<SqlitePool>| entities::list(pool, kind)).post(
                move |Extension(pool): Extension<SqlitePool>, WithRejection(Json(input), _): ApiJson<NameInput>| {
                    entities::create(pool, kind, input)
                },
            ),
        )
        .route(
            &item,
            get(move |Extension(pool): Extension<SqlitePool>, WithRejection(Path(id), _): ApiPath<i64>| {
                entities::get(pool, kind, id)
            })
            .put(
                move |Extension(pool): Extension<SqlitePool>,
                      WithRejection(Path(id), _): ApiPath<i64>,
                      WithRejection(Json(input), _): ApiJson<NameInput>| {
                    entities::update(pool, kind, id, input)
                },
            )
            .delete(move |Extension(pool): Extension<SqlitePool>, WithRejection(Path(id), _): ApiPath<i64>| {
                entities::delete(pool, kind, id)
            }),
        )
}

pub fn get_routes() -> Router {
    let router = Router::new()
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        );
    [EntityKind::Author, EntityKind::Category]
        .into_iter()
        .fold(router, entity_routes)
}

use axum::{
    extract::{DefaultBodyLimit, MatchedPath, Request},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, MethodRouter},
    Router,
};

use crate::{
    models::entity::EntityKind,
    views::{books, entities, home},
};

/// Response header naming the route a request resolved to.
pub const ROUTE_NAME_HEADER: &str = "x-route-name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    BookList,
    Book,
    BookRegister,
    AuthorList,
    Author,
    AuthorRegister,
    CategoryList,
    Category,
    CategoryRegister,
}

impl View {
    fn method_router(self) -> MethodRouter {
        match self {
            View::Home => get(home::view_home),
            View::BookList => get(books::book_list::view_book_list),
            View::Book => get(books::details::view_book_details),
            View::BookRegister => get(books::register::view_book_register)
                .post(books::register::post_book_register)
                .layer(DefaultBodyLimit::max(books::register::UPLOAD_LIMIT)),
            View::AuthorList => entities::list_route(EntityKind::Author),
            View::Author => entities::details_route(EntityKind::Author),
            View::AuthorRegister => entities::register_route(EntityKind::Author),
            View::CategoryList => entities::list_route(EntityKind::Category),
            View::Category => entities::details_route(EntityKind::Category),
            View::CategoryRegister => entities::register_route(EntityKind::Category),
        }
    }
}

#[derive(Debug)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
}

pub static ROUTES: [Route; 10] = [
    Route { path: "/", name: "home", view: View::Home },
    Route { path: "/book-list", name: "book-list", view: View::BookList },
    Route { path: "/book/:id", name: "book", view: View::Book },
    Route { path: "/book-register", name: "book-register", view: View::BookRegister },
    Route { path: "/author-list", name: "author-list", view: View::AuthorList },
    Route { path: "/author/:id", name: "author", view: View::Author },
    Route { path: "/author-register", name: "author-register", view: View::AuthorRegister },
    Route { path: "/category-list", name: "category-list", view: View::CategoryList },
    Route { path: "/category/:id", name: "category", view: View::Category },
    Route { path: "/category-register", name: "category-register", view: View::CategoryRegister },
];

const ID_PARAM: &str = ":id";

impl Route {
    pub fn has_id(&self) -> bool {
        self.path.contains(ID_PARAM)
    }
}

pub fn route_by_name(name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.name == name)
}

pub fn route_by_path(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.path == path)
}

/// Builds the concrete URL of a named route. `id` must be given exactly when
/// the route has an `:id` segment.
pub fn url_for(name: &str, id: Option<i64>) -> Option<String> {
    let route = route_by_name(name)?;
    match (route.has_id(), id) {
        (true, Some(id)) => Some(route.path.replace(ID_PARAM, &id.to_string())),
        (false, None) => Some(route.path.to_string()),
        _ => None,
    }
}

async fn tag_route(matched_path: MatchedPath, request: Request, next: Next) -> Response {
    let route = route_by_path(matched_path.as_str());
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;
    if let Some(route) = route {
        log::debug!("{} resolved to {}", path, route.name);
        response.headers_mut().insert(
            HeaderName::from_static(ROUTE_NAME_HEADER),
            HeaderValue::from_static(route.name),
        );
    }
    response
}

pub fn get_routes() -> Router {
    ROUTES
        .iter()
        .fold(Router::new(), |router, route| {
            router.route(route.path, route.view.method_router())
        })
        .route_layer(middleware::from_fn(tag_route))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{app, config::AppConfig, db::test_pool};

    #[test]
    fn names_and_paths_are_unique() {
        let names: HashSet<_> = ROUTES.iter().map(|r| r.name).collect();
        let paths: HashSet<_> = ROUTES.iter().map(|r| r.path).collect();
        assert_eq!(names.len(), ROUTES.len());
        assert_eq!(paths.len(), ROUTES.len());
    }

    #[test]
    fn every_view_has_exactly_one_route() {
        let views: HashSet<_> = ROUTES.iter().map(|r| format!("{:?}", r.view)).collect();
        assert_eq!(views.len(), ROUTES.len());
    }

    #[test]
    fn url_for_substitutes_id() {
        assert_eq!(url_for("home", None).as_deref(), Some("/"));
        assert_eq!(url_for("book", Some(42)).as_deref(), Some("/book/42"));
        assert_eq!(url_for("category-register", None).as_deref(), Some("/category-register"));
        assert_eq!(url_for("book", None), None);
        assert_eq!(url_for("book-list", Some(1)), None);
        assert_eq!(url_for("nonexistent", None), None);
    }

    #[test]
    fn lookups() {
        assert_eq!(route_by_name("author").map(|r| r.view), Some(View::Author));
        assert_eq!(route_by_path("/category/:id").map(|r| r.name), Some("category"));
        assert!(route_by_path("/category/1").is_none());
    }

    async fn resolve(uri: &str) -> (StatusCode, Option<String>, String) {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO books (id, title, published_date) VALUES (42, 'The Answer', '2006-03-28')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO authors (id, name) VALUES (42, 'Author42')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO categories (id, name) VALUES (42, 'Category42')")
            .execute(&pool)
            .await
            .unwrap();
        let response = app(pool, &AppConfig::default())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let name = response
            .headers()
            .get(ROUTE_NAME_HEADER)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, name, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn every_path_resolves_to_its_own_name() {
        for route in ROUTES.iter() {
            let uri = url_for(route.name, route.has_id().then_some(42)).unwrap();
            let (status, name, _) = resolve(&uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(name.as_deref(), Some(route.name), "{}", uri);
        }
    }

    #[tokio::test]
    async fn id_segment_reaches_the_view() {
        let (_, name, body) = resolve("/book/42").await;
        assert_eq!(name.as_deref(), Some("book"));
        assert!(body.contains("The Answer"));

        let (_, _, body) = resolve("/author/42").await;
        assert!(body.contains("Author42"));
        let (_, _, body) = resolve("/category/42").await;
        assert!(body.contains("Category42"));
    }

    #[tokio::test]
    async fn unknown_id_is_still_the_detail_route() {
        let (status, name, _) = resolve("/book/7").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(name.as_deref(), Some("book"));
    }

    #[tokio::test]
    async fn undefined_paths_match_nothing() {
        for uri in ["/nonexistent", "/book", "/book/42/extra", "/books-list"] {
            let (status, name, _) = resolve(uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(name, None, "{}", uri);
        }
    }
}

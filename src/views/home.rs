use askama::Template;

use crate::{routes::url_for, AppError};

pub struct NavLink {
    pub label: &'static str,
    pub href: String,
}

const NAV: [(&str, &str); 6] = [
    ("Books", "book-list"),
    ("Register a book", "book-register"),
    ("Authors", "author-list"),
    ("Register an author", "author-register"),
    ("Categories", "category-list"),
    ("Register a category", "category-register"),
];

#[derive(Template)]
#[template(path = "home.html")]
pub struct Home {
    links: Vec<NavLink>,
}

#[axum::debug_handler]
pub async fn view_home() -> Result<Home, AppError> {
    let links = NAV
        .iter()
        .filter_map(|&(label, name)| url_for(name, None).map(|href| NavLink { label, href }))
        .collect();
    Ok(Home { links })
}

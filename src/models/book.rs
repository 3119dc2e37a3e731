use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

use super::{
    entity::{find_or_create, Author, Category, Entity, EntityKind},
    validate_text, ModelError,
};

pub const TITLE_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub published_date: NaiveDate,
    pub categories: Vec<Category>,
    pub authors: Vec<Author>,
}

impl Book {
    pub fn author_names(&self) -> String {
        join_names(&self.authors)
    }

    pub fn category_names(&self) -> String {
        join_names(&self.categories)
    }
}

fn join_names(entities: &[Entity]) -> String {
    entities
        .iter()
        .map(|e| e.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    published_date: NaiveDate,
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    book_id: i64,
    id: i64,
    name: String,
}

/// Fields needed to write a book. Authors and categories are referenced by name.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub published_date: NaiveDate,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct BookFilter {
    pub author: Option<i64>,
    pub category: Option<i64>,
}

impl BookFilter {
    pub fn query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(author) = self.author {
            parts.push(format!("author={}", author));
        }
        if let Some(category) = self.category {
            parts.push(format!("category={}", category));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

async fn load_links(
    pool: &SqlitePool,
    kind: EntityKind,
    book_id: Option<i64>,
) -> Result<HashMap<i64, Vec<Entity>>, ModelError> {
    let sql = format!(
        r#"
        SELECT l.book_id, e.id, e.name
        FROM {link} l
        JOIN {table} e ON e.id = l.{column}
        WHERE (?1 IS NULL OR l.book_id = ?1)
        ORDER BY e.id ASC
        "#,
        link = kind.link_table(),
        table = kind.table(),
        column = kind.link_column(),
    );
    let rows = sqlx::query_as::<_, LinkRow>(&sql)
        .bind(book_id)
        .fetch_all(pool)
        .await?;
    let mut links: HashMap<i64, Vec<Entity>> = HashMap::new();
    for row in rows {
        links.entry(row.book_id).or_default().push(Entity {
            id: row.id,
            name: row.name,
        });
    }
    Ok(links)
}

async fn attach_links(pool: &SqlitePool, rows: Vec<BookRow>, book_id: Option<i64>) -> Result<Vec<Book>, ModelError> {
    let mut authors = load_links(pool, EntityKind::Author, book_id).await?;
    let mut categories = load_links(pool, EntityKind::Category, book_id).await?;
    Ok(rows
        .into_iter()
        .map(|row| Book {
            authors: authors.remove(&row.id).unwrap_or_default(),
            categories: categories.remove(&row.id).unwrap_or_default(),
            id: row.id,
            title: row.title,
            published_date: row.published_date,
        })
        .collect())
}

pub async fn list_books(pool: &SqlitePool, filter: BookFilter) -> Result<Vec<Book>, ModelError> {
    let rows = sqlx::query_as::<_, BookRow>(
        r#"
        SELECT id, title, published_date
        FROM books
        WHERE (?1 IS NULL OR id IN (SELECT book_id FROM book_authors WHERE author_id = ?1))
        AND (?2 IS NULL OR id IN (SELECT book_id FROM book_categories WHERE category_id = ?2))
        ORDER BY id ASC
        "#,
    )
    .bind(filter.author)
    .bind(filter.category)
    .fetch_all(pool)
    .await?;
    attach_links(pool, rows, None).await
}

pub async fn get_book(pool: &SqlitePool, id: i64) -> Result<Option<Book>, ModelError> {
    let row = sqlx::query_as::<_, BookRow>(
        "SELECT id, title, published_date FROM books WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    match row {
        Some(row) => Ok(attach_links(pool, vec![row], Some(id)).await?.pop()),
        None => Ok(None),
    }
}

fn author_set(names: &[String]) -> BTreeSet<String> {
    names.iter().map(|n| n.trim().to_string()).collect()
}

/// A book is a duplicate when another one has the same title and the same author names.
pub async fn is_duplicate_book(
    pool: &SqlitePool,
    title: &str,
    authors: &[String],
) -> Result<bool, ModelError> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM books WHERE title = ?")
        .bind(title.trim())
        .fetch_all(pool)
        .await?;
    let wanted = author_set(authors);
    for id in ids {
        let links = load_links(pool, EntityKind::Author, Some(id)).await?;
        let existing: BTreeSet<String> = links
            .get(&id)
            .map(|authors| authors.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default();
        if existing == wanted {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn validate_book(book: &NewBook) -> Result<(), ModelError> {
    validate_text("Title", &book.title, TITLE_MAX_LEN)?;
    for name in &book.authors {
        EntityKind::Author.validate_name(name)?;
    }
    for name in &book.categories {
        EntityKind::Category.validate_name(name)?;
    }
    Ok(())
}

async fn link_entities(
    conn: &mut SqliteConnection,
    book_id: i64,
    kind: EntityKind,
    names: &[String],
) -> Result<(), ModelError> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} (book_id, {}) VALUES (?, ?)",
        kind.link_table(),
        kind.link_column()
    );
    for name in names {
        let entity_id = find_or_create(&mut *conn, kind, name).await?;
        sqlx::query(&sql)
            .bind(book_id)
            .bind(entity_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Inserts the book and its links on an open connection or transaction.
pub async fn insert_book(conn: &mut SqliteConnection, book: &NewBook) -> Result<i64, ModelError> {
    let id = sqlx::query("INSERT INTO books (title, published_date) VALUES (?, ?)")
        .bind(book.title.trim())
        .bind(book.published_date)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    link_entities(&mut *conn, id, EntityKind::Category, &book.categories).await?;
    link_entities(&mut *conn, id, EntityKind::Author, &book.authors).await?;
    Ok(id)
}

pub async fn create_book(pool: &SqlitePool, book: &NewBook) -> Result<Book, ModelError> {
    validate_book(book)?;
    let mut tx = pool.begin().await?;
    let id = insert_book(&mut tx, book).await?;
    tx.commit().await?;
    log::info!("created book {} ({})", id, book.title);
    get_book(pool, id).await?.ok_or(ModelError::NotFound("book"))
}

/// Replaces the title, date and every author/category link of a book.
pub async fn update_book(pool: &SqlitePool, id: i64, book: &NewBook) -> Result<Book, ModelError> {
    validate_book(book)?;
    let mut tx = pool.begin().await?;
    let result = sqlx::query("UPDATE books SET title = ?, published_date = ? WHERE id = ?")
        .bind(book.title.trim())
        .bind(book.published_date)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ModelError::NotFound("book"));
    }
    for kind in [EntityKind::Author, EntityKind::Category] {
        let sql = format!("DELETE FROM {} WHERE book_id = ?", kind.link_table());
        sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
    }
    link_entities(&mut tx, id, EntityKind::Category, &book.categories).await?;
    link_entities(&mut tx, id, EntityKind::Author, &book.authors).await?;
    tx.commit().await?;
    get_book(pool, id).await?.ok_or(ModelError::NotFound("book"))
}

pub async fn delete_book(pool: &SqlitePool, id: i64) -> Result<(), ModelError> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ModelError::NotFound("book"));
    }
    log::info!("deleted book {}", id);
    Ok(())
}

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{error::ErrorKind, SqliteConnection, SqlitePool};

use super::{validate_text, ModelError};

/// Authors and categories share one shape: an id and a unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entity {
    pub id: i64,
    pub name: String,
}

pub type Author = Entity;
pub type Category = Entity;

/// Body of forms and API requests that carry just a name.
#[derive(Debug, Clone, Deserialize)]
pub struct NameInput {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Author,
    Category,
}

impl EntityKind {
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Author => "authors",
            EntityKind::Category => "categories",
        }
    }

    /// Join table linking books to this kind.
    pub fn link_table(&self) -> &'static str {
        match self {
            EntityKind::Author => "book_authors",
            EntityKind::Category => "book_categories",
        }
    }

    pub fn link_column(&self) -> &'static str {
        match self {
            EntityKind::Author => "author_id",
            EntityKind::Category => "category_id",
        }
    }

    /// Lower-case singular, also the route name of the detail view.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Author => "author",
            EntityKind::Category => "category",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Author => "Authors",
            EntityKind::Category => "Categories",
        }
    }

    pub fn max_name_len(&self) -> usize {
        match self {
            EntityKind::Author => 50,
            EntityKind::Category => 20,
        }
    }

    pub fn list_route(&self) -> &'static str {
        match self {
            EntityKind::Author => "author-list",
            EntityKind::Category => "category-list",
        }
    }

    pub fn register_route(&self) -> &'static str {
        match self {
            EntityKind::Author => "author-register",
            EntityKind::Category => "category-register",
        }
    }

    pub fn validate_name(&self, name: &str) -> Result<String, ModelError> {
        let field = match self {
            EntityKind::Author => "Author name",
            EntityKind::Category => "Category name",
        };
        validate_text(field, name, self.max_name_len())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Author => write!(f, "Author"),
            EntityKind::Category => write!(f, "Category"),
        }
    }
}

fn map_unique_violation(kind: EntityKind, err: sqlx::Error) -> ModelError {
    match err {
        sqlx::Error::Database(e) if matches!(e.kind(), ErrorKind::UniqueViolation) => {
            ModelError::Duplicate(kind.label())
        }
        e => ModelError::Database(e),
    }
}

pub async fn list_entities(pool: &SqlitePool, kind: EntityKind) -> Result<Vec<Entity>, ModelError> {
    let sql = format!("SELECT id, name FROM {} ORDER BY id ASC", kind.table());
    let entities = sqlx::query_as::<_, Entity>(&sql).fetch_all(pool).await?;
    Ok(entities)
}

pub async fn get_entity(
    pool: &SqlitePool,
    kind: EntityKind,
    id: i64,
) -> Result<Option<Entity>, ModelError> {
    let sql = format!("SELECT id, name FROM {} WHERE id = ?", kind.table());
    let entity = sqlx::query_as::<_, Entity>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(entity)
}

pub async fn create_entity(
    pool: &SqlitePool,
    kind: EntityKind,
    name: &str,
) -> Result<Entity, ModelError> {
    let name = kind.validate_name(name)?;
    let sql = format!("INSERT INTO {} (name) VALUES (?)", kind.table());
    let id = sqlx::query(&sql)
        .bind(&name)
        .execute(pool)
        .await
        .map_err(|e| map_unique_violation(kind, e))?
        .last_insert_rowid();
    log::info!("created {} {} ({})", kind.label(), id, name);
    Ok(Entity { id, name })
}

pub async fn rename_entity(
    pool: &SqlitePool,
    kind: EntityKind,
    id: i64,
    name: &str,
) -> Result<Entity, ModelError> {
    let name = kind.validate_name(name)?;
    let sql = format!("UPDATE {} SET name = ? WHERE id = ?", kind.table());
    let result = sqlx::query(&sql)
        .bind(&name)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| map_unique_violation(kind, e))?;
    if result.rows_affected() == 0 {
        return Err(ModelError::NotFound(kind.label()));
    }
    Ok(Entity { id, name })
}

/// Removes the entity and its book links. Books themselves stay.
pub async fn delete_entity(pool: &SqlitePool, kind: EntityKind, id: i64) -> Result<(), ModelError> {
    let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(ModelError::NotFound(kind.label()));
    }
    log::info!("deleted {} {}", kind.label(), id);
    Ok(())
}

/// Looks an entity up by exact name, inserting it when missing.
pub async fn find_or_create(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    name: &str,
) -> Result<i64, ModelError> {
    let name = kind.validate_name(name)?;
    let select = format!("SELECT id FROM {} WHERE name = ?", kind.table());
    if let Some(id) = sqlx::query_scalar::<_, i64>(&select)
        .bind(&name)
        .fetch_optional(&mut *conn)
        .await?
    {
        return Ok(id);
    }
    let insert = format!("INSERT INTO {} (name) VALUES (?)", kind.table());
    let id = sqlx::query(&insert)
        .bind(&name)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    Ok(id)
}

use std::{
    collections::{BTreeSet, HashSet},
    fmt,
};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use sqlx::SqlitePool;

use crate::models::{
    book::{insert_book, is_duplicate_book, validate_book, NewBook},
    ModelError,
};

/// Why an upload was refused. Each kind is reported once per upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportProblem {
    WrongFileFormat,
    MissingField,
    WrongDateFormat,
    Invalid(String),
    Duplicate(Vec<String>),
}

impl fmt::Display for ImportProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportProblem::WrongFileFormat => write!(f, "Wrong File Format"),
            ImportProblem::MissingField => {
                write!(f, "Required field are not entered. Please fill required field")
            }
            ImportProblem::WrongDateFormat => write!(f, "Wrong date format. It must be in YYYY-MM-DD"),
            ImportProblem::Invalid(message) => write!(f, "{}", message),
            ImportProblem::Duplicate(titles) => {
                let quoted: Vec<String> = titles.iter().map(|t| format!("'{}'", t)).collect();
                write!(f, "[{}] have duplicate title and author", quoted.join(", "))
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported(usize),
    Rejected(Vec<ImportProblem>),
}

/// Strict `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn split_names(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

struct Columns {
    title: usize,
    published_date: usize,
    author: usize,
    category: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Option<Columns> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };
        Some(Columns {
            title: find("Title")?,
            published_date: find("Published Date")?,
            author: find("Author")?,
            category: find("Category")?,
        })
    }
}

fn rejected(problem: ImportProblem) -> ImportOutcome {
    ImportOutcome::Rejected(vec![problem])
}

/// Validates every row of an uploaded CSV and inserts all of them in one
/// transaction, or none when any row has a problem.
pub async fn import_books(
    pool: &SqlitePool,
    file_name: &str,
    data: &[u8],
) -> Result<ImportOutcome, ModelError> {
    if !file_name.to_lowercase().ends_with(".csv") {
        return Ok(rejected(ImportProblem::WrongFileFormat));
    }
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(data);
    let columns = match reader.headers() {
        Ok(headers) => match Columns::locate(headers) {
            Some(columns) => columns,
            None => return Ok(rejected(ImportProblem::WrongFileFormat)),
        },
        Err(_) => return Ok(rejected(ImportProblem::WrongFileFormat)),
    };

    let mut missing_field = false;
    let mut wrong_date = false;
    let mut invalid: Vec<String> = Vec::new();
    let mut duplicates: Vec<String> = Vec::new();
    let mut seen: HashSet<(String, BTreeSet<String>)> = HashSet::new();
    let mut books: Vec<NewBook> = Vec::new();

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(_) => return Ok(rejected(ImportProblem::WrongFileFormat)),
        };
        let cell = |index: usize| record.get(index).unwrap_or_default().trim();
        let title = cell(columns.title).to_string();
        let published_date = cell(columns.published_date);
        let authors = split_names(cell(columns.author));
        let categories = split_names(cell(columns.category));

        if title.is_empty() || published_date.is_empty() || authors.is_empty() || categories.is_empty() {
            missing_field = true;
            continue;
        }
        let Some(published_date) = parse_date(published_date) else {
            wrong_date = true;
            continue;
        };
        let book = NewBook {
            title,
            published_date,
            authors,
            categories,
        };
        if let Err(e) = validate_book(&book) {
            let message = e.to_string();
            if !invalid.contains(&message) {
                invalid.push(message);
            }
            continue;
        }

        let key = (book.title.clone(), book.authors.iter().cloned().collect());
        let repeated = !seen.insert(key);
        if repeated || is_duplicate_book(pool, &book.title, &book.authors).await? {
            if !duplicates.contains(&book.title) {
                duplicates.push(book.title.clone());
            }
            continue;
        }
        books.push(book);
    }

    let mut problems = Vec::new();
    if missing_field || (books.is_empty() && duplicates.is_empty() && !wrong_date && invalid.is_empty()) {
        problems.push(ImportProblem::MissingField);
    }
    if wrong_date {
        problems.push(ImportProblem::WrongDateFormat);
    }
    problems.extend(invalid.into_iter().map(ImportProblem::Invalid));
    if !duplicates.is_empty() {
        problems.push(ImportProblem::Duplicate(duplicates));
    }
    if !problems.is_empty() {
        log::warn!("rejected upload {}: {:?}", file_name, problems);
        return Ok(ImportOutcome::Rejected(problems));
    }

    let mut tx = pool.begin().await?;
    for book in &books {
        insert_book(&mut tx, book).await?;
    }
    tx.commit().await?;
    Ok(ImportOutcome::Imported(books.len()))
}

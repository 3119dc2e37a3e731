use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use sqlx::SqlitePool;

use crate::{
    models::{
        book::{create_book, is_duplicate_book, list_books, Book, BookFilter, NewBook},
        entity::{list_entities, Author, Category, EntityKind},
        ModelError,
    },
    services::csv_import::{import_books, parse_date, ImportOutcome, ImportProblem},
    views::{outcome_message, Message, SUBMISSION_SUCCESSFUL},
    AppError,
};

/// Request body cap for the register form, CSV upload included.
pub const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Template)]
#[template(path = "book-register.html")]
pub struct BookRegister {
    books: Vec<Book>,
    authors: Vec<Author>,
    categories: Vec<Category>,
    messages: Vec<Message>,
}

async fn render(pool: &SqlitePool, messages: Vec<Message>) -> Result<BookRegister, AppError> {
    Ok(BookRegister {
        books: list_books(pool, BookFilter::default()).await?,
        authors: list_entities(pool, EntityKind::Author).await?,
        categories: list_entities(pool, EntityKind::Category).await?,
        messages,
    })
}

#[axum::debug_handler]
pub async fn view_book_register(
    Extension(pool): Extension<SqlitePool>,
) -> Result<BookRegister, AppError> {
    render(&pool, Vec::new()).await
}

/// Either a single book from the form fields or a CSV upload in the `csv` field.
#[derive(Debug, Default)]
struct BookSubmission {
    title: String,
    published_date: String,
    authors: Vec<String>,
    categories: Vec<String>,
    csv: Option<(String, Vec<u8>)>,
}

async fn read_submission(mut multipart: Multipart) -> Result<BookSubmission, MultipartError> {
    let mut submission = BookSubmission::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "csv" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                if !file_name.is_empty() {
                    submission.csv = Some((file_name, data.to_vec()));
                }
            }
            "title" => submission.title = field.text().await?,
            "published_date" => submission.published_date = field.text().await?,
            "author" => submission.authors.push(field.text().await?),
            "category" => submission.categories.push(field.text().await?),
            _ => {}
        }
    }
    Ok(submission)
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

async fn register_single(pool: &SqlitePool, submission: BookSubmission) -> Result<Message, AppError> {
    let authors = non_blank(submission.authors);
    let categories = non_blank(submission.categories);
    let title = submission.title.trim().to_string();
    let published_date = submission.published_date.trim();
    if title.is_empty() || published_date.is_empty() || authors.is_empty() || categories.is_empty() {
        return Ok(Message::error(ImportProblem::MissingField.to_string()));
    }
    let Some(published_date) = parse_date(published_date) else {
        return Ok(Message::error(ImportProblem::WrongDateFormat.to_string()));
    };
    if is_duplicate_book(pool, &title, &authors).await? {
        return Ok(Message::error(ModelError::Duplicate("book").to_string()));
    }
    let book = NewBook {
        title,
        published_date,
        authors,
        categories,
    };
    Ok(outcome_message(create_book(pool, &book).await, SUBMISSION_SUCCESSFUL)?)
}

#[axum::debug_handler]
pub async fn post_book_register(
    Extension(pool): Extension<SqlitePool>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut submission = match read_submission(multipart).await {
        Ok(submission) => submission,
        Err(e) => {
            let status = e.status();
            log::warn!("unreadable book submission: {}", e);
            let text = if status == StatusCode::PAYLOAD_TOO_LARGE {
                "Uploaded file is too large".to_string()
            } else {
                e.body_text()
            };
            let page = render(&pool, vec![Message::error(text)]).await?;
            return Ok((status, page).into_response());
        }
    };
    let messages = match submission.csv.take() {
        Some((file_name, data)) => match import_books(&pool, &file_name, &data).await? {
            ImportOutcome::Imported(count) => {
                log::info!("imported {} books from {}", count, file_name);
                vec![Message::success(SUBMISSION_SUCCESSFUL)]
            }
            ImportOutcome::Rejected(problems) => problems
                .iter()
                .map(|problem| Message::error(problem.to_string()))
                .collect(),
        },
        None => vec![register_single(&pool, submission).await?],
    };
    Ok(render(&pool, messages).await?.into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::{
        app,
        config::AppConfig,
        db::test_pool,
        models::book::{list_books, BookFilter},
    };

    use super::UPLOAD_LIMIT;

    const BOUNDARY: &str = "library-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a str),
    }

    fn multipart_body(parts: &[Part]) -> String {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match part {
                Part::Text(name, value) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        name, value
                    ));
                }
                Part::File(name, file_name, content) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n{}\r\n",
                        name, file_name, content
                    ));
                }
            }
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    async fn send(pool: sqlx::SqlitePool, parts: &[Part<'_>]) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri("/book-register")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        let response = app(pool, &AppConfig::default()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn post(pool: sqlx::SqlitePool, parts: &[Part<'_>]) -> String {
        let (status, page) = send(pool, parts).await;
        assert_eq!(status, StatusCode::OK);
        page
    }

    #[tokio::test]
    async fn registers_single_book() {
        let pool = test_pool().await;
        let page = post(
            pool.clone(),
            &[
                Part::Text("title", "星の王子様"),
                Part::Text("published_date", "2006-03-28"),
                Part::Text("author", "サン・テグジュペリ"),
                Part::Text("author", "池澤夏樹"),
                Part::Text("category", "Novel"),
            ],
        )
        .await;
        assert!(page.contains("Form submission successful"));
        let books = list_books(&pool, BookFilter::default()).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].authors.len(), 2);

        let again = post(
            pool.clone(),
            &[
                Part::Text("title", "星の王子様"),
                Part::Text("published_date", "2006-03-28"),
                Part::Text("author", "池澤夏樹"),
                Part::Text("author", "サン・テグジュペリ"),
                Part::Text("category", "Novel"),
            ],
        )
        .await;
        assert!(again.contains("Sorry, same book already exists"));
        assert_eq!(list_books(&pool, BookFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn single_book_field_errors() {
        let pool = test_pool().await;
        let missing = post(
            pool.clone(),
            &[
                Part::Text("title", "Title1"),
                Part::Text("published_date", "2006-03-28"),
                Part::Text("category", "Novel"),
            ],
        )
        .await;
        assert!(missing.contains("Required field are not entered. Please fill required field"));

        let bad_date = post(
            pool.clone(),
            &[
                Part::Text("title", "Title1"),
                Part::Text("published_date", "2006/03/28"),
                Part::Text("author", "Author1"),
                Part::Text("category", "Novel"),
            ],
        )
        .await;
        assert!(bad_date.contains("Wrong date format. It must be in YYYY-MM-DD"));
        assert!(list_books(&pool, BookFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn imports_uploaded_csv() {
        let pool = test_pool().await;
        let csv = "Title,Published Date,Author,Category\r\nTitle1,2020-01-01,Author1,Novel\r\nTitle2,2020-01-02,\"Author1, Author2\",Design\r\n";
        let page = post(pool.clone(), &[Part::File("csv", "books.csv", csv)]).await;
        assert!(page.contains("Form submission successful"));
        assert!(page.contains("Title2"));
        assert_eq!(list_books(&pool, BookFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_non_csv_upload() {
        let pool = test_pool().await;
        let page = post(pool.clone(), &[Part::File("csv", "books.txt", "hello")]).await;
        assert!(page.contains("Wrong File Format"));
        assert!(list_books(&pool, BookFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn accepts_csv_larger_than_two_megabytes() {
        let pool = test_pool().await;
        let mut csv = String::from("Title,Published Date,Author,Category\r\n");
        let mut i = 0;
        while csv.len() < 3 * 1024 * 1024 {
            csv.push_str(&format!("Title{},2020/01/01,Author1,Novel\r\n", i));
            i += 1;
        }
        let page = post(pool.clone(), &[Part::File("csv", "books.csv", &csv)]).await;
        assert!(page.contains("Wrong date format. It must be in YYYY-MM-DD"));
        assert!(list_books(&pool, BookFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_upload_renders_the_form_with_413() {
        let pool = test_pool().await;
        let csv = "x".repeat(UPLOAD_LIMIT + 1);
        let (status, page) = send(pool.clone(), &[Part::File("csv", "books.csv", &csv)]).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(page.contains("Uploaded file is too large"));
        assert!(page.contains("<form"));
        assert!(list_books(&pool, BookFilter::default()).await.unwrap().is_empty());
    }
}

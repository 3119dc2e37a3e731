use anyhow::Result;
use csv::{Terminator, WriterBuilder};

use crate::models::book::Book;

pub const EXPORT_HEADER: [&str; 5] = ["No.", "Title", "Published Date", "Author", "Category"];

/// One row per book, numbered from 1. Several authors or categories share a
/// cell, separated by `, `.
pub fn write_books_csv(books: &[Book]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for (index, book) in books.iter().enumerate() {
        writer.write_record([
            (index + 1).to_string(),
            book.title.clone(),
            book.published_date.format("%Y-%m-%d").to_string(),
            book.author_names(),
            book.category_names(),
        ])?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::entity::Entity;

    fn entity(id: i64, name: &str) -> Entity {
        Entity {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn writes_header_and_numbered_rows() {
        let books = vec![
            Book {
                id: 10,
                title: "星の王子様".to_string(),
                published_date: NaiveDate::from_ymd_opt(2006, 3, 28).unwrap(),
                categories: vec![entity(1, "Novel")],
                authors: vec![entity(1, "サン・テグジュペリ"), entity(2, "池澤夏樹")],
            },
            Book {
                id: 11,
                title: "人間の大地".to_string(),
                published_date: NaiveDate::from_ymd_opt(2015, 8, 20).unwrap(),
                categories: vec![entity(1, "Novel")],
                authors: vec![entity(1, "サン・テグジュペリ")],
            },
        ];
        let csv = String::from_utf8(write_books_csv(&books).unwrap()).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, EXPORT_HEADER);
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["1", "星の王子様", "2006-03-28", "サン・テグジュペリ, 池澤夏樹", "Novel"],
                vec!["2", "人間の大地", "2015-08-20", "サン・テグジュペリ", "Novel"],
            ]
        );
    }

    #[test]
    fn empty_shelf_is_just_the_header() {
        let csv = write_books_csv(&[]).unwrap();
        assert_eq!(csv, b"No.,Title,Published Date,Author,Category\r\n");
    }
}

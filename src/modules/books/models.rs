use serde::Deserialize;
use shelf_db::{map_record, Record, RecordError};
use thiserror::Error;

/// A row of the `book` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Book {
    /// Primary key; never changes after insert
    pub book_id: String,
    pub book_name: String,
    pub book_isbn: String,
    pub book_author: String,
    pub book_publisher: String,
    pub book_price: f64,
    /// Borrow/view counter
    pub interviews_times: i64,
}

impl Book {
    pub const COLUMNS: [&'static str; 7] = [
        "book_id",
        "book_name",
        "book_isbn",
        "book_author",
        "book_publisher",
        "book_price",
        "interviews_times",
    ];

    /// Display values keyed by column name.
    pub fn to_record(&self) -> Result<Record<String>, RecordError> {
        map_record(
            &Self::COLUMNS,
            vec![
                self.book_id.clone(),
                self.book_name.clone(),
                self.book_isbn.clone(),
                self.book_author.clone(),
                self.book_publisher.clone(),
                format_price(self.book_price),
                self.interviews_times.to_string(),
            ],
        )
    }
}

/// Two decimals, as the `DECIMAL(10, 2)` column holds it.
pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

/// Everything but the id; what an edit may change.
#[derive(Debug, Clone, PartialEq)]
pub struct BookFields {
    pub book_name: String,
    pub book_isbn: String,
    pub book_author: String,
    pub book_publisher: String,
    pub book_price: f64,
    pub interviews_times: i64,
}

/// A form value that does not fit its column type.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value {value:?} for {field}")]
pub struct InvalidField {
    pub field: &'static str,
    pub value: String,
}

/// Add-form submission, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookForm {
    pub book_id: String,
    #[serde(flatten)]
    pub fields: BookFieldsForm,
}

impl BookForm {
    pub fn parse(&self) -> Result<Book, InvalidField> {
        if self.book_id.trim().is_empty() {
            return Err(InvalidField {
                field: "book_id",
                value: self.book_id.clone(),
            });
        }
        let fields = self.fields.parse()?;
        Ok(Book {
            book_id: self.book_id.clone(),
            book_name: fields.book_name,
            book_isbn: fields.book_isbn,
            book_author: fields.book_author,
            book_publisher: fields.book_publisher,
            book_price: fields.book_price,
            interviews_times: fields.interviews_times,
        })
    }
}

/// Edit-form submission; the id comes from the path.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookFieldsForm {
    pub book_name: String,
    pub book_isbn: String,
    pub book_author: String,
    pub book_publisher: String,
    pub book_price: String,
    pub interviews_times: String,
}

impl BookFieldsForm {
    pub fn parse(&self) -> Result<BookFields, InvalidField> {
        let book_price = self
            .book_price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| InvalidField {
                field: "book_price",
                value: self.book_price.clone(),
            })?;
        let interviews_times = self
            .interviews_times
            .trim()
            .parse::<i64>()
            .map_err(|_| InvalidField {
                field: "interviews_times",
                value: self.interviews_times.clone(),
            })?;

        Ok(BookFields {
            book_name: self.book_name.clone(),
            book_isbn: self.book_isbn.clone(),
            book_author: self.book_author.clone(),
            book_publisher: self.book_publisher.clone(),
            book_price,
            interviews_times,
        })
    }
}

impl From<&Book> for BookFieldsForm {
    fn from(book: &Book) -> Self {
        Self {
            book_name: book.book_name.clone(),
            book_isbn: book.book_isbn.clone(),
            book_author: book.book_author.clone(),
            book_publisher: book.book_publisher.clone(),
            book_price: format_price(book.book_price),
            interviews_times: book.interviews_times.to_string(),
        }
    }
}

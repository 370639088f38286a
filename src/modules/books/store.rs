//! One statement per function against the `book` table.

use shelf_db::{DbConnection, DbError};

use super::models::{Book, BookFields};

// The price column is DECIMAL; read it back as double precision so every
// driver decodes it the same way.
const SELECT_ALL: &str = "SELECT book_id, book_name, book_isbn, book_author, book_publisher, \
     CAST(book_price AS DOUBLE PRECISION) AS book_price, interviews_times FROM book";

const SELECT_ONE: &str = "SELECT book_id, book_name, book_isbn, book_author, book_publisher, \
     CAST(book_price AS DOUBLE PRECISION) AS book_price, interviews_times FROM book \
     WHERE book_id = $1";

const INSERT: &str = "INSERT INTO book (book_id, book_name, book_isbn, book_author, \
     book_publisher, book_price, interviews_times) VALUES ($1, $2, $3, $4, $5, $6, $7)";

const UPDATE: &str = "UPDATE book SET book_name = $1, book_isbn = $2, book_author = $3, \
     book_publisher = $4, book_price = $5, interviews_times = $6 WHERE book_id = $7";

const DELETE: &str = "DELETE FROM book WHERE book_id = $1";

/// Every book, in whatever order the database returns them.
pub async fn list_books(conn: &mut DbConnection) -> Result<Vec<Book>, DbError> {
    let books = sqlx::query_as::<_, Book>(SELECT_ALL)
        .fetch_all(&mut **conn)
        .await?;
    Ok(books)
}

pub async fn find_book(conn: &mut DbConnection, book_id: &str) -> Result<Option<Book>, DbError> {
    let book = sqlx::query_as::<_, Book>(SELECT_ONE)
        .bind(book_id)
        .fetch_optional(&mut **conn)
        .await?;
    Ok(book)
}

pub async fn insert_book(conn: &mut DbConnection, book: &Book) -> Result<(), DbError> {
    sqlx::query(INSERT)
        .bind(book.book_id.as_str())
        .bind(book.book_name.as_str())
        .bind(book.book_isbn.as_str())
        .bind(book.book_author.as_str())
        .bind(book.book_publisher.as_str())
        .bind(book.book_price)
        .bind(book.interviews_times)
        .execute(&mut **conn)
        .await?;
    Ok(())
}

/// Returns the number of rows changed: 0 when no book has `book_id`.
pub async fn update_book(
    conn: &mut DbConnection,
    book_id: &str,
    fields: &BookFields,
) -> Result<u64, DbError> {
    let result = sqlx::query(UPDATE)
        .bind(fields.book_name.as_str())
        .bind(fields.book_isbn.as_str())
        .bind(fields.book_author.as_str())
        .bind(fields.book_publisher.as_str())
        .bind(fields.book_price)
        .bind(fields.interviews_times)
        .bind(book_id)
        .execute(&mut **conn)
        .await?;
    Ok(result.rows_affected())
}

/// Returns the number of rows removed: 0 when no book has `book_id`.
pub async fn delete_book(conn: &mut DbConnection, book_id: &str) -> Result<u64, DbError> {
    let result = sqlx::query(DELETE)
        .bind(book_id)
        .execute(&mut **conn)
        .await?;
    Ok(result.rows_affected())
}

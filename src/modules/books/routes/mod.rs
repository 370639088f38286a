//! Request handlers: each opens its own connection, runs one statement,
//! and answers with a page or a redirect carrying a status message.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::Response,
    routing::{get, post},
    Form, Router,
};
use shelf_db::{ConnectionProvider, DbError};
use shelf_http::error::AppError;

use super::flash::{Flash, Status};
use super::models::{Book, BookFieldsForm, BookForm};
use super::{store, views};
use crate::utils;

const CONNECT_FAILED: &str = "Could not connect to the database; check the configuration.";
const LIST_FAILED: &str = "Could not load books";
const ADDED: &str = "Book added.";
const DUPLICATE: &str = "Could not add book: the book id already exists or a constraint was violated.";
const ADD_FAILED: &str = "Could not add book";
const UPDATED: &str = "Book updated.";
const UPDATE_FAILED: &str = "Could not update book";
const LOAD_FAILED: &str = "Could not load book";
const DELETED: &str = "Book deleted.";
const DELETE_FAILED: &str = "Could not delete book";
const NOT_FOUND: &str = "Book not found.";

#[derive(Clone)]
pub struct BooksState {
    provider: Arc<ConnectionProvider>,
}

pub fn router(provider: Arc<ConnectionProvider>) -> Router {
    Router::new()
        .route("/", get(list_books))
        .route("/add", get(add_form).post(create_book))
        .route("/edit/{book_id}", get(edit_form).post(update_book))
        .route("/delete/{book_id}", post(delete_book))
        .with_state(BooksState { provider })
}

/// Log `error` under a fresh reference and build the message users see.
fn failure(summary: &str, action: &'static str, book_id: Option<&str>, error: &DbError) -> Status {
    let error_ref = utils::error_ref();
    tracing::error!(%error_ref, action, book_id, %error, "book statement failed");
    Status::danger(format!("{summary} (ref {error_ref})."))
}

fn form_error(rejection: FormRejection) -> AppError {
    AppError::bad_request(rejection.body_text())
}

async fn list_books(State(state): State<BooksState>, flash: Flash) -> Response {
    let mut messages = flash.messages().to_vec();

    let Some(mut conn) = state.provider.open().await else {
        messages.push(Status::danger(CONNECT_FAILED));
        return flash.page(views::list_page(&[], &messages));
    };

    let books = store::list_books(&mut conn).await;
    conn.close().await;

    let records = match books {
        Ok(books) => books.iter().map(Book::to_record).collect::<Result<Vec<_>, _>>(),
        Err(error) => {
            messages.push(failure(LIST_FAILED, "list", None, &error));
            return flash.page(views::list_page(&[], &messages));
        }
    };

    match records {
        Ok(records) => {
            tracing::debug!(count = records.len(), "listed books");
            flash.page(views::list_page(&records, &messages))
        }
        Err(error) => {
            tracing::error!(%error, "book row mapping failed");
            messages.push(Status::danger(LIST_FAILED));
            flash.page(views::list_page(&[], &messages))
        }
    }
}

async fn add_form(flash: Flash) -> Response {
    let messages = flash.messages().to_vec();
    flash.page(views::add_page(&BookForm::default(), &messages))
}

async fn create_book(
    State(state): State<BooksState>,
    flash: Flash,
    form: Result<Form<BookForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form.map_err(form_error)?;
    let mut messages = flash.messages().to_vec();

    let Some(mut conn) = state.provider.open().await else {
        return Ok(flash.redirect("/", Status::danger(CONNECT_FAILED)));
    };

    let book = match form.parse() {
        Ok(book) => book,
        Err(invalid) => {
            messages.push(Status::danger(format!("{ADD_FAILED}: {invalid}.")));
            return Ok(flash.page(views::add_page(&form, &messages)));
        }
    };

    let inserted = store::insert_book(&mut conn, &book).await;
    conn.close().await;

    match inserted {
        Ok(()) => {
            tracing::info!(book_id = %book.book_id, "book added");
            Ok(flash.redirect("/", Status::success(ADDED)))
        }
        Err(error) if error.is_constraint() => {
            tracing::warn!(book_id = %book.book_id, %error, "book insert rejected");
            messages.push(Status::danger(DUPLICATE));
            Ok(flash.page(views::add_page(&form, &messages)))
        }
        Err(error) => {
            messages.push(failure(ADD_FAILED, "insert", Some(&book.book_id), &error));
            Ok(flash.page(views::add_page(&form, &messages)))
        }
    }
}

async fn edit_form(
    State(state): State<BooksState>,
    Path(book_id): Path<String>,
    flash: Flash,
) -> Response {
    let Some(mut conn) = state.provider.open().await else {
        return flash.redirect("/", Status::danger(CONNECT_FAILED));
    };

    let found = store::find_book(&mut conn, &book_id).await;
    conn.close().await;

    match found {
        Ok(Some(book)) => {
            let messages = flash.messages().to_vec();
            flash.page(views::edit_page(
                &book.book_id,
                &BookFieldsForm::from(&book),
                &messages,
            ))
        }
        Ok(None) => {
            tracing::info!(%book_id, "edit requested for missing book");
            flash.redirect("/", Status::warning(NOT_FOUND))
        }
        Err(error) => {
            let status = failure(LOAD_FAILED, "find", Some(&book_id), &error);
            flash.redirect("/", status)
        }
    }
}

async fn update_book(
    State(state): State<BooksState>,
    Path(book_id): Path<String>,
    flash: Flash,
    form: Result<Form<BookFieldsForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form.map_err(form_error)?;
    let mut messages = flash.messages().to_vec();

    let Some(mut conn) = state.provider.open().await else {
        return Ok(flash.redirect("/", Status::danger(CONNECT_FAILED)));
    };

    let fields = match form.parse() {
        Ok(fields) => fields,
        Err(invalid) => {
            messages.push(Status::danger(format!("{UPDATE_FAILED}: {invalid}.")));
            return Ok(flash.page(views::edit_page(&book_id, &form, &messages)));
        }
    };

    let updated = store::update_book(&mut conn, &book_id, &fields).await;
    conn.close().await;

    match updated {
        Ok(0) => {
            tracing::info!(%book_id, "update matched no book");
            Ok(flash.redirect("/", Status::warning(NOT_FOUND)))
        }
        Ok(_) => {
            tracing::info!(%book_id, "book updated");
            Ok(flash.redirect("/", Status::success(UPDATED)))
        }
        Err(error) => {
            messages.push(failure(UPDATE_FAILED, "update", Some(&book_id), &error));
            Ok(flash.page(views::edit_page(&book_id, &form, &messages)))
        }
    }
}

async fn delete_book(
    State(state): State<BooksState>,
    Path(book_id): Path<String>,
    flash: Flash,
) -> Response {
    let Some(mut conn) = state.provider.open().await else {
        return flash.redirect("/", Status::danger(CONNECT_FAILED));
    };

    let deleted = store::delete_book(&mut conn, &book_id).await;
    conn.close().await;

    let status = match deleted {
        Ok(0) => {
            tracing::info!(%book_id, "delete matched no book");
            Status::warning(NOT_FOUND)
        }
        Ok(_) => {
            tracing::info!(%book_id, "book deleted");
            Status::success(DELETED)
        }
        Err(error) => failure(DELETE_FAILED, "delete", Some(&book_id), &error),
    };

    flash.redirect("/", status)
}

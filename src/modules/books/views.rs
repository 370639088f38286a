use shelf_db::Record;
use shelf_http::html::{escape, path_segment};

use super::flash::Status;
use super::models::{BookFieldsForm, BookForm};

const STYLE: &str = "body{font-family:sans-serif;margin:2rem}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.3rem .6rem}\
.alert{padding:.5rem 1rem;margin:.5rem 0;border-radius:4px}\
.alert-success{background:#d1e7dd}.alert-warning{background:#fff3cd}\
.alert-danger{background:#f8d7da}label{display:block;margin:.4rem 0}";

fn layout(title: &str, messages: &[Status], content: &str) -> String {
    let alerts: String = messages
        .iter()
        .map(|status| {
            format!(
                "<div class=\"alert alert-{}\" role=\"alert\">{}</div>\n",
                status.level.as_str(),
                escape(&status.message)
            )
        })
        .collect();

    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n{alerts}{content}</body>\n</html>\n",
        title = escape(title),
    )
}

/// Book table with edit and delete actions per row.
pub fn list_page(records: &[Record<String>], messages: &[Status]) -> String {
    let mut content = String::from("<p><a href=\"/add\">Add a book</a></p>\n");

    if records.is_empty() {
        content.push_str("<p class=\"empty\">No books.</p>\n");
        return layout("Books", messages, &content);
    }

    content.push_str("<table>\n<thead><tr>");
    for column in records[0].columns() {
        content.push_str(&format!("<th>{}</th>", escape(column)));
    }
    content.push_str("<th></th></tr></thead>\n<tbody>\n");

    for record in records {
        let book_id = record.get("book_id").map(String::as_str).unwrap_or_default();
        content.push_str(&format!("<tr data-book-id=\"{}\">", escape(book_id)));
        for value in record.values() {
            content.push_str(&format!("<td>{}</td>", escape(value)));
        }
        let segment = path_segment(book_id);
        content.push_str(&format!(
            "<td><a href=\"/edit/{segment}\">Edit</a> \
             <form method=\"post\" action=\"/delete/{segment}\" style=\"display:inline\">\
             <button type=\"submit\">Delete</button></form></td></tr>\n"
        ));
    }
    content.push_str("</tbody>\n</table>\n");

    layout("Books", messages, &content)
}

fn input(name: &str, label: &str, value: &str) -> String {
    format!(
        "<label>{label} <input type=\"text\" name=\"{name}\" value=\"{value}\" required></label>\n",
        value = escape(value),
    )
}

fn field_inputs(fields: &BookFieldsForm) -> String {
    [
        input("book_name", "Title", &fields.book_name),
        input("book_isbn", "ISBN", &fields.book_isbn),
        input("book_author", "Author", &fields.book_author),
        input("book_publisher", "Publisher", &fields.book_publisher),
        input("book_price", "Price", &fields.book_price),
        input("interviews_times", "Times borrowed", &fields.interviews_times),
    ]
    .concat()
}

/// Add form; `form` holds a rejected submission, or defaults.
pub fn add_page(form: &BookForm, messages: &[Status]) -> String {
    let content = format!(
        "<form method=\"post\" action=\"/add\">\n{}{}\
         <button type=\"submit\">Add</button> <a href=\"/\">Cancel</a>\n</form>\n",
        input("book_id", "Book id", &form.book_id),
        field_inputs(&form.fields),
    );
    layout("Add a book", messages, &content)
}

/// Edit form; the id is shown but not submitted.
pub fn edit_page(book_id: &str, fields: &BookFieldsForm, messages: &[Status]) -> String {
    let content = format!(
        "<p>Book id: <strong class=\"book-id\">{id}</strong></p>\n\
         <form method=\"post\" action=\"/edit/{segment}\">\n{inputs}\
         <button type=\"submit\">Save</button> <a href=\"/\">Cancel</a>\n</form>\n",
        id = escape(book_id),
        segment = path_segment(book_id),
        inputs = field_inputs(fields),
    );
    layout("Edit book", messages, &content)
}

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, Response, StatusCode,
    },
    Router,
};
use shelf_app::books::flash::{decode_cookie, Level, Status, FLASH_COOKIE};
use shelf_kernel::settings::{DatabaseSettings, Settings};
use sqlx::{AnyConnection, Connection};
use tempfile::TempDir;
use tower::ServiceExt;

const BOOK_TABLE: &str = "CREATE TABLE book (
    book_id TEXT PRIMARY KEY NOT NULL,
    book_name TEXT NOT NULL,
    book_isbn TEXT NOT NULL,
    book_author TEXT NOT NULL,
    book_publisher TEXT NOT NULL,
    book_price DECIMAL(10, 2) NOT NULL,
    interviews_times INTEGER NOT NULL
)";

const GO_IN_ACTION: &str = "book_id=B001&book_name=Go+in+Action&book_isbn=123\
    &book_author=W.+Kennedy&book_publisher=Manning&book_price=39.99&interviews_times=0";

struct Harness {
    app: Router,
    _dir: TempDir,
}

fn settings_for(path: &std::path::Path) -> Settings {
    Settings {
        database: DatabaseSettings {
            database: path.display().to_string(),
            ..DatabaseSettings::default()
        },
        ..Settings::default()
    }
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.db");

    sqlx::any::install_default_drivers();
    let mut conn = AnyConnection::connect(&format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .unwrap();
    sqlx::query(BOOK_TABLE).execute(&mut conn).await.unwrap();
    conn.close().await.unwrap();

    let settings = settings_for(&path);
    let registry = shelf_app::build_registry(&settings);
    Harness {
        app: shelf_http::build_router(&registry, &settings),
        _dir: dir,
    }
}

impl Harness {
    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post(&self, uri: &str, form: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Follow a redirect the way a browser would: send the cookie to its target.
    async fn follow(&self, response: Response<Body>) -> (Vec<Status>, String) {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[LOCATION].to_str().unwrap().to_string();
        let cookie = flash_cookie(&response);

        let page = self
            .send(
                Request::builder()
                    .uri(location)
                    .header(COOKIE, format!("{FLASH_COOKIE}={cookie}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(page.status(), StatusCode::OK);

        (decode_cookie(&cookie).unwrap(), body_text(page).await)
    }

    async fn list(&self) -> String {
        let response = self.get("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        body_text(response).await
    }
}

fn flash_cookie(response: &Response<Body>) -> String {
    let header = response.headers()[SET_COOKIE].to_str().unwrap();
    header
        .strip_prefix(&format!("{FLASH_COOKIE}="))
        .and_then(|rest| rest.split(';').next())
        .unwrap()
        .to_string()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn app_for(path: &std::path::Path) -> Router {
    let settings = settings_for(path);
    let registry = shelf_app::build_registry(&settings);
    shelf_http::build_router(&registry, &settings)
}

async fn send_to(app: &Router, method: &str, uri: &str, form: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Statuses a redirect hands to its target; the target must be the list.
fn redirected_statuses(response: &Response<Body>) -> Vec<Status> {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/");
    decode_cookie(&flash_cookie(response)).unwrap()
}

const UPDATE_B001: &str = "book_name=Go+in+Action&book_isbn=123&book_author=W.+Kennedy\
    &book_publisher=Manning&book_price=39.99&interviews_times=5";

fn row_count(page: &str, book_id: &str) -> usize {
    page.matches(&format!("data-book-id=\"{book_id}\"")).count()
}

fn levels(messages: &[Status]) -> Vec<Level> {
    messages.iter().map(|status| status.level).collect()
}

#[tokio::test]
async fn empty_inventory_lists_no_books() {
    let harness = harness().await;

    let page = harness.list().await;
    assert!(page.contains("No books."));
    assert!(!page.contains("alert-"));
}

#[tokio::test]
async fn create_then_list_shows_exactly_one_record() {
    let harness = harness().await;

    let (messages, page) = harness.follow(harness.post("/add", GO_IN_ACTION).await).await;

    assert_eq!(levels(&messages), vec![Level::Success]);
    assert!(page.contains("alert-success"));
    assert_eq!(row_count(&page, "B001"), 1);
    assert!(page.contains("<td>Go in Action</td>"));
    assert!(page.contains("<td>W. Kennedy</td>"));
    assert!(page.contains("<td>39.99</td>"));
}

#[tokio::test]
async fn status_message_is_shown_once() {
    let harness = harness().await;

    let response = harness.post("/add", GO_IN_ACTION).await;
    let cookie = flash_cookie(&response);

    let first = harness
        .send(
            Request::builder()
                .uri("/")
                .header(COOKIE, format!("{FLASH_COOKIE}={cookie}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    let cleared = first.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cleared.contains("Max-Age=0"));

    // The browser drops the cookie, so the next page has no message.
    let page = harness.list().await;
    assert!(!page.contains("alert-success"));
}

#[tokio::test]
async fn duplicate_id_is_rejected_and_table_unchanged() {
    let harness = harness().await;
    harness.post("/add", GO_IN_ACTION).await;

    let duplicate = "book_id=B001&book_name=Other&book_isbn=999&book_author=X\
        &book_publisher=Y&book_price=1&interviews_times=3";
    let response = harness.post("/add", duplicate).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("alert-danger"));
    assert!(page.contains("already exists"));
    // The rejected values are kept in the form.
    assert!(page.contains("name=\"book_name\" value=\"Other\""));

    let list = harness.list().await;
    assert_eq!(row_count(&list, "B001"), 1);
    assert!(list.contains("<td>Go in Action</td>"));
    assert!(!list.contains("<td>Other</td>"));
}

#[tokio::test]
async fn unparsable_price_rerenders_form_without_inserting() {
    let harness = harness().await;

    let form = GO_IN_ACTION.replace("book_price=39.99", "book_price=cheap");
    let response = harness.post("/add", &form).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("alert-danger"));
    assert!(page.contains("book_price"));
    assert_eq!(row_count(&harness.list().await, "B001"), 0);
}

#[tokio::test]
async fn missing_form_field_is_a_bad_request() {
    let harness = harness().await;

    let response = harness.post("/add", "book_id=B001&book_name=Go").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(row_count(&harness.list().await, "B001"), 0);
}

#[tokio::test]
async fn blank_book_id_is_rejected() {
    let harness = harness().await;

    let form = GO_IN_ACTION.replace("book_id=B001", "book_id=");
    let response = harness.post("/add", &form).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("alert-danger"));
    assert!(page.contains("book_id"));
    assert!(page.contains("name=\"book_name\" value=\"Go in Action\""));
    assert!(harness.list().await.contains("No books."));
}

#[tokio::test]
async fn list_and_edit_form_agree_on_price() {
    let harness = harness().await;
    harness
        .post("/add", &GO_IN_ACTION.replace("book_price=39.99", "book_price=12.5"))
        .await;

    assert!(harness.list().await.contains("<td>12.50</td>"));
    let page = body_text(harness.get("/edit/B001").await).await;
    assert!(page.contains("name=\"book_price\" value=\"12.50\""));
}

#[tokio::test]
async fn add_form_renders_empty() {
    let harness = harness().await;

    let response = harness.get("/add").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("name=\"book_id\" value=\"\""));
}

#[tokio::test]
async fn update_then_fetch_reflects_new_values() {
    let harness = harness().await;
    harness.post("/add", GO_IN_ACTION).await;

    let update = "book_name=Go+in+Action+2e&book_isbn=456&book_author=W.+Kennedy\
        &book_publisher=Manning&book_price=44.5&interviews_times=7";
    let (messages, list) = harness
        .follow(harness.post("/edit/B001", update).await)
        .await;
    assert_eq!(levels(&messages), vec![Level::Success]);
    assert_eq!(row_count(&list, "B001"), 1);

    let response = harness.get("/edit/B001").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("<strong class=\"book-id\">B001</strong>"));
    assert!(page.contains("name=\"book_name\" value=\"Go in Action 2e\""));
    assert!(page.contains("name=\"book_isbn\" value=\"456\""));
    assert!(page.contains("name=\"book_price\" value=\"44.50\""));
    assert!(page.contains("name=\"interviews_times\" value=\"7\""));
}

#[tokio::test]
async fn update_of_missing_book_creates_nothing() {
    let harness = harness().await;
    harness.post("/add", GO_IN_ACTION).await;

    let update = "book_name=Ghost&book_isbn=0&book_author=Nobody\
        &book_publisher=None&book_price=1&interviews_times=1";
    let (messages, list) = harness
        .follow(harness.post("/edit/B404", update).await)
        .await;

    assert_eq!(levels(&messages), vec![Level::Warning]);
    assert_eq!(row_count(&list, "B404"), 0);
    assert_eq!(row_count(&list, "B001"), 1);
    assert!(list.contains("<td>Go in Action</td>"));
    assert!(!list.contains("Ghost"));
}

#[tokio::test]
async fn unparsable_count_rerenders_edit_form_without_updating() {
    let harness = harness().await;
    harness.post("/add", GO_IN_ACTION).await;

    let update = UPDATE_B001.replace("interviews_times=5", "interviews_times=many");
    let response = harness.post("/edit/B001", &update).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("alert-danger"));
    assert!(page.contains("<strong class=\"book-id\">B001</strong>"));
    assert!(page.contains("name=\"interviews_times\" value=\"many\""));

    let page = body_text(harness.get("/edit/B001").await).await;
    assert!(page.contains("name=\"interviews_times\" value=\"0\""));
}

#[tokio::test]
async fn edit_form_for_missing_book_redirects_with_warning() {
    let harness = harness().await;

    let (messages, page) = harness.follow(harness.get("/edit/B404").await).await;

    assert_eq!(levels(&messages), vec![Level::Warning]);
    assert!(page.contains("alert-warning"));
    assert!(page.contains("Book not found."));
}

#[tokio::test]
async fn delete_removes_only_that_row() {
    let harness = harness().await;
    harness.post("/add", GO_IN_ACTION).await;
    harness
        .post("/add", &GO_IN_ACTION.replace("B001", "B002"))
        .await;

    let (messages, list) = harness.follow(harness.post("/delete/B001", "").await).await;

    assert_eq!(levels(&messages), vec![Level::Success]);
    assert_eq!(row_count(&list, "B001"), 0);
    assert_eq!(row_count(&list, "B002"), 1);
}

#[tokio::test]
async fn delete_of_missing_book_leaves_table_unchanged() {
    let harness = harness().await;
    harness.post("/add", GO_IN_ACTION).await;

    let (messages, list) = harness.follow(harness.post("/delete/B404", "").await).await;

    assert_eq!(levels(&messages), vec![Level::Warning]);
    assert_eq!(row_count(&list, "B001"), 1);
}

#[tokio::test]
async fn delete_rejects_get() {
    let harness = harness().await;
    harness.post("/add", GO_IN_ACTION).await;

    let response = harness.get("/delete/B001").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(row_count(&harness.list().await, "B001"), 1);
}

#[tokio::test]
async fn go_in_action_lifecycle() {
    let harness = harness().await;

    harness.post("/add", GO_IN_ACTION).await;
    assert_eq!(row_count(&harness.list().await, "B001"), 1);

    harness.post("/edit/B001", UPDATE_B001).await;

    let page = body_text(harness.get("/edit/B001").await).await;
    assert!(page.contains("name=\"interviews_times\" value=\"5\""));
    assert!(page.contains("name=\"book_name\" value=\"Go in Action\""));
    assert!(page.contains("name=\"book_isbn\" value=\"123\""));
    assert!(page.contains("name=\"book_author\" value=\"W. Kennedy\""));
    assert!(page.contains("name=\"book_publisher\" value=\"Manning\""));
    assert!(page.contains("name=\"book_price\" value=\"39.99\""));

    harness.post("/delete/B001", "").await;
    assert_eq!(row_count(&harness.list().await, "B001"), 0);
}

#[tokio::test]
async fn unreachable_database_lists_nothing_with_danger_status() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(&dir.path().join("missing").join("books.db"));
    let registry = shelf_app::build_registry(&settings);
    let app = shelf_http::build_router(&registry, &settings);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("alert-danger"));
    assert!(page.contains("Could not connect to the database"));
    assert!(!page.contains("data-book-id"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/add")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(GO_IN_ACTION))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let messages = decode_cookie(&flash_cookie(&response)).unwrap();
    assert_eq!(levels(&messages), vec![Level::Danger]);
}

#[tokio::test]
async fn missing_table_is_reported_without_leaking_driver_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.db");
    std::fs::File::create(&path).unwrap();
    let settings = settings_for(&path);
    let registry = shelf_app::build_registry(&settings);
    let app = shelf_http::build_router(&registry, &settings);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("alert-danger"));
    assert!(page.contains("(ref "));
    assert!(!page.contains("no such table"));
}

#[tokio::test]
async fn unknown_page_and_health_check() {
    let harness = harness().await;

    assert_eq!(harness.get("/nowhere").await.status(), StatusCode::NOT_FOUND);

    let response = harness.get("/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn unreachable_database_redirects_edit_and_delete_with_danger_status() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(&dir.path().join("missing").join("books.db"));

    for (method, uri, form) in [
        ("GET", "/edit/B001", ""),
        ("POST", "/edit/B001", UPDATE_B001),
        ("POST", "/delete/B001", ""),
    ] {
        let response = send_to(&app, method, uri, form).await;
        let messages = redirected_statuses(&response);

        assert_eq!(levels(&messages), vec![Level::Danger], "{method} {uri}");
        assert!(messages[0].message.contains("Could not connect to the database"));
    }
}

#[tokio::test]
async fn failing_statements_on_edit_and_delete_hide_driver_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.db");
    std::fs::File::create(&path).unwrap();
    let app = app_for(&path);

    for (method, uri, form) in [("GET", "/edit/B001", ""), ("POST", "/delete/B001", "")] {
        let response = send_to(&app, method, uri, form).await;
        let messages = redirected_statuses(&response);

        assert_eq!(levels(&messages), vec![Level::Danger], "{method} {uri}");
        assert!(messages[0].message.contains("(ref "));
        assert!(!messages[0].message.contains("no such table"));
    }

    let response = send_to(&app, "POST", "/edit/B001", UPDATE_B001).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("alert-danger"));
    assert!(page.contains("Could not update book (ref "));
    assert!(!page.contains("no such table"));
    assert!(page.contains("name=\"interviews_times\" value=\"5\""));
}

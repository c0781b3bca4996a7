use std::{collections::HashMap, sync::Arc};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use bookit_api::{
    db::MemoryUserStore,
    error::{AppError, AppResult},
    models::{BookDetails, CandidateBook},
    routes::{create_router, AppState},
    services::BookCatalog,
};

/// Catalog answering from fixed subject lists
#[derive(Default)]
struct StaticCatalog {
    subjects: HashMap<String, Vec<CandidateBook>>,
    failing: Vec<String>,
    details: HashMap<String, BookDetails>,
}

#[async_trait::async_trait]
impl BookCatalog for StaticCatalog {
    async fn search_subject(&self, phrase: &str) -> AppResult<Vec<CandidateBook>> {
        if self.failing.iter().any(|p| p == phrase) {
            return Err(AppError::ExternalApi("catalog unavailable".to_string()));
        }
        Ok(self.subjects.get(phrase).cloned().unwrap_or_default())
    }

    async fn lookup_isbn(&self, isbn: &str) -> AppResult<Option<BookDetails>> {
        Ok(self.details.get(isbn).cloned())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

fn candidates(prefix: &str, count: usize) -> Vec<CandidateBook> {
    (0..count)
        .map(|i| CandidateBook {
            id: Some(format!("{}-{}", prefix, i)),
            title: format!("{} book {}", prefix, i),
            authors: vec!["Someone".to_string()],
            image_link: None,
            categories: vec![format!("Fiction / {}", prefix)],
        })
        .collect()
}

fn test_catalog() -> StaticCatalog {
    let mut catalog = StaticCatalog::default();
    catalog
        .subjects
        .insert("Romance".to_string(), candidates("romance", 5));
    catalog
        .subjects
        .insert("Fantasy".to_string(), candidates("fantasy", 30));
    catalog.failing.push("Mystery".to_string());
    catalog.details.insert(
        "9780385534635".to_string(),
        BookDetails {
            isbn: "9780385534635".to_string(),
            title: "The Night Circus".to_string(),
            authors: vec!["Erin Morgenstern".to_string()],
            image_link: None,
            categories: vec!["Fiction / Fantasy / General".to_string()],
            description: Some("A circus that arrives without warning.".to_string()),
            publisher: None,
            published_date: Some("2011".to_string()),
            page_count: Some(387),
            excerpts: vec![],
        },
    );
    catalog
}

fn create_test_server() -> TestServer {
    let state = AppState::new(
        Arc::new(MemoryUserStore::new()),
        Arc::new(test_catalog()),
        20,
    );
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn user_header(id: Uuid) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_str(&id.to_string()).unwrap(),
    )
}

fn favorite_body(isbn: &str, category: &str) -> Value {
    json!({
        "isbn": isbn,
        "title": format!("Favorite {}", isbn),
        "authors": ["Author"],
        "categories": [category]
    })
}

fn item_ids(slice: &Value) -> Vec<String> {
    slice["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let id = Uuid::new_v4();

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_str(&id.to_string()).unwrap(),
        )
        .await;

    let echoed = response.header("x-request-id");
    assert_eq!(echoed.to_str().unwrap(), id.to_string());

    let response = server.get("/health").await;
    let generated = response.header("x-request-id");
    assert!(Uuid::parse_str(generated.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_list_genres() {
    let server = create_test_server();
    let response = server.get("/api/v1/genres").await;
    response.assert_status_ok();

    let genres: Vec<Value> = response.json();
    assert_eq!(genres.len(), 9);
    let juvenile = genres.iter().find(|g| g["label"] == "Juvenile").unwrap();
    assert_eq!(juvenile["display_name"], "Young Adult");
}

#[tokio::test]
async fn test_demo_profile_without_user_header() {
    let server = create_test_server();
    let response = server.get("/api/v1/user/profile").await;
    response.assert_status_ok();

    let profile: Value = response.json();
    assert_eq!(profile["fav_genres"], json!(["Romance", "Mystery", "Fantasy"]));
}

#[tokio::test]
async fn test_create_user_and_duplicate_email() {
    let server = create_test_server();
    let body = json!({ "email": "Reader@Example.com", "first_name": "Ada" });

    let response = server.post("/api/v1/users").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    let profile: Value = response.json();
    assert_eq!(profile["email"], "reader@example.com");
    assert_eq!(profile["fav_genres"], json!([]));

    let response = server.post("/api/v1/users").json(&body).await;
    response.assert_status(StatusCode::CONFLICT);
    let error: Value = response.json();
    assert_eq!(error["error"], "That email is already taken.");
}

#[tokio::test]
async fn test_unknown_user_profile_is_not_found() {
    let server = create_test_server();
    let (name, value) = user_header(Uuid::new_v4());
    let response = server.get("/api/v1/user/profile").add_header(name, value).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_interests_dedupes() {
    let server = create_test_server();
    let response = server
        .put("/api/v1/user/interests")
        .json(&json!({ "genres": ["Thriller", "Fantasy", "Thriller"] }))
        .await;
    response.assert_status_ok();

    let profile: Value = response.json();
    assert_eq!(profile["fav_genres"], json!(["Thriller", "Fantasy"]));
}

#[tokio::test]
async fn test_increment_genre_count() {
    let server = create_test_server();
    let body = json!({ "genre": "Science-Fiction" });

    server.put("/api/v1/user/genre-count").json(&body).await.assert_status_ok();
    let response = server.put("/api/v1/user/genre-count").json(&body).await;
    let count: Value = response.json();
    assert_eq!(count["count"], 2);

    let profile: Value = server.get("/api/v1/user/profile").await.json();
    assert_eq!(profile["genre_counts"]["sciencefiction"], 2);
}

#[tokio::test]
async fn test_favorites_lifecycle() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/user/favorites")
        .json(&favorite_body("111", "Fiction / Romance"))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/v1/user/favorites")
        .json(&favorite_body("111", "Fiction / Romance"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let error: Value = response.json();
    assert_eq!(error["error"], "Book already in favorites");

    let favorites: Vec<Value> = server.get("/api/v1/user/favorites").await.json();
    assert_eq!(favorites.len(), 1);

    server
        .delete("/api/v1/user/favorites/111")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete("/api/v1/user/favorites/111")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let favorites: Vec<Value> = server.get("/api/v1/user/favorites").await.json();
    assert!(favorites.is_empty());
}

#[tokio::test]
async fn test_bookshelf_groups_by_first_segment() {
    let server = create_test_server();
    for (isbn, category) in [
        ("1", "Fiction / Romance"),
        ("2", "Psychology / General"),
        ("3", "Fiction / Fantasy"),
        ("4", ""),
    ] {
        server
            .post("/api/v1/user/favorites")
            .json(&favorite_body(isbn, category))
            .await
            .assert_status(StatusCode::CREATED);
    }
    server
        .post("/api/v1/user/favorites")
        .json(&json!({ "isbn": "5", "title": "Uncategorized", "authors": [], "categories": [] }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/api/v1/user/bookshelf?per_row=5").await;
    response.assert_status_ok();
    let shelf: Value = response.json();

    assert_eq!(shelf["genres"], json!(["", "Fiction", "Self-Help"]));
    assert_eq!(shelf["shelves"][0]["genre"], "Fiction");
    let fiction_rows = shelf["shelves"][0]["rows"].as_array().unwrap();
    assert_eq!(fiction_rows.len(), 1);
    assert_eq!(fiction_rows[0].as_array().unwrap().len(), 3);
    assert_eq!(shelf["shelves"][1]["genre"], "Self-Help");
    assert_eq!(shelf["shelves"][2]["genre"], "");
    assert_eq!(shelf["shelves"][2]["rows"][0][0]["isbn"], "4");
}

#[tokio::test]
async fn test_book_details() {
    let server = create_test_server();

    let response = server.get("/api/v1/books/9780385534635").await;
    response.assert_status_ok();
    let book: Value = response.json();
    assert_eq!(book["title"], "The Night Circus");
    assert_eq!(book["page_count"], 387);

    let response = server.get("/api/v1/books/0000000000").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_browsing_flow() {
    let server = create_test_server();

    let response = server.post("/api/v1/sessions").await;
    response.assert_status(StatusCode::CREATED);
    let session: Value = response.json();
    let session_id = session["id"].as_str().unwrap().to_string();

    let genres = session["genres"].as_array().unwrap();
    assert_eq!(genres.len(), 3);

    // Romance has 5 candidates
    let romance = &genres[0];
    assert_eq!(romance["genre"], "Romance");
    assert_eq!(romance["cursor"], 0);
    assert_eq!(item_ids(romance).len(), 2);
    assert_eq!(romance["has_more"], true);
    assert_eq!(romance["has_prev"], false);

    // A failed lookup leaves the genre empty rather than failing the session
    let mystery = &genres[1];
    assert_eq!(mystery["genre"], "Mystery");
    assert!(item_ids(mystery).is_empty());
    assert_eq!(mystery["has_more"], false);

    let base = format!("/api/v1/sessions/{}/genres/Romance", session_id);

    let slice: Value = server.post(&format!("{}/next", base)).await.json();
    assert_eq!(slice["cursor"], 2);
    assert_eq!(slice["has_prev"], true);

    let slice: Value = server.post(&format!("{}/next", base)).await.json();
    assert_eq!(slice["cursor"], 4);
    assert_eq!(item_ids(&slice).len(), 1);
    assert_eq!(slice["has_more"], false);

    // No later window to move to
    let slice: Value = server.post(&format!("{}/next", base)).await.json();
    assert_eq!(slice["cursor"], 4);

    let slice: Value = server.post(&format!("{}/prev", base)).await.json();
    assert_eq!(slice["cursor"], 2);
    let visible = item_ids(&slice);

    let slice: Value = server
        .post(&format!("{}/hide", base))
        .json(&json!({ "id": visible[0] }))
        .await
        .json();
    assert_eq!(slice["cursor"], 2);
    assert!(!item_ids(&slice).contains(&visible[0]));
    assert_eq!(item_ids(&slice).len(), 2);

    let slice: Value = server.post(&format!("{}/refresh", base)).await.json();
    assert_eq!(slice["cursor"], 0);
    assert_eq!(item_ids(&slice).len(), 2);

    // Fantasy is capped at 20 candidates: windows start at 0, 2, ..., 18
    let fantasy = format!("/api/v1/sessions/{}/genres/Fantasy", session_id);
    let mut slice: Value = server.get(&fantasy).await.json();
    for _ in 0..15 {
        slice = server.post(&format!("{}/next", fantasy)).await.json();
    }
    assert_eq!(slice["cursor"], 18);
    assert_eq!(slice["has_more"], false);
}

#[tokio::test]
async fn test_session_excludes_favorites() {
    let server = create_test_server();
    for i in 0..4 {
        server
            .post("/api/v1/user/favorites")
            .json(&favorite_body(&format!("romance-{}", i), "Fantasy"))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let session: Value = server.post("/api/v1/sessions").await.json();
    let romance = &session["genres"][0];
    assert_eq!(romance["genre"], "Romance");
    // "Fantasy" favorites do not match Romance, so the label is searched;
    // only romance-4 survives exclusion
    assert_eq!(item_ids(romance), vec!["romance-4".to_string()]);
    assert_eq!(romance["has_more"], false);
}

#[tokio::test]
async fn test_unknown_session_genre_is_not_found() {
    let server = create_test_server();
    let session: Value = server.post("/api/v1/sessions").await.json();
    let session_id = session["id"].as_str().unwrap();

    let response = server
        .post(&format!("/api/v1/sessions/{}/genres/Thriller/next", session_id))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server
        .get(&format!("/api/v1/sessions/{}", Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refreshing_a_genre_outside_the_session_is_not_found() {
    let server = create_test_server();
    let session: Value = server.post("/api/v1/sessions").await.json();
    let session_id = session["id"].as_str().unwrap();

    server
        .post(&format!("/api/v1/sessions/{}/genres/Thriller/refresh", session_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let session: Value = server
        .get(&format!("/api/v1/sessions/{}", session_id))
        .await
        .json();
    let genres: Vec<&str> = session["genres"]
        .as_array()
        .unwrap()
        .iter()
        .map(|slice| slice["genre"].as_str().unwrap())
        .collect();
    assert_eq!(genres, vec!["Romance", "Mystery", "Fantasy"]);

    server
        .post(&format!("/api/v1/sessions/{}/genres/Romance/refresh", session_id))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_genre_paths_accept_spelling_variants() {
    let server = create_test_server();
    let session: Value = server.post("/api/v1/sessions").await.json();
    let session_id = session["id"].as_str().unwrap();

    let response = server
        .post(&format!("/api/v1/sessions/{}/genres/romance/next", session_id))
        .await;
    response.assert_status_ok();
    let slice: Value = response.json();
    assert_eq!(slice["genre"], "Romance");
    assert_eq!(slice["cursor"], 2);

    let slice: Value = server
        .get(&format!("/api/v1/sessions/{}/genres/ROMANCE", session_id))
        .await
        .json();
    assert_eq!(slice["cursor"], 2);
}

#[tokio::test]
async fn test_session_belongs_to_its_user() {
    let server = create_test_server();
    let session: Value = server.post("/api/v1/sessions").await.json();
    let session_id = session["id"].as_str().unwrap();

    let (name, value) = user_header(Uuid::new_v4());
    let response = server
        .get(&format!("/api/v1/sessions/{}", session_id))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    server
        .delete(&format!("/api/v1/sessions/{}", session_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/v1/sessions/{}", session_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

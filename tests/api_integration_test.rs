use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use book_catalog::jobs::CoverGenerator;
use book_catalog::{AppState, api, auth, db};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

const ISBN: &str = "9786644879585";

// Helper to create a test app state; nothing here talks to the meme API
async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let generator = CoverGenerator::new(reqwest::Client::new(), "http://127.0.0.1:1/get_memes");
    AppState::with_cover_generator(db, generator, 8)
}

// Helper to insert a book directly, bypassing the API
async fn insert_book(db: &DatabaseConnection, title: &str, isbn: Option<&str>, archived: bool) -> String {
    let now = chrono::Utc::now().to_rfc3339();
    let id = uuid::Uuid::new_v4().to_string();
    let book = book_catalog::models::book::ActiveModel {
        id: Set(id.clone()),
        isbn: Set(isbn.map(str::to_string)),
        title: Set(title.to_string()),
        description: Set("A test description".to_string()),
        author: Set("Test Author".to_string()),
        publication_date: Set("2001-01-01T00:00:00+00:00".to_string()),
        archived: Set(archived),
        cover: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    };
    book_catalog::models::book::Entity::insert(book)
        .exec(db)
        .await
        .expect("Failed to create book");
    id
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, content_type: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

fn handmaids_tale() -> Value {
    json!({
        "isbn": "0099740915",
        "title": "The Handmaid's Tale",
        "description": "Brilliantly conceived and executed, this powerful evocation of twenty-first century America gives full rein to Margaret Atwood's devastating irony, wit and astute perception.",
        "author": "Margaret Atwood",
        "publicationDate": "1985-07-31T00:00:00+00:00"
    })
}

#[tokio::test]
async fn test_create_book() {
    let state = setup_test_state().await;
    let app = api::api_router(state);

    let (status, json) = send(
        &app,
        json_request("POST", "/books", "application/json", &handmaids_tale()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let book = &json["book"];
    assert_eq!(book["isbn"], "0099740915");
    assert_eq!(book["title"], "The Handmaid's Tale");
    assert_eq!(book["author"], "Margaret Atwood");
    assert_eq!(book["publicationDate"], "1985-07-31T00:00:00+00:00");
    assert_eq!(book["archived"], false);
    assert_eq!(book["reviews"], json!([]));
    assert!(book["cover"].is_null());

    let id = book["id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok(), "id should be a UUID: {id}");
}

#[tokio::test]
async fn test_book_crud_round() {
    let state = setup_test_state().await;
    let app = api::api_router(state);

    let (_, created) = send(
        &app,
        json_request("POST", "/books", "application/json", &handmaids_tale()),
    )
    .await;
    let id = created["book"]["id"].as_str().unwrap().to_string();

    // Read
    let (status, fetched) = send(&app, get(&format!("/books/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "The Handmaid's Tale");

    // Delete as admin
    let token = auth::create_jwt("admin@example.com", "admin").unwrap();
    let req = Request::builder()
        .uri(format!("/books/{}", id))
        .method("DELETE")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/books/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_book_with_merge_patch() {
    let state = setup_test_state().await;
    let id = insert_book(state.db(), "Original title", Some(ISBN), false).await;
    let app = api::api_router(state);

    let (status, json) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/books/{}", id),
            "application/merge-patch+json",
            &json!({ "title": "updated title" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["book"]["id"], id.as_str());
    assert_eq!(json["book"]["isbn"], ISBN);
    assert_eq!(json["book"]["title"], "updated title");
    assert_eq!(json["book"]["author"], "Test Author");
}

#[tokio::test]
async fn test_patch_can_archive_and_clear_cover() {
    let state = setup_test_state().await;
    let id = insert_book(state.db(), "Archivable", None, false).await;
    state
        .book_repo
        .set_cover(&id, Some("https://example.com/cover.png".to_string()))
        .await
        .unwrap();
    let app = api::api_router(state.clone());

    let (status, json) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/books/{}", id),
            "application/json",
            &json!({ "archived": true, "cover": null }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["book"]["archived"], true);
    assert!(json["book"]["cover"].is_null());
}

#[tokio::test]
async fn test_get_collection_pagination() {
    let state = setup_test_state().await;
    for i in 1..=100 {
        insert_book(state.db(), &format!("Book {}", i), None, false).await;
    }
    insert_book(state.db(), "Archived book", None, true).await;
    let app = api::api_router(state);

    let (status, json) = send(&app, get("/books")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 101);
    assert_eq!(json["page"], 1);
    assert_eq!(json["itemsPerPage"], 30);
    assert_eq!(json["lastPage"], 4);
    assert_eq!(json["books"].as_array().unwrap().len(), 30);

    let (_, last) = send(&app, get("/books?page=4")).await;
    assert_eq!(last["books"].as_array().unwrap().len(), 11);

    let (_, wide) = send(&app, get("/books?itemsPerPage=50&page=2")).await;
    assert_eq!(wide["books"].as_array().unwrap().len(), 50);
    assert_eq!(wide["lastPage"], 3);
}

#[tokio::test]
async fn test_archived_filter_parameter() {
    let state = setup_test_state().await;
    for i in 1..=5 {
        insert_book(state.db(), &format!("Book {}", i), None, false).await;
    }
    insert_book(state.db(), "Archived book", None, true).await;
    let app = api::api_router(state);

    let cases = [
        // Only archived are returned
        ("true", 1),
        ("1", 1),
        // Incorrect value, no filter applied
        ("", 6),
        ("true[]", 6),
        ("foobar", 6),
        // archived items are excluded
        ("false", 5),
        ("0", 5),
    ];

    for (value, expected) in cases {
        let (status, json) = send(&app, get(&format!("/books?archived={}", value))).await;
        assert_eq!(status, StatusCode::OK, "archived={value}");
        assert_eq!(json["total"], expected, "archived={value}");
    }

    // The filter is not applied by default
    let (_, json) = send(&app, get("/books")).await;
    assert_eq!(json["total"], 6);
}

#[tokio::test]
async fn test_search_filters_and_sort() {
    let state = setup_test_state().await;
    insert_book(state.db(), "Dune", Some("9780441172719"), false).await;
    insert_book(state.db(), "Dune Messiah", None, false).await;
    insert_book(state.db(), "Foundation", Some("9780306406157"), false).await;
    let app = api::api_router(state);

    let (_, json) = send(&app, get("/books?title=Dune&sort=title_desc")).await;
    let titles: Vec<&str> = json["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Dune Messiah", "Dune"]);

    let (_, json) = send(&app, get("/books?isbn=9780306406157")).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["books"][0]["title"], "Foundation");

    let (_, json) = send(&app, get("/books?author=Nobody")).await;
    assert_eq!(json["total"], 0);
    assert_eq!(json["lastPage"], 1);
}

#[tokio::test]
async fn test_title_and_author_search_is_literal_and_case_sensitive() {
    let state = setup_test_state().await;
    insert_book(state.db(), "Dune", None, false).await;
    insert_book(state.db(), "Foundation", None, false).await;
    insert_book(state.db(), "100% Pure", None, false).await;
    let app = api::api_router(state);

    let cases = [
        ("title=dune", 0),
        ("title=Dune", 1),
        // `%` and `_` are plain characters, not wildcards
        ("title=%25", 1),
        ("title=_", 0),
        ("author=test%20author", 0),
        ("author=Test%20Author", 3),
    ];

    for (query, expected) in cases {
        let (status, json) = send(&app, get(&format!("/books?{}", query))).await;
        assert_eq!(status, StatusCode::OK, "{query}");
        assert_eq!(json["total"], expected, "{query}");
    }
}

#[tokio::test]
async fn test_page_far_past_the_end_is_empty() {
    let state = setup_test_state().await;
    insert_book(state.db(), "Only book", None, false).await;
    let app = api::api_router(state);

    for page in ["2", "18446744073709551615"] {
        let (status, json) = send(&app, get(&format!("/books?page={}", page))).await;
        assert_eq!(status, StatusCode::OK, "page={page}");
        assert_eq!(json["total"], 1);
        assert_eq!(json["lastPage"], 1);
        assert_eq!(json["books"], json!([]), "page={page}");
    }

    let (_, json) = send(&app, get("/books?page=18446744073709551615&itemsPerPage=100")).await;
    assert_eq!(json["books"], json!([]));
}

#[tokio::test]
async fn test_patch_without_cover_keeps_cover_written_meanwhile() {
    let state = setup_test_state().await;
    let id = insert_book(state.db(), "Racing", None, false).await;

    // The PATCH handler reads the book before the cover job saves its result
    let existing = state.book_repo.find_by_id(&id).await.unwrap().unwrap();
    state
        .book_repo
        .set_cover(&id, Some("data:image/png;base64,AAAA".to_string()))
        .await
        .unwrap();

    let patch: book_catalog::models::book::BookPatch =
        serde_json::from_value(json!({ "title": "Renamed" })).unwrap();
    let replace_cover = patch.cover.is_some();
    let draft = book_catalog::domain::validation::validate_book(patch.apply_to(&existing)).unwrap();
    let updated = state.book_repo.update(&id, draft, replace_cover).await.unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.cover.as_deref(), Some("data:image/png;base64,AAAA"));

    let stored = state.book_repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.cover.as_deref(), Some("data:image/png;base64,AAAA"));
}

#[tokio::test]
async fn test_reviews_are_embedded_and_deleted_with_book() {
    let state = setup_test_state().await;
    let book_id = insert_book(state.db(), "Reviewed", Some(ISBN), false).await;
    let app = api::api_router(state.clone());

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/reviews",
            "application/json",
            &json!({
                "bookId": book_id,
                "body": "Could not put it down.",
                "rating": 5,
                "author": "Kévin"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["review"]["rating"], 5);

    let (_, book) = send(&app, get(&format!("/books/{}", book_id))).await;
    assert_eq!(book["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(book["reviews"][0]["body"], "Could not put it down.");

    let (status, listed) = send(&app, get(&format!("/books/{}/reviews", book_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);

    state.book_repo.delete(&book_id).await.unwrap();
    let remaining = book_catalog::models::review::Entity::find()
        .count(state.db())
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_seeded_catalog() {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    book_catalog::seed::seed_demo_data(&db).await.unwrap();
    // Seeding twice must not duplicate anything
    book_catalog::seed::seed_demo_data(&db).await.unwrap();

    let books = book_catalog::models::book::Entity::find()
        .count(&db)
        .await
        .unwrap();
    assert_eq!(books, 101);

    let users = book_catalog::models::user::Entity::find()
        .count(&db)
        .await
        .unwrap();
    assert_eq!(users, 2);

    let generator = CoverGenerator::new(reqwest::Client::new(), "http://127.0.0.1:1/get_memes");
    let app = api::api_router(AppState::with_cover_generator(db, generator, 8));

    let (_, json) = send(&app, get("/books?archived=true")).await;
    assert_eq!(json["total"], 1);
    let isbn = json["books"][0]["isbn"].as_str().unwrap();
    assert!(book_catalog::domain::validation::is_valid_isbn(isbn));
}

#[tokio::test]
async fn test_health() {
    let state = setup_test_state().await;
    let app = api::api_router(state);

    let (status, json) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{rt, test, App, HttpServer};
use serde_json::json;
use std::net::TcpListener;
use todo_list_api::startup::{configure, cors, AppState};

use common::{bearer, register_and_login, send, SECRET};

#[actix_rt::test]
async fn test_todo_crud() {
    let state = AppState::in_memory(SECRET).unwrap();
    let app = init_app!(state);
    let pair = register_and_login(&app, "crud@example.com", "longenough1").await;
    let token = pair["access_token"].as_str().unwrap();

    // Create
    let (status, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/todos")
            .insert_header(bearer(token))
            .set_json(json!({
                "title": "  Write report  ",
                "description": "Quarterly numbers",
                "priority": "high",
                "category": "work",
                "dueDate": "2030-06-01T09:00:00Z"
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["title"], "Write report");
    assert_eq!(created["priority"], "high");
    assert_eq!(created["completed"], false);
    assert!(created["dueDate"].is_string());
    let id = created["id"].as_u64().unwrap();

    // Read
    let (status, fetched) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/todos/{}", id))
            .insert_header(bearer(token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id);

    // Update
    let (status, updated) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/todos/{}", id))
            .insert_header(bearer(token))
            .set_json(json!({ "title": "Write report", "completed": true, "dueDate": "soon" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["dueDate"], json!(null));
    assert_eq!(updated["createdAt"], created["createdAt"]);

    // Second todo lists first
    let (_, second) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/todos")
            .insert_header(bearer(token))
            .set_json(json!({ "title": "Second" })),
    )
    .await;
    let (status, list) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/todos")
            .insert_header(bearer(token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![second["id"].as_u64().unwrap(), id]);

    // Delete
    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/todos/{}", id))
            .insert_header(bearer(token)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, json!(null));

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/todos/{}", id))
            .insert_header(bearer(token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_todo_validation() {
    let state = AppState::in_memory(SECRET).unwrap();
    let app = init_app!(state);
    let pair = register_and_login(&app, "rules@example.com", "longenough1").await;
    let token = pair["access_token"].as_str().unwrap();

    let test_cases = vec![
        json!({ "title": "" }),
        json!({ "title": "t".repeat(201) }),
        json!({ "title": "ok", "description": "d".repeat(1001) }),
        json!({ "title": "ok", "category": "c".repeat(51) }),
        json!({ "title": "ok", "category": "no/slashes" }),
    ];

    for payload in test_cases {
        let (status, body) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/todos")
                .insert_header(bearer(token))
                .set_json(&payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert!(body["error"].is_string());
    }

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/todos/0")
            .insert_header(bearer(token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "invalid-id");
}

#[actix_rt::test]
async fn test_todos_are_private_to_their_owner() {
    let state = AppState::in_memory(SECRET).unwrap();
    let app = init_app!(state);
    let alice = register_and_login(&app, "alice@example.com", "longenough1").await;
    let bob = register_and_login(&app, "bob@example.com", "longenough2").await;
    let alice_token = alice["access_token"].as_str().unwrap();
    let bob_token = bob["access_token"].as_str().unwrap();

    let (status, todo) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/todos")
            .insert_header(bearer(alice_token))
            .set_json(json!({ "title": "Alice's todo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/todos/{}", todo["id"].as_u64().unwrap());

    let (status, list) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/todos")
            .insert_header(bearer(bob_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let (status, _) = send(
        &app,
        test::TestRequest::get().uri(&uri).insert_header(bearer(bob_token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(bob_token))
            .set_json(json!({ "title": "Taken over" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(bob_token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, still_there) = send(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(alice_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(still_there["title"], "Alice's todo");
}

#[actix_rt::test]
async fn test_missing_or_malformed_authorization() {
    let state = AppState::in_memory(SECRET).unwrap();
    let app = init_app!(state);

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/todos")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/todos")
            .insert_header(("Authorization", "Token abc")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_create_todo_unauthorized() {
    let state = AppState::in_memory(SECRET).unwrap();

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .wrap(Logger::default())
            .configure(configure(&state))
    })
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/todos", port))
        .json(&json!({ "title": "Unauthorized Todo" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.expect("JSON error body");
    assert!(body["error"].is_string());

    handle.stop(false).await;
}

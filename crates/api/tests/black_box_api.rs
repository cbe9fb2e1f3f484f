use reqwest::StatusCode;
use serde_json::json;

use bitacora_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = build_app(AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_author(client: &reqwest::Client, srv: &TestServer, name: &str) -> serde_json::Value {
    let res = client
        .post(srv.url("/api/authors"))
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn create_post(
    client: &reqwest::Client,
    srv: &TestServer,
    title: &str,
    author_id: i64,
) -> serde_json::Value {
    let res = client
        .post(srv.url("/api/posts"))
        .json(&json!({ "title": title, "content": format!("{title}!"), "authorId": author_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_author_returns_201_with_generated_id() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let author = create_author(&client, &srv, "Jane").await;

    assert_eq!(author["name"], "Jane");
    assert!(author["id"].as_i64().is_some());
    assert!(author["createdAt"].is_string());
    assert_eq!(author["createdAt"], author["updatedAt"]);
}

#[tokio::test]
async fn missing_author_is_404_with_spanish_message() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/api/authors/9999", "/api/authors/not-a-number"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Autor no encontrado" }));
    }

    let res = client
        .patch(srv.url("/api/authors/9999"))
        .json(&json!({ "name": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.delete(srv.url("/api/authors/9999")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_lifecycle_update_then_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let author = create_author(&client, &srv, "Jane").await;
    let id = author["id"].as_i64().unwrap();

    // Update
    let res = client
        .patch(srv.url(&format!("/api/authors/{id}")))
        .json(&json!({ "name": "Janet" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["id"], id);
    assert_eq!(updated["name"], "Janet");
    assert_eq!(updated["createdAt"], author["createdAt"]);

    // Read back
    let res = client
        .get(srv.url(&format!("/api/authors/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["name"], "Janet");

    // Delete
    let res = client
        .delete(srv.url(&format!("/api/authors/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Autor eliminado correctamente" }));

    let res = client
        .get(srv.url(&format!("/api/authors/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/api/authors")).send().await.unwrap();
    let all: Vec<serde_json::Value> = res.json().await.unwrap();
    assert!(all.iter().all(|a| a["id"] != id));
}

#[tokio::test]
async fn post_with_unknown_author_is_accepted() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let post = create_post(&client, &srv, "Huérfano", 424242).await;

    assert_eq!(post["authorId"], 424242);
    assert_eq!(post["title"], "Huérfano");
    assert_eq!(post["content"], "Huérfano!");
}

#[tokio::test]
async fn listing_posts_includes_every_created_post() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let author = create_author(&client, &srv, "Ana").await;
    let author_id = author["id"].as_i64().unwrap();

    let mut ids = Vec::new();
    for n in 0..5 {
        let post = create_post(&client, &srv, &format!("post {n}"), author_id).await;
        ids.push(post["id"].as_i64().unwrap());
    }

    let res = client.get(srv.url("/api/posts")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let all: Vec<serde_json::Value> = res.json().await.unwrap();

    assert!(all.len() >= ids.len());
    for id in ids {
        assert!(all.iter().any(|p| p["id"] == id), "post {id} missing from listing");
    }
}

#[tokio::test]
async fn post_update_cannot_change_author() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let post = create_post(&client, &srv, "Borrador", 1).await;
    let id = post["id"].as_i64().unwrap();

    let res = client
        .patch(srv.url(&format!("/api/posts/{id}")))
        .json(&json!({ "title": "Final", "content": "Texto", "authorId": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["content"], "Texto");
    assert_eq!(updated["authorId"], 1);

    let res = client
        .get(srv.url(&format!("/api/posts/{id}")))
        .send()
        .await
        .unwrap();
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["title"], "Final");
    assert_eq!(fetched["authorId"], 1);
}

#[tokio::test]
async fn post_delete_then_get_is_404() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let post = create_post(&client, &srv, "Efímero", 1).await;
    let id = post["id"].as_i64().unwrap();

    let res = client
        .delete(srv.url(&format!("/api/posts/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Publicación eliminada correctamente" }));

    let res = client
        .get(srv.url(&format!("/api/posts/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Publicación no encontrada" }));

    let res = client
        .delete(srv.url(&format!("/api/posts/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_author_keeps_their_posts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let author = create_author(&client, &srv, "Ana").await;
    let author_id = author["id"].as_i64().unwrap();
    let post = create_post(&client, &srv, "Sigue aquí", author_id).await;

    let res = client
        .delete(srv.url(&format!("/api/authors/{author_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url(&format!("/api/posts/{}", post["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["authorId"], author_id);
}

#[tokio::test]
async fn malformed_bodies_are_rejected_with_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Missing field
    let res = client
        .post(srv.url("/api/posts"))
        .json(&json!({ "title": "Sin autor", "content": "..." }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    // Wrong type
    let res = client
        .post(srv.url("/api/authors"))
        .json(&json!({ "name": 42 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Not JSON at all
    let res = client
        .post(srv.url("/api/authors"))
        .header("content-type", "application/json")
        .body("{name:")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Missing content type
    let res = client
        .post(srv.url("/api/authors"))
        .body(r#"{"name":"Jane"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Nothing was created by the rejected requests.
    let res = client.get(srv.url("/api/authors")).send().await.unwrap();
    let all: Vec<serde_json::Value> = res.json().await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn empty_names_are_accepted() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let author = create_author(&client, &srv, "").await;
    assert_eq!(author["name"], "");
}

#[tokio::test]
async fn undecodable_path_ids_are_404_json() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cases = [
        ("/api/authors/%FF", json!({ "error": "Autor no encontrado" })),
        ("/api/authors/%C3%28", json!({ "error": "Autor no encontrado" })),
        ("/api/posts/%FF", json!({ "error": "Publicación no encontrada" })),
        ("/api/posts/%C3%28", json!({ "error": "Publicación no encontrada" })),
    ];

    for (path, expected) in cases {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "GET {path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body, expected, "GET {path}");

        let res = client.delete(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "DELETE {path}");

        let res = client
            .patch(srv.url(path))
            .json(&json!({ "name": "x", "title": "x", "content": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "PATCH {path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body, expected, "PATCH {path}");
    }
}

#[tokio::test]
async fn missing_post_is_404_with_spanish_message() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/api/posts/9999", "/api/posts/no-es-un-numero"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Publicación no encontrada" }));

        let res = client
            .patch(srv.url(path))
            .json(&json!({ "title": "t", "content": "c" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Publicación no encontrada" }));
    }
}

#[tokio::test]
async fn patch_with_malformed_body_is_400_and_changes_nothing() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let author = create_author(&client, &srv, "Jane").await;
    let author_id = author["id"].as_i64().unwrap();
    let post = create_post(&client, &srv, "Intacto", author_id).await;
    let post_id = post["id"].as_i64().unwrap();

    // Author: missing field, wrong type
    for body in [json!({}), json!({ "name": 7 })] {
        let res = client
            .patch(srv.url(&format!("/api/authors/{author_id}")))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: serde_json::Value = res.json().await.unwrap();
        assert!(err["error"].is_string());
    }

    // Post: missing content, not JSON
    let res = client
        .patch(srv.url(&format!("/api/posts/{post_id}")))
        .json(&json!({ "title": "Nuevo" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .patch(srv.url(&format!("/api/posts/{post_id}")))
        .header("content-type", "application/json")
        .body("{title:")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(srv.url(&format!("/api/authors/{author_id}")))
        .send()
        .await
        .unwrap();
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched, author);

    let res = client
        .get(srv.url(&format!("/api/posts/{post_id}")))
        .send()
        .await
        .unwrap();
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched, post);
}

#[tokio::test]
async fn patch_on_unknown_id_reports_404_before_body_errors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .patch(srv.url("/api/authors/9999"))
        .json(&json!({ "name": 42 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Autor no encontrado" }));

    let res = client
        .patch(srv.url("/api/posts/9999"))
        .header("content-type", "application/json")
        .body("{title:")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Publicación no encontrada" }));
}

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use wallet_api::app::{AppServices, build_app};
use wallet_auth::Scope;
use wallet_core::{Amount, Identity};
use wallet_infra::{AccountStore, WalletConfig};

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = WalletConfig::from_lookup(|name| match name {
            "JWT_SECRET" => Some("test-secret".to_string()),
            "STORE_TIMEOUT_MS" => Some("1000".to_string()),
            _ => None,
        })
        .expect("test config");

        // Same router as prod, in-memory stores, ephemeral port.
        let services = Arc::new(AppServices::in_memory(&config));
        let app = build_app(services.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fund(&self, email: &str, amount: i64) {
        self.services
            .accounts()
            .deposit(&Identity::parse(email).unwrap(), Amount::new(amount).unwrap())
            .await
            .unwrap()
            .expect("account exists");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn register(client: &reqwest::Client, srv: &TestServer, email: &str, username: &str) {
    let res = client
        .post(srv.url("/users/register"))
        .json(&json!({
            "first_name": "Test",
            "last_name": "User",
            "email": email,
            "username": username,
            "password": "hunter2",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

async fn login(client: &reqwest::Client, srv: &TestServer, login: &str) -> String {
    let res = client
        .post(srv.url("/users/login"))
        .json(&json!({ "uname_or_mail": login, "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["jwt"].as_str().unwrap().to_string()
}

async fn balance(client: &reqwest::Client, srv: &TestServer, token: &str) -> i64 {
    let res = client
        .get(srv.url("/users/balance"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["balance"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/users/balance")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 401);

    let res = client
        .post(srv.url("/users/pay"))
        .bearer_auth("not-a-token")
        .json(&json!({ "unam_or_mail": "b@x.io", "amount": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_validates_and_rejects_duplicates() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/users/register"))
        .json(&json!({ "email": "a@x.io" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    register(&client, &srv, "a@x.io", "alice").await;

    let res = client
        .post(srv.url("/users/register"))
        .json(&json!({
            "first_name": "Other",
            "last_name": "User",
            "email": "other@x.io",
            "username": "alice",
            "password": "pw",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Sorry user already exists");
}

#[tokio::test]
async fn login_outcomes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "a@x.io", "alice").await;

    // Username and email both work.
    login(&client, &srv, "alice").await;
    login(&client, &srv, "a@x.io").await;

    let res = client
        .post(srv.url("/users/login"))
        .json(&json!({ "uname_or_mail": "alice", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(srv.url("/users/login"))
        .json(&json!({ "uname_or_mail": "nobody", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pay_flow_updates_balances_and_history() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "a@x.io", "alice").await;
    register(&client, &srv, "b@x.io", "bob").await;
    srv.fund("a@x.io", 100).await;

    let alice = login(&client, &srv, "alice").await;
    let bob = login(&client, &srv, "bob").await;

    let res = client
        .post(srv.url("/users/pay"))
        .bearer_auth(&alice)
        .json(&json!({ "unam_or_mail": "b@x.io", "amount": 40 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"]["type"], "Debit");
    assert_eq!(body["message"]["amount"], 40);
    assert_eq!(body["message"]["description"], "b@x.io");

    assert_eq!(balance(&client, &srv, &alice).await, 60);
    assert_eq!(balance(&client, &srv, &bob).await, 40);

    let res = client
        .post(srv.url("/users/pay"))
        .bearer_auth(&alice)
        .json(&json!({ "unam_or_mail": "b@x.io", "amount": 1000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Insufficient Balance");

    let res = client
        .get(srv.url("/users/transactions?page=1"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let items = body["transactions"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "Credit");
    assert_eq!(items[0]["description"], "a@x.io");
    assert_eq!(body["user"], "b@x.io");
}

#[tokio::test]
async fn pay_rejections_map_to_status_codes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "a@x.io", "alice").await;
    srv.fund("a@x.io", 10).await;
    let alice = login(&client, &srv, "alice").await;

    let cases = [
        (json!({ "unam_or_mail": "a@x.io", "amount": 1 }), StatusCode::FORBIDDEN),
        (json!({ "unam_or_mail": "b@x.io", "amount": 0 }), StatusCode::FORBIDDEN),
        (json!({ "unam_or_mail": "ghost@x.io", "amount": 1 }), StatusCode::NOT_FOUND),
        (json!({ "amount": 1 }), StatusCode::FORBIDDEN),
        (json!({ "unam_or_mail": "b@x.io" }), StatusCode::FORBIDDEN),
        (json!({ "unam_or_mail": "b@x.io", "amount": "5" }), StatusCode::FORBIDDEN),
        (json!({ "unam_or_mail": "b@x.io", "amount": 1.5 }), StatusCode::FORBIDDEN),
    ];

    for (body, expected) in cases {
        let res = client
            .post(srv.url("/users/pay"))
            .bearer_auth(&alice)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), expected, "body: {body}");
    }

    // Not JSON at all.
    let res = client
        .post(srv.url("/users/pay"))
        .bearer_auth(&alice)
        .header("content-type", "application/json")
        .body("amount=5")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(balance(&client, &srv, &alice).await, 10);
}

#[tokio::test]
async fn logout_revokes_the_token_immediately() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "a@x.io", "alice").await;
    let token = login(&client, &srv, "alice").await;

    let res = client
        .get(srv.url("/users/details"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password_hash").is_none());

    let res = client
        .post(srv.url("/users/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url("/users/balance"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn read_only_token_cannot_pay() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "a@x.io", "alice").await;

    let token = srv
        .services
        .codec()
        .issue(&Identity::parse("a@x.io").unwrap(), &[Scope::READ_USERS])
        .unwrap()
        .token;

    let res = client
        .post(srv.url("/users/pay"))
        .bearer_auth(&token)
        .json(&json!({ "unam_or_mail": "b@x.io", "amount": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    assert_eq!(balance(&client, &srv, &token).await, 0);
}

#[tokio::test]
async fn pagination_past_the_end_is_empty() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    register(&client, &srv, "a@x.io", "alice").await;
    register(&client, &srv, "b@x.io", "bob").await;
    srv.fund("a@x.io", 100).await;
    let alice = login(&client, &srv, "alice").await;

    for _ in 0..12 {
        let res = client
            .post(srv.url("/users/pay"))
            .bearer_auth(&alice)
            .json(&json!({ "unam_or_mail": "b@x.io", "amount": 1 }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    for (query, expected) in [("", 10), ("?page=2", 2), ("?page=3", 0), ("?page=0", 0)] {
        let res = client
            .get(srv.url(&format!("/users/transactions{query}")))
            .bearer_auth(&alice)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["transactions"].as_array().unwrap().len(), expected, "query {query}");
    }
}

#[tokio::test]
async fn unknown_routes_use_the_envelope() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/nope")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "resource not found");
}

//! Router-level tests against an in-memory store.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use softmax_api::auth::JwtManager;
use softmax_api::{build_router, AppConfig, AppState, Backend};
use softmax_db::{Database, DbConfig};
use tower::ServiceExt;

// =============================================================================
// Helpers
// =============================================================================

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let backend = Backend::new(db, JwtManager::new("test-service-key", 3600));
    build_router(AppState::new(AppConfig::default(), Some(backend)))
}

struct Reply {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

/// Signs up a fresh account and returns its token.
async fn sign_up(app: &Router, name: &str, email: &str) -> String {
    let reply = send(
        app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": "segredo123",
            "confirm_password": "segredo123",
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());
    reply.json()["token"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, token: &str, name: &str, price_cents: i64, stock: i64) -> String {
    let reply = send(
        app,
        Method::POST,
        "/products",
        Some(token),
        Some(json!({ "name": name, "price_cents": price_cents, "stock": stock })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());
    reply.json()["id"].as_str().unwrap().to_string()
}

async fn add_to_cart(app: &Router, token: &str, product_id: &str) -> Reply {
    send(
        app,
        Method::POST,
        "/cart/items",
        Some(token),
        Some(json!({ "product_id": product_id })),
    )
    .await
}

// =============================================================================
// Service configuration
// =============================================================================

#[tokio::test]
async fn test_unconfigured_server_answers_health_and_503() {
    let app = build_router(AppState::new(AppConfig::default(), None));

    let reply = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["configured"], false);

    let reply = send(&app, Method::GET, "/products", None, None).await;
    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(reply.json()["code"], "SERVICE_NOT_CONFIGURED");

    let reply = send(&app, Method::GET, "/settings", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["store_name"], "SoftMax Sales");
}

#[tokio::test]
async fn test_health_reports_database() {
    let app = app().await;
    let reply = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(reply.json()["configured"], true);
    assert_eq!(reply.json()["database"], true);
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_sign_up_sign_in_and_sign_out() {
    let app = app().await;
    let token = sign_up(&app, "Ana Machava", "Ana@SoftMax.co.mz").await;

    let reply = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["email"], "ana@softmax.co.mz");

    let reply = send(
        &app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": "ana@softmax.co.mz", "password": "errada" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = send(
        &app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": "ninguem@softmax.co.mz", "password": "segredo123" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["message"], "Invalid email or password");

    let reply = send(
        &app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": "ana@softmax.co.mz", "password": "segredo123" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let second = reply.json()["token"].as_str().unwrap().to_string();

    let reply = send(&app, Method::POST, "/auth/sign-out", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    let reply = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["code"], "UNAUTHORIZED");

    // Other sessions of the same account are unaffected.
    let reply = send(&app, Method::GET, "/auth/me", Some(&second), None).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_sign_up_validation() {
    let app = app().await;

    let reply = send(
        &app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({
            "name": "Ana",
            "email": "ana@softmax.co.mz",
            "password": "segredo123",
            "confirm_password": "segredo124",
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["code"], "VALIDATION_ERROR");

    let reply = send(
        &app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({
            "name": "Ana",
            "email": "ana@softmax.co.mz",
            "password": "12345",
            "confirm_password": "12345",
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    sign_up(&app, "Ana", "ana@softmax.co.mz").await;
    let reply = send(
        &app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({
            "name": "Outra Ana",
            "email": "ana@softmax.co.mz",
            "password": "segredo123",
            "confirm_password": "segredo123",
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_profile_and_password_updates() {
    let app = app().await;
    let token = sign_up(&app, "Ana", "ana@softmax.co.mz").await;

    let reply = send(
        &app,
        Method::PUT,
        "/auth/profile",
        Some(&token),
        Some(json!({ "name": "Ana Maria", "email": "ana.maria@softmax.co.mz", "avatar_url": "" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["name"], "Ana Maria");
    assert_eq!(reply.json()["avatar_url"], Value::Null);

    let reply = send(
        &app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": "ana.maria@softmax.co.mz", "password": "segredo123" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let other = reply.json()["token"].as_str().unwrap().to_string();

    let reply = send(
        &app,
        Method::PUT,
        "/auth/password",
        Some(&token),
        Some(json!({ "new_password": "novasenha", "confirm_password": "novasenha" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    // The session that changed the password survives, the others are signed out.
    let reply = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = send(&app, Method::GET, "/auth/me", Some(&other), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = send(
        &app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": "ana.maria@softmax.co.mz", "password": "novasenha" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = app().await;
    for uri in ["/auth/me", "/products", "/cart", "/reports/sales"] {
        let reply = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let reply = send(&app, Method::GET, "/cart", Some("not.a.jwt"), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_product_crud_and_validation() {
    let app = app().await;
    let token = sign_up(&app, "Ana", "ana@softmax.co.mz").await;

    let reply = send(
        &app,
        Method::POST,
        "/products",
        Some(&token),
        Some(json!({ "name": "  ", "price_cents": 1000 })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(
        &app,
        Method::POST,
        "/products",
        Some(&token),
        Some(json!({ "name": "Pão", "price_cents": 0 })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let id = create_product(&app, &token, "Pão Francês", 1000, 10).await;
    create_product(&app, &token, "Leite UHT 1L", 8000, 0).await;

    let reply = send(&app, Method::GET, "/products?in_stock=true", Some(&token), None).await;
    assert_eq!(reply.json().as_array().unwrap().len(), 1);

    let reply = send(&app, Method::GET, "/products?search=LEITE", Some(&token), None).await;
    let found = reply.json();
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["name"], "Leite UHT 1L");

    let reply = send(
        &app,
        Method::PUT,
        &format!("/products/{}", id),
        Some(&token),
        Some(json!({ "name": "Pão Francês", "price_cents": 1200, "stock": 8 })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["price_cents"], 1200);

    let reply = send(&app, Method::DELETE, &format!("/products/{}", id), Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    let reply = send(&app, Method::GET, &format!("/products/{}", id), Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_category_is_a_conflict() {
    let app = app().await;
    let token = sign_up(&app, "Ana", "ana@softmax.co.mz").await;

    let body = json!({ "name": "Bebidas" });
    let reply = send(&app, Method::POST, "/categories", Some(&token), Some(body.clone())).await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let reply = send(&app, Method::POST, "/categories", Some(&token), Some(body)).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.json()["code"], "CONFLICT");
}

// =============================================================================
// Cart and checkout
// =============================================================================

#[tokio::test]
async fn test_cart_checkout_and_reports() {
    let app = app().await;
    let token = sign_up(&app, "Ana Machava", "ana@softmax.co.mz").await;
    let a = create_product(&app, &token, "Arroz 5kg", 15000, 5).await;
    let b = create_product(&app, &token, "Açúcar 2kg", 3000, 10).await;

    add_to_cart(&app, &token, &a).await;
    add_to_cart(&app, &token, &a).await;
    let reply = add_to_cart(&app, &token, &b).await;
    assert_eq!(reply.status, StatusCode::OK);
    let cart = reply.json();
    assert_eq!(cart["total_cents"], 33000);
    assert_eq!(cart["total_display"], "MZN 330.00");
    assert_eq!(cart["item_count"], 2);

    let reply = send(&app, Method::GET, "/cart/receipt?payment_method=card", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let html = reply.text();
    assert!(html.contains("2x MZN 150.00"));
    assert!(html.contains("Cartão"));
    assert!(html.contains("window.print()"));

    let reply = send(
        &app,
        Method::POST,
        "/checkout",
        Some(&token),
        Some(json!({ "payment_method": "cash" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());
    let outcome = reply.json();
    assert_eq!(outcome["sale"]["total_cents"], 33000);
    assert_eq!(outcome["sale"]["payment_method"], "cash");
    assert_eq!(outcome["items"].as_array().unwrap().len(), 2);
    assert!(outcome["receipt_html"].as_str().unwrap().contains("Operador: Ana Machava"));

    let arroz = outcome["products"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == a.as_str())
        .unwrap();
    assert_eq!(arroz["stock"], 3);

    let reply = send(&app, Method::GET, "/cart", Some(&token), None).await;
    assert_eq!(reply.json()["item_count"], 0);

    let reply = send(
        &app,
        Method::POST,
        "/checkout",
        Some(&token),
        Some(json!({ "payment_method": "cash" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.json()["code"], "EMPTY_CART");

    let reply = send(&app, Method::GET, "/reports/sales", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let report = reply.json();
    assert_eq!(report["total_sales_cents"], 33000);
    assert_eq!(report["total_transactions"], 1);
    assert_eq!(report["total_items"], 3);
    assert_eq!(report["average_ticket_cents"], 33000);
    assert_eq!(report["top_products"][0]["name"], "Arroz 5kg");
    assert_eq!(report["recent_sales"].as_array().unwrap().len(), 1);

    let reply = send(&app, Method::GET, "/reports/sales.csv", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(reply.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("relatorio-vendas-"));
    let csv = reply.text();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], "Data,Total,Forma de Pagamento,Itens");
    assert!(rows[1].ends_with(",R$ 330.00,Dinheiro,2"));
}

#[tokio::test]
async fn test_quantity_above_stock_is_rejected() {
    let app = app().await;
    let token = sign_up(&app, "Ana", "ana@softmax.co.mz").await;
    let id = create_product(&app, &token, "Bolo de Chocolate", 35000, 2).await;

    add_to_cart(&app, &token, &id).await;
    let reply = send(
        &app,
        Method::PUT,
        &format!("/cart/items/{}", id),
        Some(&token),
        Some(json!({ "quantity": 3 })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.json()["code"], "INSUFFICIENT_STOCK");

    let reply = send(
        &app,
        Method::PUT,
        &format!("/cart/items/{}", id),
        Some(&token),
        Some(json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["item_count"], 0);

    let reply = send(&app, Method::GET, "/cart/receipt", Some(&token), None).await;
    assert_eq!(reply.json()["code"], "EMPTY_CART");
}

#[tokio::test]
async fn test_last_unit_goes_to_first_checkout() {
    let app = app().await;
    let ana = sign_up(&app, "Ana", "ana@softmax.co.mz").await;
    let rui = sign_up(&app, "Rui", "rui@softmax.co.mz").await;
    let id = create_product(&app, &ana, "Queijo Flamengo 200g", 22000, 1).await;

    assert_eq!(add_to_cart(&app, &ana, &id).await.status, StatusCode::OK);
    assert_eq!(add_to_cart(&app, &rui, &id).await.status, StatusCode::OK);

    let checkout = json!({ "payment_method": "transfer" });
    let reply = send(&app, Method::POST, "/checkout", Some(&rui), Some(checkout.clone())).await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let reply = send(&app, Method::POST, "/checkout", Some(&ana), Some(checkout)).await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.json()["code"], "INSUFFICIENT_STOCK");

    // The failed checkout keeps the cart.
    let reply = send(&app, Method::GET, "/cart", Some(&ana), None).await;
    assert_eq!(reply.json()["item_count"], 1);

    let reply = send(&app, Method::GET, "/reports/sales", Some(&ana), None).await;
    assert_eq!(reply.json()["total_transactions"], 1);
}

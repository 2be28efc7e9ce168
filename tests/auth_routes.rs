use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::json;
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

use movie_api::{
    auth::{Claims, Role, jwt::now_unix, password::hash_password},
    db::entities::user,
    test_helpers::{router_with_db, test_router},
};

const SECRET: &[u8] = b"test-secret";

fn bearer(role: Role) -> String {
    let iat = now_unix();
    let claims = Claims {
        sub: Uuid::new_v4(),
        name: "tester".into(),
        role,
        iat,
        exp: iat + 3600,
    };

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());
    let token = encode(&header, &claims, &EncodingKey::from_secret(SECRET)).unwrap();
    format!("Bearer {token}")
}

async fn json_response(
    app: axum::Router,
    request: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

fn stored_user(name: &str, password: &str, role: Role) -> user::Model {
    user::Model {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{name}@example.com"),
        password_hash: hash_password(password).expect("hash password"),
        role: role.as_str().to_string(),
        created_at: Utc::now().fixed_offset(),
    }
}

#[tokio::test]
async fn health_route_works() {
    let app = test_router(SECRET);

    let res = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let (status, json) = json_response(
        test_router(SECRET),
        Request::builder()
            .method("POST")
            .uri("/users/register")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "name": "alice", "email": "not-an-email", "password": "secret1" })
                    .to_string(),
            ))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid email format.");
}

#[tokio::test]
async fn register_rejects_short_password() {
    // Name and email uniqueness checks run before the password is hashed.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new(), Vec::<user::Model>::new()])
        .into_connection();

    let (status, json) = json_response(
        router_with_db(SECRET, db),
        Request::builder()
            .method("POST")
            .uri("/users/register")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "name": "alice", "email": "alice@example.com", "password": "abc" })
                    .to_string(),
            ))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Password must be at least 6 characters.");
}

#[tokio::test]
async fn register_rejects_duplicate_name() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored_user("alice", "secret1", Role::User)]])
        .into_connection();

    let (status, json) = json_response(
        router_with_db(SECRET, db),
        Request::builder()
            .method("POST")
            .uri("/users/register")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "name": "alice", "email": "other@example.com", "password": "secret1" })
                    .to_string(),
            ))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "Name already exists");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    // Name is free, email is taken
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![], vec![stored_user("bob", "secret1", Role::User)]])
        .into_connection();

    let (status, json) = json_response(
        router_with_db(SECRET, db),
        Request::builder()
            .method("POST")
            .uri("/users/register")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "name": "alice", "email": "bob@example.com", "password": "secret1" })
                    .to_string(),
            ))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "Email already exists");
}

#[tokio::test]
async fn login_unknown_name_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let (status, json) = json_response(
        router_with_db(SECRET, db),
        Request::builder()
            .method("POST")
            .uri("/users/login")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "name": "ghost", "password": "whatever1" }).to_string(),
            ))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_wrong_password_matches_unknown_name_failure() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored_user("alice", "right-password", Role::User)]])
        .into_connection();

    let (status, json) = json_response(
        router_with_db(SECRET, db),
        Request::builder()
            .method("POST")
            .uri("/users/login")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "name": "alice", "password": "wrong-password" }).to_string(),
            ))
            .unwrap(),
    )
    .await;

    // Indistinguishable from the unknown-name case
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_returns_token_and_profile() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored_user("alice", "secret1", Role::User)]])
        .into_connection();

    let (status, json) = json_response(
        router_with_db(SECRET, db),
        Request::builder()
            .method("POST")
            .uri("/users/login")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "name": "alice", "password": "secret1" }).to_string(),
            ))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["token"].as_str().is_some());
    assert_eq!(json["name"], "alice");
    assert_eq!(json["role"], "user");
}

#[tokio::test]
async fn create_movie_without_token_is_rejected() {
    let (status, json) = json_response(
        test_router(SECRET),
        Request::builder()
            .method("POST")
            .uri("/movies")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "title": "Inception", "description": "Dreams" }).to_string(),
            ))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Missing/invalid Authorization header");
}

#[tokio::test]
async fn create_movie_requires_admin_role() {
    let res = test_router(SECRET)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/movies")
                .header("authorization", bearer(Role::User))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "title": "Inception", "description": "Dreams" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn get_user_requires_admin_role() {
    let res = test_router(SECRET)
        .oneshot(
            Request::builder()
                .uri(format!("/users/{}", Uuid::new_v4()))
                .header("authorization", bearer(Role::User))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn update_review_without_token_is_rejected() {
    let (status, json) = json_response(
        test_router(SECRET),
        Request::builder()
            .method("PUT")
            .uri(format!("/reviews/{}", Uuid::new_v4()))
            .header("content-type", "application/json")
            .body(Body::from(json!({ "rating": 4 }).to_string()))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Missing/invalid Authorization header");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let iat = now_unix() - 7200;
    let claims = Claims {
        sub: Uuid::new_v4(),
        name: "tester".into(),
        role: Role::User,
        iat,
        exp: iat + 60,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    let (status, json) = json_response(
        test_router(SECRET),
        Request::builder()
            .method("PUT")
            .uri(format!("/reviews/{}", Uuid::new_v4()))
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(json!({ "rating": 4 }).to_string()))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid or expired token");
}

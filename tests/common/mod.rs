#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use cinema_api::auth;
use cinema_api::config::AppConfig;
use cinema_api::routes::build_router;
use cinema_api::state::AppState;
use cinema_api::store::{Document, MemoryStore};

/// Router over a fresh in-memory store. Cloning the router shares the
/// store, so one TestApp is one isolated deployment.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn test_app() -> TestApp {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "test-secret".to_string();
    // Minimum bcrypt cost; hashing dominates test time otherwise
    config.security.bcrypt_cost = 4;

    let state = AppState::new(Arc::new(MemoryStore::new()), config);
    TestApp { router: build_router(state.clone()), state }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value =
            if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.request("GET", path, None, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request("POST", path, None, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request("PUT", path, None, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.request("DELETE", path, None, None).await
    }
}

/// Pulls `data.id` out of a create response
pub fn created_id(body: &Value) -> String {
    body["data"]["id"].as_str().unwrap_or_default().to_string()
}

pub async fn seed_genre(app: &TestApp, name: &str) -> Result<String> {
    let (status, body) = app
        .post("/api/v1/genres", json!({ "name": name, "description": "seeded" }))
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "genre seed failed: {}", body);
    Ok(created_id(&body))
}

pub async fn seed_movie_type(app: &TestApp, name: &str) -> Result<String> {
    let (status, body) = app
        .post("/api/v1/movie-types", json!({ "name": name, "description": "seeded" }))
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "movie type seed failed: {}", body);
    Ok(created_id(&body))
}

pub async fn seed_movie(
    app: &TestApp,
    title: &str,
    ticket_price: f64,
    genre_id: &str,
    movie_type_id: &str,
) -> Result<String> {
    let (status, body) = app
        .post(
            "/api/v1/movies",
            json!({
                "title": title,
                "description": "seeded",
                "ticketPrice": ticket_price,
                "durationInMinutes": 120,
                "releasedDate": "2024-06-01",
                "genreIds": [genre_id],
                "movieTypeId": movie_type_id,
            }),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "movie seed failed: {}", body);
    Ok(created_id(&body))
}

pub async fn seed_cinema(app: &TestApp, name: &str) -> Result<String> {
    let (status, body) = app
        .post("/api/v1/cinemas", json!({ "name": name, "address": "1 Main Street" }))
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "cinema seed failed: {}", body);
    Ok(created_id(&body))
}

pub async fn seed_hall_type(app: &TestApp, name: &str) -> Result<String> {
    let (status, body) = app
        .post("/api/v1/hall-types", json!({ "name": name, "description": "seeded" }))
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "hall type seed failed: {}", body);
    Ok(created_id(&body))
}

pub async fn seed_hall(
    app: &TestApp,
    cinema_id: &str,
    hall_type_id: &str,
    name: &str,
) -> Result<String> {
    let (status, body) = app
        .post(
            &format!("/api/v1/cinemas/{}/halls", cinema_id),
            json!({
                "name": name,
                "seatRows": ["A", "B", "C"],
                "seatColumns": ["1", "2", "3"],
                "hallTypeId": hall_type_id,
            }),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "hall seed failed: {}", body);
    Ok(created_id(&body))
}

pub async fn seed_showtime(
    app: &TestApp,
    movie_id: &str,
    hall_id: &str,
    started: &str,
) -> Result<String> {
    let (status, body) = app
        .post(
            "/api/v1/showtimes",
            json!({ "startedDateTime": started, "movieId": movie_id, "hallId": hall_id }),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "showtime seed failed: {}", body);
    Ok(created_id(&body))
}

pub async fn register(
    app: &TestApp,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Value> {
    let (status, body) = app
        .post(
            "/api/v1/auth/register",
            json!({ "name": name, "email": email, "password": password }),
        )
        .await?;
    anyhow::ensure!(status == StatusCode::OK, "registration failed: {}", body);
    Ok(body)
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> Result<String> {
    let (status, body) = app
        .post("/api/v1/auth/login", json!({ "email": email, "password": password }))
        .await?;
    anyhow::ensure!(status == StatusCode::OK, "login failed: {}", body);
    Ok(body["data"]["token"].as_str().unwrap_or_default().to_string())
}

/// Registers through the API and returns a ready-to-use bearer token
pub async fn customer_token(app: &TestApp, name: &str, email: &str) -> Result<String> {
    register(app, name, email, "customer-pass").await?;
    login(app, email, "customer-pass").await
}

/// Admins cannot be created through registration, so this one goes straight
/// into the store.
pub async fn admin_token(app: &TestApp, email: &str) -> Result<String> {
    let hash = auth::hash_password("admin-pass", app.state.config.security.bcrypt_cost)?;
    let mut doc = Map::new();
    doc.insert("name".to_string(), json!(format!("admin {}", email)));
    doc.insert("email".to_string(), json!(email));
    doc.insert("password".to_string(), json!(hash));
    doc.insert("role".to_string(), json!("admin"));
    app.state.store.insert("users", Document::from(doc)).await?;

    login(app, email, "admin-pass").await
}

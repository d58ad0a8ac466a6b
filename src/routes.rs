use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::middleware::{auth_middleware, require_admin};
use crate::entities::{
    announcements, cinemas, countries, genres, hall_types, halls, languages, memberships,
    movie_types, movies, purchases, settings, showtimes, users, EntitySpec,
};
use crate::error::ApiError;
use crate::handlers::{
    announcements as announcement_handlers, auth as auth_handlers, crud,
    purchases as purchase_handlers, system, users as user_handlers,
};
use crate::pipeline::ListParams;
use crate::state::AppState;

type PathParams = Path<HashMap<String, String>>;
type JsonBody = Result<Json<Value>, JsonRejection>;

/// Assembles the application router: resource routes, auth gating where a
/// resource needs it, CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Resource routes
        .merge(catalog_routes())
        .merge(movie_routes())
        .merge(cinema_routes())
        .merge(site_routes())
        // Authenticated surface
        .merge(auth_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(purchase_routes(state.clone()))
        // Unmatched paths still answer with the envelope
        .fallback(not_found)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .merge(crud_routes("/api/v1/genres", &genres::SPEC))
        .route("/api/v1/genres/:genreId/movies", list_method(&movies::SPEC))
        .merge(crud_routes("/api/v1/movie-types", &movie_types::SPEC))
        .route("/api/v1/movie-types/:movieTypeId/movies", list_method(&movies::SPEC))
        .merge(crud_routes("/api/v1/languages", &languages::SPEC))
        .merge(crud_routes("/api/v1/countries", &countries::SPEC))
}

fn movie_routes() -> Router<AppState> {
    Router::new()
        .merge(crud_routes("/api/v1/movies", &movies::SPEC))
        .route("/api/v1/movies/:movieId/showtimes", list_method(&showtimes::SPEC))
        .merge(crud_routes("/api/v1/showtimes", &showtimes::SPEC))
}

fn cinema_routes() -> Router<AppState> {
    Router::new()
        .merge(crud_routes("/api/v1/cinemas", &cinemas::SPEC))
        // Halls are created under their cinema; the path id becomes the
        // hall's cinema reference
        .route("/api/v1/cinemas/:cinemaId/halls", collection_methods(&halls::SPEC))
        .route("/api/v1/halls", list_method(&halls::SPEC))
        .route("/api/v1/halls/:hallId", item_methods(&halls::SPEC))
        .merge(crud_routes("/api/v1/hall-types", &hall_types::SPEC))
        .route("/api/v1/hall-types/:hallTypeId/halls", list_method(&halls::SPEC))
}

fn site_routes() -> Router<AppState> {
    Router::new()
        .merge(crud_routes("/api/v1/settings", &settings::SPEC))
        .route(
            "/api/v1/announcements",
            list_method(&announcements::SPEC).post(announcement_handlers::create),
        )
        .route("/api/v1/announcements/:announcementId", item_methods(&announcements::SPEC))
        .merge(crud_routes("/api/v1/memberships", &memberships::SPEC))
}

fn auth_routes(state: AppState) -> Router<AppState> {
    let gated = Router::new()
        .route("/api/v1/auth/change-password", post(auth_handlers::change_password))
        .route("/api/v1/auth/me", get(auth_handlers::me))
        .layer(from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/api/v1/auth/register", post(auth_handlers::register))
        .route("/api/v1/auth/login", post(auth_handlers::login))
        .merge(gated)
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/users", list_method(&users::SPEC).post(user_handlers::create))
        .route(
            "/api/v1/users/:userId",
            get(|state: State<AppState>, params: PathParams| crud::get(&users::SPEC, state, params))
                .put(user_handlers::update)
                .delete(|state: State<AppState>, params: PathParams| {
                    crud::remove(&users::SPEC, state, params)
                }),
        )
        // Outermost layer runs first, so tokens are checked before roles
        .layer(from_fn(require_admin))
        .layer(from_fn_with_state(state, auth_middleware))
}

fn purchase_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/purchases",
            get(purchase_handlers::list).post(purchase_handlers::create),
        )
        .route(
            "/api/v1/purchases/:purchaseId",
            get(purchase_handlers::get).delete(purchase_handlers::remove),
        )
        .layer(from_fn_with_state(state, auth_middleware))
}

/// Collection + item routes for an entity served entirely by the generic
/// handlers.
fn crud_routes(base: &str, spec: &'static EntitySpec) -> Router<AppState> {
    Router::new()
        .route(base, collection_methods(spec))
        .route(&format!("{}/:{}", base, spec.id_param), item_methods(spec))
}

fn list_method(spec: &'static EntitySpec) -> MethodRouter<AppState> {
    get(move |state: State<AppState>, params: PathParams, query: Query<ListParams>| {
        crud::list(spec, state, params, query)
    })
}

fn collection_methods(spec: &'static EntitySpec) -> MethodRouter<AppState> {
    list_method(spec).post(move |state: State<AppState>, params: PathParams, body: JsonBody| {
        crud::create(spec, state, params, body)
    })
}

fn item_methods(spec: &'static EntitySpec) -> MethodRouter<AppState> {
    get(move |state: State<AppState>, params: PathParams| crud::get(spec, state, params))
        .put(move |state: State<AppState>, params: PathParams, body: JsonBody| {
            crud::update(spec, state, params, body)
        })
        .delete(move |state: State<AppState>, params: PathParams| {
            crud::remove(spec, state, params)
        })
}

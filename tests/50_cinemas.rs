mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn cinema_names_need_five_characters_and_get_a_default_photo() -> Result<()> {
    let app = common::test_app();

    let (status, body) = app
        .post("/api/v1/cinemas", json!({ "name": "abc", "address": "1 Main Street" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("\"name\" length must be at least 5 characters long"));

    let (status, body) = app
        .post("/api/v1/cinemas", json!({ "name": "Delee Cinema", "address": "1 Main Street" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["photo"], json!("no-photo.jpg"));
    Ok(())
}

#[tokio::test]
async fn halls_are_created_under_their_cinema() -> Result<()> {
    let app = common::test_app();
    let cinema = common::seed_cinema(&app, "Delee Cinema").await?;
    let hall_type = common::seed_hall_type(&app, "IMAX").await?;

    let (status, body) = app
        .post(
            &format!("/api/v1/cinemas/{}/halls", cinema),
            json!({
                "name": "Grand Hall",
                "seatRows": ["A", "B"],
                "seatColumns": ["1", "2"],
                "hallTypeId": hall_type,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], json!("Hall is created successfully"));
    assert_eq!(body["data"]["cinema"], json!(cinema));
    assert_eq!(body["data"]["hallType"], json!(hall_type));
    assert_eq!(body["data"]["locationImage"], json!("no-photo.jpg"));
    Ok(())
}

#[tokio::test]
async fn hall_creation_rejects_body_cinema_ids_and_unknown_cinemas() -> Result<()> {
    let app = common::test_app();
    let cinema = common::seed_cinema(&app, "Delee Cinema").await?;
    let hall_type = common::seed_hall_type(&app, "IMAX").await?;

    // The cinema comes from the path, not the body
    let (status, body) = app
        .post(
            &format!("/api/v1/cinemas/{}/halls", cinema),
            json!({
                "name": "Grand Hall",
                "seatRows": ["A"],
                "seatColumns": ["1"],
                "hallTypeId": hall_type,
                "cinemaId": cinema,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("\"cinemaId\" is not allowed"));

    let ghost = Uuid::new_v4();
    let (status, body) = app
        .post(
            &format!("/api/v1/cinemas/{}/halls", ghost),
            json!({
                "name": "Grand Hall",
                "seatRows": ["A"],
                "seatColumns": ["1"],
                "hallTypeId": hall_type,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        json!(format!("Cinema with given ID ({}) is not found", ghost))
    );
    Ok(())
}

#[tokio::test]
async fn hall_names_are_unique() -> Result<()> {
    let app = common::test_app();
    let cinema = common::seed_cinema(&app, "Delee Cinema").await?;
    let other = common::seed_cinema(&app, "Other Cinema").await?;
    let hall_type = common::seed_hall_type(&app, "IMAX").await?;
    common::seed_hall(&app, &cinema, &hall_type, "Grand Hall").await?;

    let (status, body) = app
        .post(
            &format!("/api/v1/cinemas/{}/halls", other),
            json!({
                "name": "Grand Hall",
                "seatRows": ["A"],
                "seatColumns": ["1"],
                "hallTypeId": hall_type,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Duplicate value entered for name field"));
    Ok(())
}

#[tokio::test]
async fn hall_listings_scope_to_cinema_and_hall_type() -> Result<()> {
    let app = common::test_app();
    let delee = common::seed_cinema(&app, "Delee Cinema").await?;
    let other = common::seed_cinema(&app, "Other Cinema").await?;
    let imax = common::seed_hall_type(&app, "IMAX").await?;
    let standard = common::seed_hall_type(&app, "Standard").await?;
    common::seed_hall(&app, &delee, &imax, "Grand Hall").await?;
    common::seed_hall(&app, &other, &standard, "Small Hall").await?;

    let (_, body) = app.get("/api/v1/halls").await?;
    assert_eq!(body["data"]["records"].as_array().map(Vec::len), Some(2));

    let (_, body) = app.get(&format!("/api/v1/cinemas/{}/halls", delee)).await?;
    let records = body["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], json!("Grand Hall"));
    // Populated on reads
    assert_eq!(records[0]["cinema"]["name"], json!("Delee Cinema"));
    assert_eq!(records[0]["hallType"]["name"], json!("IMAX"));

    let (_, body) = app.get(&format!("/api/v1/hall-types/{}/halls", standard)).await?;
    let records = body["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], json!("Small Hall"));
    Ok(())
}

#[tokio::test]
async fn hall_updates_may_move_them_between_cinemas() -> Result<()> {
    let app = common::test_app();
    let delee = common::seed_cinema(&app, "Delee Cinema").await?;
    let other = common::seed_cinema(&app, "Other Cinema").await?;
    let imax = common::seed_hall_type(&app, "IMAX").await?;
    let hall = common::seed_hall(&app, &delee, &imax, "Grand Hall").await?;

    let (status, body) = app
        .put(&format!("/api/v1/halls/{}", hall), json!({ "cinemaId": other }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cinema"], json!(other));

    let ghost = Uuid::new_v4().to_string();
    let (status, body) = app
        .put(&format!("/api/v1/halls/{}", hall), json!({ "hallTypeId": ghost }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        json!(format!("Hall type with given ID ({}) is not found", ghost))
    );
    Ok(())
}

#[tokio::test]
async fn showtimes_nest_under_movies() -> Result<()> {
    let app = common::test_app();
    let genre = common::seed_genre(&app, "Drama").await?;
    let movie_type = common::seed_movie_type(&app, "2D").await?;
    let movie = common::seed_movie(&app, "Arrival", 6.0, &genre, &movie_type).await?;
    let second = common::seed_movie(&app, "Dune", 8.0, &genre, &movie_type).await?;
    let cinema = common::seed_cinema(&app, "Delee Cinema").await?;
    let hall_type = common::seed_hall_type(&app, "IMAX").await?;
    let hall = common::seed_hall(&app, &cinema, &hall_type, "Grand Hall").await?;

    common::seed_showtime(&app, &movie, &hall, "2030-05-01T19:30:00Z").await?;
    common::seed_showtime(&app, &second, &hall, "2030-05-01T21:30:00Z").await?;

    let (status, body) = app.get(&format!("/api/v1/movies/{}/showtimes", movie)).await?;
    assert_eq!(status, StatusCode::OK);
    let records = body["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["movie"]["title"], json!("Arrival"));
    assert_eq!(records[0]["hall"]["name"], json!("Grand Hall"));

    let ghost = Uuid::new_v4();
    let (status, _) = app.get(&format!("/api/v1/movies/{}/showtimes", ghost)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn showtime_creation_checks_movie_and_hall() -> Result<()> {
    let app = common::test_app();
    let genre = common::seed_genre(&app, "Drama").await?;
    let movie_type = common::seed_movie_type(&app, "2D").await?;
    let movie = common::seed_movie(&app, "Arrival", 6.0, &genre, &movie_type).await?;

    let ghost = Uuid::new_v4().to_string();
    let (status, body) = app
        .post(
            "/api/v1/showtimes",
            json!({
                "startedDateTime": "2030-05-01T19:30:00Z",
                "movieId": movie,
                "hallId": ghost,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        json!(format!("Hall with given ID ({}) is not found", ghost))
    );

    let (status, body) = app
        .post(
            "/api/v1/showtimes",
            json!({ "movieId": movie, "hallId": ghost }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("\"startedDateTime\" is required"));
    Ok(())
}

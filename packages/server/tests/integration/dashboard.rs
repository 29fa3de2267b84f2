use chrono::NaiveDate;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn counts_are_cached_until_refresh() {
    let app = TestApp::spawn().await;
    let cinema = app.insert_cinema("Grand").await;
    let category = app.insert_category("Drama").await;
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    app.insert_movie("First", start, cinema, category).await;

    let first = app.get(routes::DASHBOARD).await;
    assert_eq!(first.status, 200, "{}", first.text);
    assert_eq!(first.body["movies"], 1);
    assert_eq!(first.body["categories"], 1);
    assert_eq!(first.body["users"], 0);
    assert_eq!(first.body["bookings"], 0);
    assert_eq!(first.body["showtimes"], 0);

    app.insert_movie("Second", start, cinema, category).await;
    app.insert_user("new@example.com").await;

    let cached = app.get(routes::DASHBOARD).await;
    assert_eq!(cached.body["movies"], 1);
    assert_eq!(cached.body["users"], 0);

    let refreshed = app
        .get(&format!("{}?refresh=true", routes::DASHBOARD))
        .await;
    assert_eq!(refreshed.body["movies"], 2);
    assert_eq!(refreshed.body["users"], 1);
}

#[tokio::test]
async fn zero_ttl_always_recomputes() {
    let app = TestApp::spawn_with(|config| config.dashboard.ttl_secs = 0).await;
    let cinema = app.insert_cinema("Grand").await;
    let category = app.insert_category("Drama").await;
    let movie = app
        .insert_movie(
            "Counted",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            cinema,
            category,
        )
        .await;

    assert_eq!(app.get(routes::DASHBOARD).await.body["showtimes"], 0);

    app.insert_showtime(movie, cinema, rust_decimal::Decimal::new(900, 2))
        .await;
    let user = app.insert_user("fan@example.com").await;
    app.insert_booking(movie, cinema, user).await;

    let stats = app.get(routes::DASHBOARD).await;
    assert_eq!(stats.body["showtimes"], 1);
    assert_eq!(stats.body["bookings"], 1);
}

use common::{FileStore, UploadPolicy, UploadedFile};

use crate::common::{TestApp, image_part, movie_form, routes};

async fn put_orphan(app: &TestApp, folder: &str) -> String {
    app.files
        .put(
            &UploadedFile::new("stray.jpg", vec![1u8; 8]),
            &UploadPolicy::default(),
            folder,
        )
        .await
        .expect("put orphan")
}

#[tokio::test]
async fn removes_unreferenced_files_past_the_grace_period() {
    let app = TestApp::spawn_with(|config| config.storage.orphan_grace_secs = 0).await;
    let cinema = app.insert_cinema("Grand").await;
    let category = app.insert_category("Drama").await;

    let created = app
        .post_form(
            routes::MOVIES,
            movie_form("Kept", cinema, category).part("poster", image_part("p.jpg", 8)),
        )
        .await;
    assert_eq!(created.status, 201, "{}", created.text);
    let poster = created.body["img_url"].as_str().unwrap().to_string();
    let orphan_movie = put_orphan(&app, "movies").await;
    let orphan_cinema = put_orphan(&app, "cinemas").await;

    let dry = app
        .post_json(&format!("{}?dry_run=true", routes::SWEEP), &serde_json::json!({}))
        .await;
    assert_eq!(dry.status, 200, "{}", dry.text);
    assert_eq!(dry.body["dry_run"], true);
    assert_eq!(dry.body["scanned"], 3);
    assert_eq!(dry.body["orphans"].as_array().unwrap().len(), 2);
    assert!(app.file_on_disk(&orphan_movie).exists());

    let res = app.post_json(routes::SWEEP, &serde_json::json!({})).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["orphans"].as_array().unwrap().len(), 2);
    assert!(res.body["failed"].as_array().unwrap().is_empty());

    assert!(!app.file_on_disk(&orphan_movie).exists());
    assert!(!app.file_on_disk(&orphan_cinema).exists());
    assert!(app.file_on_disk(&poster).exists());
    assert_eq!(app.stored_files(), vec![poster]);
}

#[tokio::test]
async fn recent_orphans_survive() {
    let app = TestApp::spawn().await;
    let orphan = put_orphan(&app, "movies").await;

    let res = app.post_json(routes::SWEEP, &serde_json::json!({})).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["recent"], 1);
    assert!(res.body["orphans"].as_array().unwrap().is_empty());
    assert!(app.file_on_disk(&orphan).exists());
}

#[tokio::test]
async fn reports_rows_pointing_at_missing_files() {
    let app = TestApp::spawn_with(|config| config.storage.orphan_grace_secs = 0).await;
    let cinema = app.insert_cinema("Grand").await;
    let category = app.insert_category("Drama").await;

    let created = app
        .post_form(
            routes::MOVIES,
            movie_form("Dangling", cinema, category).part("poster", image_part("p.jpg", 8)),
        )
        .await;
    let poster = created.body["img_url"].as_str().unwrap().to_string();
    std::fs::remove_file(app.file_on_disk(&poster)).unwrap();

    let res = app.post_json(routes::SWEEP, &serde_json::json!({})).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["dangling"][0], poster.as_str());
    assert_eq!(res.body["scanned"], 0);
}

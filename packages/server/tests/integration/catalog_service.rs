use std::collections::BTreeSet;

use chrono::NaiveDate;
use common::{UploadPolicy, UploadedFile};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use tickets_server::catalog::{CatalogError, CatalogService, CreateMovie, MovieFields, UpdateMovie};
use tickets_server::entity::{MovieStatus, movie, movie_actor, movie_image};

use crate::common::{FIVE_MIB, TestApp};

fn fields(title: &str, cinema_id: i32, category_id: i32) -> MovieFields {
    MovieFields {
        title: title.to_string(),
        description: None,
        price: Decimal::new(1250, 2),
        trailer_url: Some("https://example.com/trailer".into()),
        start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        status: MovieStatus::Coming,
        cinema_id,
        category_id,
    }
}

fn file(name: &str, size: usize) -> UploadedFile {
    UploadedFile::new(name, vec![7u8; size])
}

async fn actor_links(app: &TestApp, movie_id: i32) -> BTreeSet<i32> {
    movie_actor::Entity::find()
        .filter(movie_actor::Column::MovieId.eq(movie_id))
        .all(&app.db)
        .await
        .unwrap()
        .into_iter()
        .map(|link| link.actor_id)
        .collect()
}

async fn image_rows(app: &TestApp, movie_id: i32) -> Vec<movie_image::Model> {
    movie_image::Entity::find()
        .filter(movie_image::Column::MovieId.eq(movie_id))
        .order_by_asc(movie_image::Column::Id)
        .all(&app.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn create_persists_fields_images_and_distinct_actors() {
    let app = TestApp::spawn().await;
    let policy = UploadPolicy::default();
    let service = CatalogService::new(&app.db, app.files.as_ref(), &policy);
    let cinema = app.insert_cinema("Grand").await;
    let category = app.insert_category("Drama").await;
    let a1 = app.insert_actor("Amy", "Adams").await;
    let a2 = app.insert_actor("Bill", "Bailey").await;

    let model = service
        .create(CreateMovie {
            fields: fields("Dune", cinema, category),
            poster: Some(file("poster.jpg", 32)),
            images: vec![file("a.jpg", 8), file("empty.jpg", 0), file("b.png", 8)],
            actor_ids: vec![a1, a1, a2],
        })
        .await
        .expect("create");

    assert_eq!(model.title, "Dune");
    assert_eq!(model.price, Decimal::new(1250, 2));
    assert_eq!(model.version, 1);
    assert!(model.img_url.is_some());

    let stored = movie::Entity::find_by_id(model.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tickets_server::catalog::money(stored.price).to_string(), "12.50");
    assert_eq!(stored.status, MovieStatus::Coming);

    assert_eq!(image_rows(&app, model.id).await.len(), 2);
    assert_eq!(actor_links(&app, model.id).await, BTreeSet::from([a1, a2]));
}

#[tokio::test]
async fn validation_failure_writes_nothing() {
    let app = TestApp::spawn().await;
    let policy = UploadPolicy::default();
    let service = CatalogService::new(&app.db, app.files.as_ref(), &policy);
    let cinema = app.insert_cinema("Grand").await;
    let category = app.insert_category("Drama").await;

    let err = service
        .create(CreateMovie {
            fields: fields("Heavy", cinema, category),
            poster: Some(file("ok.jpg", 16)),
            images: vec![file("too-big.jpg", FIVE_MIB + 1)],
            actor_ids: vec![],
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, CatalogError::Validation { field: Some("images"), .. }),
        "{err:?}"
    );
    assert_eq!(movie::Entity::find().count(&app.db).await.unwrap(), 0);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn exact_size_limit_is_accepted() {
    let app = TestApp::spawn().await;
    let policy = UploadPolicy::default();
    let service = CatalogService::new(&app.db, app.files.as_ref(), &policy);
    let cinema = app.insert_cinema("Grand").await;
    let category = app.insert_category("Drama").await;

    let model = service
        .create(CreateMovie {
            fields: fields("Limit", cinema, category),
            poster: None,
            images: vec![file("edge.gif", FIVE_MIB)],
            actor_ids: vec![],
        })
        .await
        .expect("five MiB is within the limit");

    assert_eq!(image_rows(&app, model.id).await.len(), 1);
}

#[tokio::test]
async fn failed_create_removes_files_it_wrote() {
    let app = TestApp::spawn().await;
    let policy = UploadPolicy::default();
    let service = CatalogService::new(&app.db, app.files.as_ref(), &policy);
    let cinema = app.insert_cinema("Grand").await;

    // The category is checked inside the transaction, after validation.
    let err = service
        .create(CreateMovie {
            fields: fields("Orphan", cinema, 999),
            poster: Some(file("p.jpg", 8)),
            images: vec![file("g.jpg", 8)],
            actor_ids: vec![],
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::NotFound(_)), "{err:?}");
    assert_eq!(movie::Entity::find().count(&app.db).await.unwrap(), 0);
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn update_replaces_requested_images_only() {
    let app = TestApp::spawn().await;
    let policy = UploadPolicy::default();
    let service = CatalogService::new(&app.db, app.files.as_ref(), &policy);
    let cinema = app.insert_cinema("Grand").await;
    let category = app.insert_category("Drama").await;

    let created = service
        .create(CreateMovie {
            fields: fields("Gallery", cinema, category),
            poster: None,
            images: vec![file("ten.jpg", 8), file("eleven.jpg", 8)],
            actor_ids: vec![],
        })
        .await
        .unwrap();
    let before = image_rows(&app, created.id).await;
    let (removed, kept) = (&before[0], &before[1]);

    let other = service
        .create(CreateMovie {
            fields: fields("Other", cinema, category),
            poster: None,
            images: vec![file("theirs.jpg", 8)],
            actor_ids: vec![],
        })
        .await
        .unwrap();
    let theirs = image_rows(&app, other.id).await[0].id;

    let updated = service
        .update(
            created.id,
            UpdateMovie {
                fields: fields("Gallery", cinema, category),
                version: Some(created.version),
                poster: None,
                images: vec![file("new.jpg", 8)],
                image_ids_to_delete: vec![removed.id, theirs],
                actor_ids: vec![],
            },
        )
        .await
        .expect("update");

    let after = image_rows(&app, created.id).await;
    let ids: BTreeSet<i32> = after.iter().map(|img| img.id).collect();
    assert_eq!(after.len(), 2);
    assert!(ids.contains(&kept.id));
    assert!(!ids.contains(&removed.id));

    assert_eq!(updated.cleanup.removed, vec![removed.img_url.clone()]);
    assert!(updated.cleanup.is_clean());
    assert_eq!(updated.movie.version, created.version + 1);

    // Another movie's image id is ignored.
    assert_eq!(image_rows(&app, other.id).await.len(), 1);
}

#[tokio::test]
async fn actor_diff_matches_set_arithmetic() {
    let app = TestApp::spawn().await;
    let policy = UploadPolicy::default();
    let service = CatalogService::new(&app.db, app.files.as_ref(), &policy);
    let cinema = app.insert_cinema("Grand").await;
    let category = app.insert_category("Drama").await;
    let a = app.insert_actor("A", "One").await;
    let b = app.insert_actor("B", "Two").await;
    let c = app.insert_actor("C", "Three").await;
    let d = app.insert_actor("D", "Four").await;

    let created = service
        .create(CreateMovie {
            fields: fields("Diff", cinema, category),
            poster: None,
            images: vec![],
            actor_ids: vec![a, b, d],
        })
        .await
        .unwrap();

    // Remove {a, b}, add {c}, keep {d}.
    service
        .update(
            created.id,
            UpdateMovie {
                fields: fields("Diff", cinema, category),
                version: None,
                poster: None,
                images: vec![],
                image_ids_to_delete: vec![],
                actor_ids: vec![d, c],
            },
        )
        .await
        .unwrap();

    assert_eq!(actor_links(&app, created.id).await, BTreeSet::from([c, d]));
}

#[tokio::test]
async fn concurrent_writer_invalidates_version() {
    let app = TestApp::spawn().await;
    let policy = UploadPolicy::default();
    let service = CatalogService::new(&app.db, app.files.as_ref(), &policy);
    let cinema = app.insert_cinema("Grand").await;
    let category = app.insert_category("Drama").await;

    let created = service
        .create(CreateMovie {
            fields: fields("Shared", cinema, category),
            poster: None,
            images: vec![],
            actor_ids: vec![],
        })
        .await
        .unwrap();

    let edit = |title: &str| UpdateMovie {
        fields: fields(title, cinema, category),
        version: Some(created.version),
        poster: None,
        images: vec![],
        image_ids_to_delete: vec![],
        actor_ids: vec![],
    };

    service.update(created.id, edit("First")).await.unwrap();
    let err = service.update(created.id, edit("Second")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Conflict(_)), "{err:?}");

    let stored = movie::Entity::find_by_id(created.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "First");
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn delete_of_missing_movie_is_not_found() {
    let app = TestApp::spawn().await;
    let policy = UploadPolicy::default();
    let service = CatalogService::new(&app.db, app.files.as_ref(), &policy);

    let err = service.delete(31337).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)), "{err:?}");
}

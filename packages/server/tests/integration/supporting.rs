use chrono::NaiveDate;
use reqwest::multipart::Form;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use tickets_server::entity::{booking, movie_actor, payment, seat, ticket};

use crate::common::{TestApp, image_part, movie_form, routes};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

mod categories {
    use super::*;

    #[tokio::test]
    async fn crud_round_trip() {
        let app = TestApp::spawn().await;

        let created = app
            .post_json(routes::CATEGORIES, &json!({ "name": "  Thriller " }))
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        assert_eq!(created.body["name"], "Thriller");
        let id = created.id();

        let renamed = app
            .put_json(&routes::category(id), &json!({ "name": "Mystery" }))
            .await;
        assert_eq!(renamed.status, 200, "{}", renamed.text);
        assert_eq!(renamed.body["name"], "Mystery");

        let list = app.get(routes::CATEGORIES).await;
        assert_eq!(list.body[0]["name"], "Mystery");
        assert_eq!(list.body[0]["movie_count"], 0);

        assert_eq!(app.delete(&routes::category(id)).await.status, 204);
        assert_eq!(app.get(&routes::category(id)).await.status, 404);
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let app = TestApp::spawn().await;
        app.insert_category("Drama").await;

        let res = app
            .post_json(routes::CATEGORIES, &json!({ "name": "Drama" }))
            .await;
        assert_eq!(res.status, 409, "{}", res.text);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(routes::CATEGORIES, &json!({ "name": "   " }))
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["field"], "name");
    }

    #[tokio::test]
    async fn category_in_use_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let cinema = app.insert_cinema("Grand").await;
        let category = app.insert_category("Drama").await;
        app.insert_movie("Held", start(), cinema, category).await;

        let res = app.delete(&routes::category(category)).await;
        assert_eq!(res.status, 409, "{}", res.text);
        assert_eq!(app.get(&routes::category(category)).await.status, 200);
    }
}

mod cinemas {
    use super::*;

    fn cinema_form(name: &str) -> Form {
        Form::new()
            .text("name", name.to_string())
            .text("address", "42 River Road")
            .text("description", "Multiplex")
    }

    #[tokio::test]
    async fn logo_is_replaced_and_removed_with_the_cinema() {
        let app = TestApp::spawn().await;

        let created = app
            .post_form(
                routes::CINEMAS,
                cinema_form("Riverside").part("logo", image_part("logo.png", 16)),
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let id = created.id();
        let first_logo = created.body["cinema_logo"].as_str().unwrap().to_string();
        assert!(first_logo.starts_with("/uploads/cinemas/"));
        assert!(app.file_on_disk(&first_logo).exists());

        let updated = app
            .put_form(
                &routes::cinema(id),
                cinema_form("Riverside Screens").part("logo", image_part("new.gif", 16)),
            )
            .await;
        assert_eq!(updated.status, 200, "{}", updated.text);
        let second_logo = updated.body["cinema_logo"].as_str().unwrap().to_string();
        assert_ne!(first_logo, second_logo);
        assert!(!app.file_on_disk(&first_logo).exists());

        let kept = app
            .put_form(&routes::cinema(id), cinema_form("Riverside Screens"))
            .await;
        assert_eq!(kept.body["cinema_logo"], second_logo.as_str());

        let detail = app.get(&routes::cinema(id)).await;
        assert_eq!(detail.body["movie_count"], 0);
        assert_eq!(detail.body["hall_count"], 0);

        assert_eq!(app.delete(&routes::cinema(id)).await.status, 204);
        assert!(app.stored_files().is_empty());
    }

    #[tokio::test]
    async fn invalid_logo_is_rejected_before_anything_is_written() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::CINEMAS,
                cinema_form("Bad Logo").part("logo", image_part("logo.svg", 16)),
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["field"], "logo");
        assert!(app.stored_files().is_empty());
        assert_eq!(app.get(routes::CINEMAS).await.body, json!([]));
    }

    #[tokio::test]
    async fn missing_address_is_rejected() {
        let app = TestApp::spawn().await;

        let form = Form::new().text("name", "Nowhere");
        let res = app.post_form(routes::CINEMAS, form).await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["field"], "address");
    }

    #[tokio::test]
    async fn cinema_with_movies_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let cinema = app.insert_cinema("Grand").await;
        let category = app.insert_category("Drama").await;
        app.insert_movie("Held", start(), cinema, category).await;

        let res = app.delete(&routes::cinema(cinema)).await;
        assert_eq!(res.status, 409, "{}", res.text);
    }
}

mod actors {
    use super::*;

    #[tokio::test]
    async fn search_matches_first_or_last_name() {
        let app = TestApp::spawn().await;
        app.insert_actor("Rebecca", "Ferguson").await;
        app.insert_actor("Oscar", "Isaac").await;
        app.insert_actor("Isabella", "Rossellini").await;

        let res = app.get(&format!("{}?search=isa", routes::ACTORS)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["total"], 2);
        assert_eq!(res.body["data"][0]["first_name"], "Isabella");
        assert_eq!(res.body["data"][1]["first_name"], "Oscar");
    }

    #[tokio::test]
    async fn detail_lists_movies_and_delete_unlinks_them() {
        let app = TestApp::spawn().await;
        let cinema = app.insert_cinema("Grand").await;
        let category = app.insert_category("Drama").await;

        let actor = app
            .post_json(
                routes::ACTORS,
                &json!({ "first_name": "Oscar", "last_name": "Isaac" }),
            )
            .await;
        assert_eq!(actor.status, 201, "{}", actor.text);
        let actor_id = actor.id();

        let movie = app
            .post_form(
                routes::MOVIES,
                movie_form("Ex Machina", cinema, category).text("actor_ids", actor_id.to_string()),
            )
            .await;
        assert_eq!(movie.status, 201, "{}", movie.text);

        let detail = app.get(&routes::actor(actor_id)).await;
        assert_eq!(detail.body["movies"][0]["title"], "Ex Machina");

        assert_eq!(app.delete(&routes::actor(actor_id)).await.status, 204);
        let links = movie_actor::Entity::find()
            .filter(movie_actor::Column::ActorId.eq(actor_id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(links, 0);
        assert_eq!(app.get(&routes::movie(movie.id())).await.status, 200);
    }

    #[tokio::test]
    async fn update_validates_lengths() {
        let app = TestApp::spawn().await;
        let id = app.insert_actor("Amy", "Adams").await;

        let res = app
            .put_json(
                &routes::actor(id),
                &json!({ "first_name": "", "last_name": "Adams" }),
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["field"], "first_name");
    }
}

mod showtimes {
    use super::*;

    #[tokio::test]
    async fn create_checks_references_and_blocks_delete_with_bookings() {
        let app = TestApp::spawn().await;
        let cinema = app.insert_cinema("Grand").await;
        let category = app.insert_category("Drama").await;
        let movie = app.insert_movie("Dune", start(), cinema, category).await;
        let user = app.insert_user("fan@example.com").await;

        let missing = app
            .post_json(
                routes::SHOWTIMES,
                &json!({
                    "show_date_time": "2024-06-01T19:30:00Z",
                    "movie_id": 999,
                    "cinema_id": cinema,
                    "ticket_price": "9.50",
                }),
            )
            .await;
        assert_eq!(missing.status, 404, "{}", missing.text);

        let created = app
            .post_json(
                routes::SHOWTIMES,
                &json!({
                    "show_date_time": "2024-06-01T19:30:00Z",
                    "movie_id": movie,
                    "cinema_id": cinema,
                    "ticket_price": "9.5",
                }),
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        assert_eq!(created.body["ticket_price"], "9.50");
        let showtime = created.id();

        let listed = app
            .get(&format!("{}?movie_id={movie}", routes::SHOWTIMES))
            .await;
        assert_eq!(listed.body["pagination"]["total"], 1);

        let booking = app
            .post_json(
                routes::BOOKINGS,
                &json!({
                    "movie_id": movie,
                    "user_id": user,
                    "cinema_id": cinema,
                    "showtime_id": showtime,
                    "ticket_count": 1,
                }),
            )
            .await;
        assert_eq!(booking.status, 201, "{}", booking.text);

        let blocked = app.delete(&routes::showtime(showtime)).await;
        assert_eq!(blocked.status, 409, "{}", blocked.text);

        assert_eq!(app.delete(&routes::booking(booking.id())).await.status, 204);
        assert_eq!(app.delete(&routes::showtime(showtime)).await.status, 204);
    }

    #[tokio::test]
    async fn price_out_of_range_is_rejected() {
        let app = TestApp::spawn().await;
        let cinema = app.insert_cinema("Grand").await;
        let category = app.insert_category("Drama").await;
        let movie = app.insert_movie("Dune", start(), cinema, category).await;

        let res = app
            .post_json(
                routes::SHOWTIMES,
                &json!({
                    "show_date_time": "2024-06-01T19:30:00Z",
                    "movie_id": movie,
                    "cinema_id": cinema,
                    "ticket_price": "10000.50",
                }),
            )
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["field"], "ticket_price");
    }
}

mod bookings {
    use super::*;

    #[tokio::test]
    async fn total_uses_showtime_price_and_issues_tickets() {
        let app = TestApp::spawn().await;
        let cinema = app.insert_cinema("Grand").await;
        let category = app.insert_category("Drama").await;
        let movie = app.insert_movie("Dune", start(), cinema, category).await;
        let user = app.insert_user("fan@example.com").await;
        let showtime = app
            .insert_showtime(movie, cinema, Decimal::new(875, 2))
            .await;

        let res = app
            .post_json(
                routes::BOOKINGS,
                &json!({
                    "movie_id": movie,
                    "user_id": user,
                    "cinema_id": cinema,
                    "showtime_id": showtime,
                    "ticket_count": 3,
                }),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["total_price"], "26.25");
        assert_eq!(res.body["movie_title"], "Dune");
        assert_eq!(res.body["user_name"], "Test User");
        assert_eq!(res.body["tickets"].as_array().unwrap().len(), 3);
        assert_eq!(res.body["tickets"][0]["price"], "8.75");

        let without_showtime = app
            .post_json(
                routes::BOOKINGS,
                &json!({
                    "movie_id": movie,
                    "user_id": user,
                    "cinema_id": cinema,
                    "ticket_count": 2,
                }),
            )
            .await;
        assert_eq!(without_showtime.body["total_price"], "20.00");
    }

    #[tokio::test]
    async fn ticket_count_is_bounded() {
        let app = TestApp::spawn().await;
        let cinema = app.insert_cinema("Grand").await;
        let category = app.insert_category("Drama").await;
        let movie = app.insert_movie("Dune", start(), cinema, category).await;
        let user = app.insert_user("fan@example.com").await;

        for count in [0, 21] {
            let res = app
                .post_json(
                    routes::BOOKINGS,
                    &json!({
                        "movie_id": movie,
                        "user_id": user,
                        "cinema_id": cinema,
                        "ticket_count": count,
                    }),
                )
                .await;
            assert_eq!(res.status, 400, "{count}: {}", res.text);
            assert_eq!(res.body["field"], "ticket_count");
        }
    }

    #[tokio::test]
    async fn delete_cascades_tickets_and_payments_and_frees_seats() {
        let app = TestApp::spawn().await;
        let cinema = app.insert_cinema("Grand").await;
        let category = app.insert_category("Drama").await;
        let movie = app.insert_movie("Dune", start(), cinema, category).await;
        let user = app.insert_user("fan@example.com").await;
        let booking_id = app.insert_booking(movie, cinema, user).await;
        let seat_id = app.insert_reserved_seat(cinema, booking_id).await;
        app.insert_payment(booking_id).await;

        let res = app.delete(&routes::booking(booking_id)).await;
        assert_eq!(res.status, 204, "{}", res.text);

        assert!(
            booking::Entity::find_by_id(booking_id)
                .one(&app.db)
                .await
                .unwrap()
                .is_none()
        );
        let tickets = ticket::Entity::find()
            .filter(ticket::Column::BookingId.eq(booking_id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(tickets, 0);
        let payments = payment::Entity::find()
            .filter(payment::Column::BookingId.eq(booking_id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(payments, 0);

        let seat = seat::Entity::find_by_id(seat_id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert!(!seat.is_reserved);
        assert_eq!(seat.booking_id, None);

        // With the booking gone the movie can be deleted.
        assert_eq!(app.delete(&routes::movie(movie)).await.status, 200);
    }
}

use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::{actor, admin, booking, category, cinema, movie, showtime};
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let max_upload = config.storage.max_upload_bytes;

    OpenApiRouter::new()
        .nest("/movies", movie_routes(max_upload))
        .nest("/actors", actor_routes())
        .nest("/categories", category_routes())
        .nest("/cinemas", cinema_routes(max_upload))
        .nest("/showtimes", showtime_routes())
        .nest("/bookings", booking_routes())
        .nest("/admin", admin_routes())
}

fn movie_routes(max_upload: u64) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(movie::list_movies, movie::create_movie))
        .routes(routes!(movie::form_options))
        .routes(routes!(
            movie::get_movie,
            movie::update_movie,
            movie::delete_movie
        ))
        .layer(movie::movie_form_body_limit(max_upload))
}

fn actor_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(actor::list_actors, actor::create_actor))
        .routes(routes!(
            actor::get_actor,
            actor::update_actor,
            actor::delete_actor
        ))
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(category::list_categories, category::create_category))
        .routes(routes!(
            category::get_category,
            category::update_category,
            category::delete_category
        ))
}

fn cinema_routes(max_upload: u64) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(cinema::list_cinemas, cinema::create_cinema))
        .routes(routes!(
            cinema::get_cinema,
            cinema::update_cinema,
            cinema::delete_cinema
        ))
        .layer(cinema::cinema_form_body_limit(max_upload))
}

fn showtime_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(showtime::list_showtimes, showtime::create_showtime))
        .routes(routes!(
            showtime::get_showtime,
            showtime::update_showtime,
            showtime::delete_showtime
        ))
}

fn booking_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(booking::list_bookings, booking::create_booking))
        .routes(routes!(booking::get_booking, booking::delete_booking))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(admin::dashboard))
        .routes(routes!(admin::sweep_uploads))
}

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use common::storage::filesystem::LocalFileStore;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tempfile::TempDir;

use tickets_server::config::{
    AppConfig, CorsConfig, DashboardConfig, DatabaseConfig, ListingConfig, ServerConfig,
    StorageConfig,
};
use tickets_server::entity::{
    MovieStatus, PaymentMethod, PaymentStatus, actor, booking, category, cinema, hall, movie,
    movie_category, payment, seat, showtime, ticket, user,
};
use tickets_server::state::AppState;

pub const FIVE_MIB: usize = 5 * 1024 * 1024;

pub mod routes {
    pub const MOVIES: &str = "/api/v1/movies";
    pub const MOVIE_FORM_OPTIONS: &str = "/api/v1/movies/form-options";
    pub const ACTORS: &str = "/api/v1/actors";
    pub const CATEGORIES: &str = "/api/v1/categories";
    pub const CINEMAS: &str = "/api/v1/cinemas";
    pub const SHOWTIMES: &str = "/api/v1/showtimes";
    pub const BOOKINGS: &str = "/api/v1/bookings";
    pub const DASHBOARD: &str = "/api/v1/admin/dashboard";
    pub const SWEEP: &str = "/api/v1/admin/uploads/sweep";

    pub fn movie(id: i32) -> String {
        format!("/api/v1/movies/{id}")
    }

    pub fn actor(id: i32) -> String {
        format!("/api/v1/actors/{id}")
    }

    pub fn category(id: i32) -> String {
        format!("/api/v1/categories/{id}")
    }

    pub fn cinema(id: i32) -> String {
        format!("/api/v1/cinemas/{id}")
    }

    pub fn showtime(id: i32) -> String {
        format!("/api/v1/showtimes/{id}")
    }

    pub fn booking(id: i32) -> String {
        format!("/api/v1/bookings/{id}")
    }
}

/// A running test server backed by a fresh SQLite file and upload root.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub files: Arc<LocalFileStore>,
    pub config: AppConfig,
    /// Keeps the database file and uploads alive for the test.
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

pub fn test_config(dir: &Path) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", dir.join("tickets.db").display()),
        },
        storage: StorageConfig {
            public_root: dir.join("wwwroot"),
            max_upload_bytes: FIVE_MIB as u64,
            allowed_extensions: vec![".jpg".into(), ".jpeg".into(), ".png".into(), ".gif".into()],
            orphan_grace_secs: 3600,
        },
        dashboard: DashboardConfig { ttl_secs: 60 },
        listing: ListingConfig {
            default_page_size: 10,
            max_page_size: 100,
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = test_config(dir.path());
        configure(&mut config);

        let db = tickets_server::database::init_db(&config.database.url)
            .await
            .expect("Failed to initialize test database");
        let files = Arc::new(
            LocalFileStore::new(config.storage.public_root.clone())
                .await
                .expect("Failed to create file store"),
        );

        let state = AppState::new(db.clone(), config.clone(), files.clone());
        let app = tickets_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            files,
            config,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn public_root(&self) -> &Path {
        self.files.public_root()
    }

    /// Filesystem location of a public `/uploads/...` path.
    pub fn file_on_disk(&self, public_path: &str) -> PathBuf {
        self.public_root().join(public_path.trim_start_matches('/'))
    }

    /// Every stored upload, as public paths.
    pub fn stored_files(&self) -> Vec<String> {
        let uploads = self.public_root().join("uploads");
        let mut paths = Vec::new();
        let Ok(folders) = std::fs::read_dir(&uploads) else {
            return paths;
        };
        for folder in folders.flatten() {
            let folder_name = folder.file_name().to_string_lossy().to_string();
            for file in std::fs::read_dir(folder.path()).into_iter().flatten().flatten() {
                paths.push(format!(
                    "/uploads/{}/{}",
                    folder_name,
                    file.file_name().to_string_lossy()
                ));
            }
        }
        paths.sort();
        paths
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn post_form(&self, path: &str, form: Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart POST request");

        TestResponse::from_response(res).await
    }

    pub async fn put_form(&self, path: &str, form: Form) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    pub async fn insert_cinema(&self, name: &str) -> i32 {
        cinema::ActiveModel {
            name: Set(name.to_string()),
            address: Set("1 Main Street".into()),
            description: Set(None),
            cinema_logo: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert cinema")
        .id
    }

    pub async fn insert_category(&self, name: &str) -> i32 {
        category::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert category")
        .id
    }

    pub async fn link_movie_category(&self, movie_id: i32, category_id: i32) {
        movie_category::ActiveModel {
            movie_id: Set(movie_id),
            category_id: Set(category_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert movie category link");
    }

    pub async fn insert_actor(&self, first_name: &str, last_name: &str) -> i32 {
        actor::ActiveModel {
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            name: Set(None),
            bio: Set(None),
            profile_picture: Set(None),
            news: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert actor")
        .id
    }

    pub async fn insert_user(&self, email: &str) -> i32 {
        user::ActiveModel {
            full_name: Set("Test User".into()),
            email: Set(email.to_string()),
            avatar_url: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert user")
        .id
    }

    /// Inserts a movie row directly, bypassing the catalog service.
    pub async fn insert_movie(
        &self,
        title: &str,
        start_date: NaiveDate,
        cinema_id: i32,
        category_id: i32,
    ) -> i32 {
        let now = Utc::now();
        movie::ActiveModel {
            title: Set(title.to_string()),
            description: Set(None),
            price: Set(Decimal::new(1000, 2)),
            img_url: Set(None),
            trailer_url: Set(None),
            start_date: Set(start_date),
            end_date: Set(start_date + chrono::Duration::days(30)),
            status: Set(MovieStatus::Showing),
            cinema_id: Set(cinema_id),
            category_id: Set(category_id),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert movie")
        .id
    }

    pub async fn insert_showtime(&self, movie_id: i32, cinema_id: i32, price: Decimal) -> i32 {
        showtime::ActiveModel {
            show_date_time: Set(Utc::now()),
            ticket_price: Set(price),
            movie_id: Set(movie_id),
            cinema_id: Set(cinema_id),
            hall_id: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert showtime")
        .id
    }

    /// Inserts a booking with one ticket.
    pub async fn insert_booking(&self, movie_id: i32, cinema_id: i32, user_id: i32) -> i32 {
        let booking = booking::ActiveModel {
            booking_date: Set(Utc::now()),
            ticket_count: Set(1),
            total_price: Set(Decimal::new(1000, 2)),
            movie_id: Set(movie_id),
            user_id: Set(user_id),
            cinema_id: Set(cinema_id),
            showtime_id: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert booking");

        ticket::ActiveModel {
            seat_number: Set("A1".into()),
            price: Set(Decimal::new(1000, 2)),
            booking_id: Set(booking.id),
            seat_id: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert ticket");

        booking.id
    }

    pub async fn insert_payment(&self, booking_id: i32) -> i32 {
        payment::ActiveModel {
            booking_id: Set(booking_id),
            amount: Set(Decimal::new(1000, 2)),
            method: Set(PaymentMethod::CreditCard),
            status: Set(PaymentStatus::Completed),
            transaction_id: Set(Some("txn-1".into())),
            payment_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert payment")
        .id
    }

    /// Inserts a hall with one seat reserved by `booking_id`. Returns the seat id.
    pub async fn insert_reserved_seat(&self, cinema_id: i32, booking_id: i32) -> i32 {
        let hall = hall::ActiveModel {
            name: Set("Hall 1".into()),
            capacity: Set(100),
            cinema_id: Set(cinema_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert hall");

        seat::ActiveModel {
            seat_number: Set("A1".into()),
            seat_row: Set(1),
            seat_column: Set(1),
            is_reserved: Set(true),
            hall_id: Set(hall.id),
            booking_id: Set(Some(booking_id)),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert seat")
        .id
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }
}

/// A movie form with every required text part filled in.
pub fn movie_form(title: &str, cinema_id: i32, category_id: i32) -> Form {
    movie_form_with(title, cinema_id, category_id, &[])
}

/// Like [`movie_form`], with some text parts replaced or added.
pub fn movie_form_with(
    title: &str,
    cinema_id: i32,
    category_id: i32,
    overrides: &[(&str, &str)],
) -> Form {
    let cinema_id = cinema_id.to_string();
    let category_id = category_id.to_string();
    let defaults = [
        ("title", title),
        ("description", "A test movie"),
        ("price", "12.5"),
        ("start_date", "2024-01-01"),
        ("end_date", "2024-02-01"),
        ("status", "Showing"),
        ("cinema_id", cinema_id.as_str()),
        ("category_id", category_id.as_str()),
    ];

    let mut form = Form::new();
    for (name, value) in defaults {
        let value = overrides
            .iter()
            .find(|(key, _)| *key == name)
            .map_or(value, |(_, v)| *v);
        form = form.text(name.to_string(), value.to_string());
    }
    for (name, value) in overrides {
        if !defaults.iter().any(|(key, _)| key == name) {
            form = form.text(name.to_string(), value.to_string());
        }
    }
    form
}

/// A file part with the given name and size.
pub fn image_part(file_name: &str, size: usize) -> Part {
    Part::bytes(vec![0x42; size]).file_name(file_name.to_string())
}

use sea_orm::sea_query::{
    Index, IndexCreateStatement, MysqlQueryBuilder, OnConflict, PostgresQueryBuilder,
    SqliteQueryBuilder,
};
use sea_orm::*;
use tracing::info;

use crate::entity::{actor, booking, category, cinema, movie};

/// Categories available on a fresh install.
const DEFAULT_CATEGORIES: &[&str] = &[
    "Action", "Animation", "Comedy", "Drama", "Horror", "Science Fiction",
];

/// (name, address, description)
const DEFAULT_CINEMAS: &[(&str, &str, &str)] = &[
    ("Grand Cinema", "1 Main Street", "Six screens in the city centre"),
    ("Riverside Screens", "42 River Road", "Riverside multiplex with IMAX"),
];

/// (first name, last name)
const DEFAULT_ACTORS: &[(&str, &str)] = &[
    ("Timothee", "Chalamet"),
    ("Zendaya", "Coleman"),
    ("Rebecca", "Ferguson"),
    ("Oscar", "Isaac"),
];

/// Seeds categories, cinemas and actors. Safe to run repeatedly.
pub async fn seed_catalog(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut categories_inserted = 0u32;
    for &name in DEFAULT_CATEGORIES {
        let model = category::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let result = category::Entity::insert(model)
            .on_conflict(
                OnConflict::column(category::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => categories_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }
    if categories_inserted > 0 {
        info!("Seeded {} new categories", categories_inserted);
    }

    // Cinemas and actors carry no unique key; match on name instead.
    let mut cinemas_inserted = 0u32;
    for &(name, address, description) in DEFAULT_CINEMAS {
        let exists = cinema::Entity::find()
            .filter(cinema::Column::Name.eq(name))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }
        cinema::ActiveModel {
            name: Set(name.to_string()),
            address: Set(address.to_string()),
            description: Set(Some(description.to_string())),
            cinema_logo: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;
        cinemas_inserted += 1;
    }
    if cinemas_inserted > 0 {
        info!("Seeded {} new cinemas", cinemas_inserted);
    }

    let mut actors_inserted = 0u32;
    for &(first_name, last_name) in DEFAULT_ACTORS {
        let exists = actor::Entity::find()
            .filter(actor::Column::FirstName.eq(first_name))
            .filter(actor::Column::LastName.eq(last_name))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }
        actor::ActiveModel {
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            name: Set(None),
            bio: Set(None),
            profile_picture: Set(None),
            news: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;
        actors_inserted += 1;
    }
    if actors_inserted > 0 {
        info!("Seeded {} new actors", actors_inserted);
    }

    Ok(())
}

/// Ensure the listing and booking-lookup indexes exist.
///
/// Schema sync only creates unique indexes, so composite lookup indexes are
/// created here on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Listing: WHERE category_id = ? ORDER BY start_date DESC
    let listing = Index::create()
        .if_not_exists()
        .name("idx_movie_category_start")
        .table(movie::Entity)
        .col(movie::Column::CategoryId)
        .col(movie::Column::StartDate)
        .to_owned();
    create_index(db, "idx_movie_category_start", &listing).await;

    // Delete guard: SELECT COUNT(*) FROM booking WHERE movie_id = ?
    let bookings = Index::create()
        .if_not_exists()
        .name("idx_booking_movie")
        .table(booking::Entity)
        .col(booking::Column::MovieId)
        .to_owned();
    create_index(db, "idx_booking_movie", &bookings).await;

    Ok(())
}

async fn create_index(db: &DatabaseConnection, name: &str, stmt: &IndexCreateStatement) {
    let sql = match db.get_database_backend() {
        DbBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        _ => stmt.to_string(MysqlQueryBuilder),
    };

    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}

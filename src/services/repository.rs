use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use tracing::debug;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        packing::{PackingItem, PackingList},
        trip::{parse_trip_id, NewTrip, Trip},
    },
};

const TRIP_COLUMNS: &str =
    "id, destination, purpose, duration, weather, trip_date, packing_list, total_weight";

#[derive(FromRow)]
struct TripRow {
    id: String,
    destination: String,
    purpose: String,
    duration: String,
    weather: String,
    trip_date: DateTime<Utc>,
    packing_list: Json<Vec<PackingItem>>,
    total_weight: f64,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Self {
            id: row.id,
            destination: row.destination,
            purpose: row.purpose,
            duration: row.duration,
            weather: row.weather,
            trip_date: row.trip_date,
            packing_list: row.packing_list.0,
            total_weight: row.total_weight,
        }
    }
}

/// Durable store for trips and their packing lists.
///
/// `replace_list` is the only way a list is written, and it always writes the
/// list and its total weight in the same statement.
#[derive(Clone)]
pub struct TripRepository {
    db: DbPool,
}

impl TripRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, new_trip: NewTrip) -> Result<Trip, AppError> {
        let NewTrip { profile, trip_date } = new_trip;
        let trip = Trip {
            id: Uuid::new_v4().to_string(),
            destination: profile.destination,
            purpose: profile.purpose,
            duration: profile.duration,
            weather: profile.weather,
            trip_date,
            packing_list: Vec::new(),
            total_weight: 0.0,
        };

        sqlx::query(
            "INSERT INTO trips (id, destination, purpose, duration, weather, trip_date, packing_list, total_weight, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&trip.id)
        .bind(&trip.destination)
        .bind(&trip.purpose)
        .bind(&trip.duration)
        .bind(&trip.weather)
        .bind(trip.trip_date)
        .bind(Json(&trip.packing_list))
        .bind(trip.total_weight)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        debug!(trip_id = %trip.id, "trip created");
        Ok(trip)
    }

    /// All trips, earliest `trip_date` first; trips on the same date keep
    /// their insertion order.
    pub async fn list(&self) -> Result<Vec<Trip>, AppError> {
        let rows: Vec<TripRow> = sqlx::query_as(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips ORDER BY trip_date ASC, seq ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Trip::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Trip, AppError> {
        let id = parse_trip_id(id)?;
        let row: Option<TripRow> =
            sqlx::query_as(&format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?"))
                .bind(&id)
                .fetch_optional(&self.db)
                .await?;
        row.map(Trip::from).ok_or(AppError::NotFound)
    }

    pub async fn replace_list(&self, id: &str, list: &PackingList) -> Result<Trip, AppError> {
        let id = parse_trip_id(id)?;
        let row: Option<TripRow> = sqlx::query_as(&format!(
            "UPDATE trips SET packing_list = ?, total_weight = ? WHERE id = ? RETURNING {TRIP_COLUMNS}"
        ))
        .bind(Json(list.items()))
        .bind(list.total_weight())
        .bind(&id)
        .fetch_optional(&self.db)
        .await?;

        let trip = row.map(Trip::from).ok_or(AppError::NotFound)?;
        debug!(
            trip_id = %trip.id,
            items = trip.packing_list.len(),
            total_weight = trip.total_weight,
            "packing list replaced"
        );
        Ok(trip)
    }
}

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    error::AppError,
    models::{
        packing::PackingItem,
        trip::{normalize, DurationInput, Trip, TripFields},
    },
    services::{
        advisor::TravelAdvisor, editor, generator::PackingListGenerator,
        repository::TripRepository,
    },
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateListRequest {
    pub trip_id: Option<String>,
    pub destination: Option<String>,
    pub purpose: Option<String>,
    pub duration: Option<DurationInput>,
    pub weather: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditListRequest {
    pub trip_id: Option<String>,
    pub items: Option<Vec<PackingItem>>,
}

/// Use cases over trips. Holds collaborators only; all state lives in the
/// repository.
#[derive(Clone)]
pub struct TripService {
    repo: TripRepository,
    generator: PackingListGenerator,
    advisor: TravelAdvisor,
}

impl TripService {
    pub fn new(
        repo: TripRepository,
        generator: PackingListGenerator,
        advisor: TravelAdvisor,
    ) -> Self {
        Self {
            repo,
            generator,
            advisor,
        }
    }

    pub async fn create_trip(&self, fields: TripFields) -> Result<Trip, AppError> {
        let new_trip = fields.into_new_trip()?;
        let trip = self.repo.create(new_trip).await?;
        info!(trip_id = %trip.id, destination = %trip.destination, "trip created");
        Ok(trip)
    }

    pub async fn list_trips(&self) -> Result<Vec<Trip>, AppError> {
        self.repo.list().await
    }

    pub async fn get_trip(&self, id: &str) -> Result<Trip, AppError> {
        self.repo.get(id).await
    }

    /// Generates a list and stores it. Nothing is written unless the model
    /// reply parses completely.
    pub async fn generate_list(&self, request: GenerateListRequest) -> Result<Trip, AppError> {
        let trip_id = require_trip_id(request.trip_id)?;
        let profile = TripFields {
            destination: request.destination,
            purpose: request.purpose,
            duration: request.duration,
            weather: request.weather,
            trip_date: None,
        }
        .into_profile()?;

        // Unknown ids fail before the model is called.
        self.repo.get(&trip_id).await?;

        let list = self.generator.generate(&profile).await.map_err(|err| {
            warn!(%trip_id, "packing list generation failed: {err}");
            err
        })?;
        let trip = self.repo.replace_list(&trip_id, &list).await?;
        info!(
            trip_id = %trip.id,
            items = trip.packing_list.len(),
            total_weight = trip.total_weight,
            "generated packing list stored"
        );
        Ok(trip)
    }

    pub async fn edit_list(&self, request: EditListRequest) -> Result<Trip, AppError> {
        let trip_id = require_trip_id(request.trip_id)?;
        let list = editor::prepare_replacement(request.items)?;
        let trip = self.repo.replace_list(&trip_id, &list).await?;
        info!(
            trip_id = %trip.id,
            items = trip.packing_list.len(),
            total_weight = trip.total_weight,
            "packing list edited"
        );
        Ok(trip)
    }

    pub async fn suggestions(&self, destination: Option<String>) -> Result<String, AppError> {
        let destination =
            normalize(destination).ok_or_else(|| AppError::validation("destination is required"))?;
        self.advisor.suggestions(&destination).await
    }
}

fn require_trip_id(trip_id: Option<String>) -> Result<String, AppError> {
    normalize(trip_id).ok_or_else(|| AppError::validation("trip_id is required"))
}

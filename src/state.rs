use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        advisor::TravelAdvisor,
        generator::{PackingListGenerator, TextGenerator},
        identity::IdentityStore,
        repository::TripRepository,
        trips::TripService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityStore,
    pub trips: TripService,
}

impl AppState {
    pub fn new(config: &AppConfig, db: DbPool, model: Arc<dyn TextGenerator>) -> Self {
        let identity = IdentityStore::new(db.clone(), &config.secret_key, config.token_ttl_hours);
        let trips = TripService::new(
            TripRepository::new(db),
            PackingListGenerator::new(model.clone()),
            TravelAdvisor::new(model),
        );
        Self {
            identity,
            trips,
        }
    }
}

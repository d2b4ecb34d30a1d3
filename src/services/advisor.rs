use std::sync::Arc;

use tracing::info;

use crate::{
    error::AppError,
    services::generator::{GenerationRequest, TextGenerator},
};

/// Free-text travel tips for a destination, straight from the model.
#[derive(Clone)]
pub struct TravelAdvisor {
    model: Arc<dyn TextGenerator>,
}

impl TravelAdvisor {
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self { model }
    }

    pub async fn suggestions(&self, destination: &str) -> Result<String, AppError> {
        info!(%destination, "requesting travel tips");
        let prompt = format!(
            "Provide travel tips for {destination}, including must-see places and time \
             management advice."
        );
        self.model
            .generate(GenerationRequest::text(prompt))
            .await
            .map_err(|err| match err {
                AppError::Generation(_) => err,
                other => AppError::generation(other.to_string()),
            })
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    models::{
        packing::{PackingItem, PackingList},
        trip::TripProfile,
    },
};

/// What shape of reply a prompt expects from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub format: ResponseFormat,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Text,
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Json,
        }
    }
}

/// An external text-generation model. Its output is untrusted free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AppError>;
}

/// The item schema the model is asked to produce. Unknown keys are ignored;
/// a missing or null weight counts as zero.
#[derive(Debug, Deserialize)]
struct GeneratedItem {
    name: String,
    checked: bool,
    compartment: String,
    #[serde(default)]
    weight: Option<f64>,
}

#[derive(Clone)]
pub struct PackingListGenerator {
    model: Arc<dyn TextGenerator>,
}

impl PackingListGenerator {
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self { model }
    }

    pub async fn generate(&self, profile: &TripProfile) -> Result<PackingList, AppError> {
        info!(destination = %profile.destination, "requesting packing list from model");
        let raw = self
            .model
            .generate(GenerationRequest::json(packing_list_prompt(profile)))
            .await
            .map_err(|err| match err {
                AppError::Generation(_) => err,
                other => AppError::generation(other.to_string()),
            })?;
        let list = parse_packing_list(&raw)?;
        debug!(
            items = list.len(),
            total_weight = list.total_weight(),
            "model returned packing list"
        );
        Ok(list)
    }
}

pub fn packing_list_prompt(profile: &TripProfile) -> String {
    format!(
        "Generate a packing list for a {duration} trip to {destination} for {purpose} \
         with {weather} weather.\n\
         Respond with a JSON array of objects and nothing else. Each object must have \
         exactly these fields:\n\
         - \"name\": string, the item to pack\n\
         - \"checked\": boolean, always false\n\
         - \"compartment\": string, the bag or pocket the item goes in\n\
         - \"weight\": number, estimated weight in kilograms, never negative\n\
         The output must be directly parseable as a JSON array, with no prose, \
         comments or markdown fences.",
        duration = profile.duration,
        destination = profile.destination,
        purpose = profile.purpose,
        weather = profile.weather,
    )
}

/// Strictly parses a model reply into a packing list. Any deviation from the
/// item schema fails the whole reply; nothing is salvaged.
pub fn parse_packing_list(raw: &str) -> Result<PackingList, AppError> {
    let generated: Vec<GeneratedItem> = serde_json::from_str(raw.trim()).map_err(|err| {
        warn!("model reply is not a valid packing list: {err}");
        AppError::generation(format!("model reply is not a valid packing list: {err}"))
    })?;

    let mut items = Vec::with_capacity(generated.len());
    for (index, item) in generated.into_iter().enumerate() {
        let name = item.name.trim();
        if name.is_empty() {
            return Err(AppError::generation(format!("item {index} has an empty name")));
        }
        if item.checked {
            debug!(index, "model marked an item as checked, resetting");
        }
        items.push(PackingItem::new(
            name,
            item.compartment.trim(),
            item.weight.unwrap_or(0.0),
        ));
    }

    PackingList::from_items(items).map_err(|err| AppError::generation(err.to_string()))
}

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// One entry of a packing list, kept as the JSON object it arrived as.
///
/// Generated items always carry `name`, `checked`, `compartment` and
/// `weight`. Items from a client edit are stored verbatim: every key,
/// including nulls and values of unexpected types, round-trips untouched.
/// Only `weight` is ever read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackingItem(Map<String, Value>);

impl PackingItem {
    pub fn new(name: impl Into<String>, compartment: impl Into<String>, weight: f64) -> Self {
        let mut fields = Map::new();
        fields.insert("name".into(), json!(name.into()));
        fields.insert("checked".into(), json!(false));
        fields.insert("compartment".into(), json!(compartment.into()));
        fields.insert("weight".into(), json!(weight));
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Weight used for totals. Missing, null and non-numeric weights count as
    /// zero here; [`PackingList::from_items`] rejects the non-numeric ones.
    pub fn weight_kg(&self) -> f64 {
        self.get("weight").and_then(Value::as_f64).unwrap_or(0.0)
    }
}

impl From<Map<String, Value>> for PackingItem {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightError {
    #[error("item {index} has a weight that is not a number")]
    NotANumber { index: usize },
    #[error("item {index} has a negative weight ({weight} kg)")]
    Negative { index: usize, weight: f64 },
}

/// A full packing list together with its total weight.
///
/// The only way to build one is [`PackingList::from_items`], so the total is
/// always the sum of the item weights it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackingList {
    items: Vec<PackingItem>,
    total_weight: f64,
}

impl PackingList {
    pub fn from_items(items: Vec<PackingItem>) -> Result<Self, WeightError> {
        for (index, item) in items.iter().enumerate() {
            match item.get("weight") {
                None | Some(Value::Null) => {}
                Some(Value::Number(number)) => {
                    let weight = number.as_f64().unwrap_or(0.0);
                    if weight < 0.0 {
                        return Err(WeightError::Negative { index, weight });
                    }
                }
                Some(_) => return Err(WeightError::NotANumber { index }),
            }
        }
        let total_weight = total_weight(&items);
        Ok(Self {
            items,
            total_weight,
        })
    }

    pub fn items(&self) -> &[PackingItem] {
        &self.items
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

pub fn total_weight(items: &[PackingItem]) -> f64 {
    items.iter().map(PackingItem::weight_kg).sum()
}

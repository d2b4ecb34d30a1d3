use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, models::packing::PackingItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub destination: String,
    pub purpose: String,
    pub duration: String,
    pub weather: String,
    pub trip_date: DateTime<Utc>,
    pub packing_list: Vec<PackingItem>,
    pub total_weight: f64,
}

/// The descriptive fields a packing list is generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripProfile {
    pub destination: String,
    pub purpose: String,
    pub duration: String,
    pub weather: String,
}

/// A validated trip ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub profile: TripProfile,
    pub trip_date: DateTime<Utc>,
}

/// Trip duration as sent by clients: free text, or a bare number of days.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Text(String),
    Number(serde_json::Number),
}

impl DurationInput {
    fn into_text(self) -> String {
        match self {
            DurationInput::Text(text) => text,
            DurationInput::Number(number) => number.to_string(),
        }
    }
}

/// Raw trip fields from a request body. Every field is optional here so
/// that missing fields surface as a validation error instead of a decode
/// failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripFields {
    pub destination: Option<String>,
    pub purpose: Option<String>,
    pub duration: Option<DurationInput>,
    pub weather: Option<String>,
    pub trip_date: Option<String>,
}

impl TripFields {
    pub fn into_profile(self) -> Result<TripProfile, AppError> {
        self.validate(false).map(|(profile, _)| profile)
    }

    pub fn into_new_trip(self) -> Result<NewTrip, AppError> {
        let (profile, trip_date) = self.validate(true)?;
        let trip_date = trip_date.ok_or_else(|| missing(&["trip_date"]))?;
        Ok(NewTrip {
            profile,
            trip_date: parse_trip_date(&trip_date)?,
        })
    }

    fn validate(self, require_date: bool) -> Result<(TripProfile, Option<String>), AppError> {
        let destination = normalize(self.destination);
        let purpose = normalize(self.purpose);
        let duration = normalize(self.duration.map(DurationInput::into_text));
        let weather = normalize(self.weather);
        let trip_date = normalize(self.trip_date);

        let mut absent = Vec::new();
        for (field, present) in [
            ("destination", destination.is_some()),
            ("purpose", purpose.is_some()),
            ("duration", duration.is_some()),
            ("weather", weather.is_some()),
            ("trip_date", trip_date.is_some() || !require_date),
        ] {
            if !present {
                absent.push(field);
            }
        }

        match (destination, purpose, duration, weather) {
            (Some(destination), Some(purpose), Some(duration), Some(weather))
                if absent.is_empty() =>
            {
                Ok((
                    TripProfile {
                        destination,
                        purpose,
                        duration,
                        weather,
                    },
                    trip_date,
                ))
            }
            _ => Err(missing(&absent)),
        }
    }
}

fn missing(fields: &[&str]) -> AppError {
    AppError::validation(format!("missing required fields: {}", fields.join(", ")))
}

pub fn normalize(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) and plain
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_trip_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| AppError::validation(format!("invalid trip_date: {raw:?}")))
}

/// Canonical form of a client-supplied trip id. Anything that is not a UUID
/// cannot name a trip, so it is reported as not found.
pub fn parse_trip_id(raw: &str) -> Result<String, AppError> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.hyphenated().to_string())
        .map_err(|_| AppError::NotFound)
}

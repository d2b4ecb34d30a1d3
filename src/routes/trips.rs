use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppError,
    models::trip::{Trip, TripFields},
    services::trips::{EditListRequest, GenerateListRequest},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(trips_list).post(trip_create))
        .route("/trips/:id", get(trip_detail))
        .route("/generate_packing_list", post(generate_packing_list))
        .route("/edit_packing_list", post(edit_packing_list))
        .route("/get_suggestions", post(get_suggestions))
}

async fn trips_list(State(state): State<AppState>) -> Result<Json<Vec<Trip>>, AppError> {
    Ok(Json(state.trips.list_trips().await?))
}

async fn trip_create(
    State(state): State<AppState>,
    payload: Result<Json<TripFields>, JsonRejection>,
) -> Result<Json<Trip>, AppError> {
    let Json(fields) = payload?;
    Ok(Json(state.trips.create_trip(fields).await?))
}

async fn trip_detail(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.trips.get_trip(&trip_id).await?))
}

async fn generate_packing_list(
    State(state): State<AppState>,
    payload: Result<Json<GenerateListRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let trip = state.trips.generate_list(request).await?;
    Ok(Json(json!({
        "message": "Packing list generated and added to the trip",
        "packing_list": trip.packing_list,
        "total_weight": trip.total_weight,
    })))
}

async fn edit_packing_list(
    State(state): State<AppState>,
    payload: Result<Json<EditListRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let trip = state.trips.edit_list(request).await?;
    Ok(Json(json!({
        "message": "Packing list updated",
        "updated_items": trip.packing_list,
        "total_weight": trip.total_weight,
    })))
}

#[derive(Deserialize)]
struct SuggestionsForm {
    destination: Option<String>,
}

async fn get_suggestions(
    State(state): State<AppState>,
    payload: Result<Json<SuggestionsForm>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(form) = payload?;
    let suggestions = state.trips.suggestions(form.destination).await?;
    Ok(Json(json!({ "suggestions": suggestions })))
}

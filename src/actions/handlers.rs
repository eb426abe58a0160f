use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::instrument;

use super::{
    catalog::ActionPreset,
    dto::{
        ActionsQuery, ActionsResponse, AppendActionsRequest, CapacityPoint, DaysQuery, YearQuery,
    },
    services::{
        capacity_of_year, check_year, days_with_actions, get_record, parse_day, parse_month,
        parse_year_scope, upsert_record,
    },
};
use crate::{
    auth::extractors::BearerUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/actions-lib", get(list_presets))
        .route("/days-have-actions", get(days_have_actions))
        .route("/data-of-years", get(data_of_years))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/actions", get(get_actions).post(append_actions))
}

fn current_year() -> i32 {
    OffsetDateTime::now_utc().year()
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn get_actions(
    State(state): State<AppState>,
    BearerUser(user): BearerUser,
    query: Result<Query<ActionsQuery>, QueryRejection>,
) -> AppResult<Json<ActionsResponse>> {
    let Query(query) = query?;
    let raw = query
        .datetime
        .ok_or_else(|| AppError::bad_request("datetime is required"))?;
    let day = parse_day(&raw)?;

    let mydata = get_record(state.records.as_ref(), &state.catalog, user.id, day).await?;
    Ok(Json(ActionsResponse { mydata }))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn append_actions(
    State(state): State<AppState>,
    BearerUser(user): BearerUser,
    payload: Result<Json<AppendActionsRequest>, JsonRejection>,
) -> AppResult<&'static str> {
    let Json(payload) = payload?;
    let entries = payload
        .mydata
        .ok_or_else(|| AppError::bad_request("mydata is required"))?;
    let raw = payload
        .timestamp
        .ok_or_else(|| AppError::bad_request("timestamp is required"))?;
    let day = parse_day(&raw)?;

    upsert_record(state.records.as_ref(), user.id, day, &entries).await?;
    Ok("ok")
}

pub async fn list_presets(State(state): State<AppState>) -> Json<Vec<ActionPreset>> {
    Json(state.catalog.presets().to_vec())
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn days_have_actions(
    State(state): State<AppState>,
    BearerUser(user): BearerUser,
    query: Result<Query<DaysQuery>, QueryRejection>,
) -> AppResult<Json<Vec<u8>>> {
    let Query(query) = query?;
    let raw = query
        .date_month
        .ok_or_else(|| AppError::bad_request("date_month is required"))?;
    let month = parse_month(&raw)?;
    let scope = parse_year_scope(query.year.as_deref(), current_year())?;

    let days = days_with_actions(state.records.as_ref(), user.id, month, scope).await?;
    Ok(Json(days))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn data_of_years(
    State(state): State<AppState>,
    BearerUser(user): BearerUser,
    query: Result<Query<YearQuery>, QueryRejection>,
) -> AppResult<Json<Vec<CapacityPoint>>> {
    let Query(query) = query?;
    let year = check_year(query.year.unwrap_or_else(current_year))?;

    let points = capacity_of_year(state.records.as_ref(), user.id, year).await?;
    Ok(Json(points))
}

use crate::aggregate::{count_occurrences, refresh, DashboardDatasets, DateRange, OccurrenceCounts};
use crate::errors::AppError;
use crate::filters::CaseFilter;
use crate::model_stats::{AgeProbability, ClassAccuracy, FeatureImportance, ModelStats};
use crate::models::{
    CaseQuery, CorrelationResponse, LocationPoint, MessageResponse, RangeQuery, ReloadResponse,
    SexAgePoint,
};
use crate::records::{validate_case, CaseRecord};
use crate::state::AppState;
use crate::stats::{age_type_correlation, location_points, sex_age_points, victim_ages};
use crate::storage::{persist_cases, try_load_cases};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde_json::Value;
use tracing::{error, info};

pub async fn index() -> Html<String> {
    Html(render_index(chrono::Local::now().date_naive()))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<DashboardDatasets>, AppError> {
    let range = DateRange::parse(query.start.as_deref(), query.end.as_deref())?;
    let cases = state.cases.lock().await;
    Ok(Json(refresh(&cases, &range, &state.category_path)))
}

/// Replaces the cached collection; on a read or parse error the cache is kept.
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let cases = try_load_cases(&state.cases_path).await.inspect_err(|err| {
        error!("reload aborted, keeping cached cases: {}", err.message);
    })?;
    let total = state.replace_cases(cases).await;
    info!("reloaded {total} cases");
    Ok(Json(ReloadResponse { total }))
}

pub async fn list_cases(
    State(state): State<AppState>,
    Query(query): Query<CaseQuery>,
) -> Result<Json<Vec<CaseRecord>>, AppError> {
    let filter = to_filter(&query)?;
    let cases = state.cases.lock().await;
    Ok(Json(filter.apply(&cases)))
}

pub async fn create_case(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    validate_case(&payload).map_err(|reason| AppError::bad_request(format!("invalid case: {reason}")))?;

    let mut cases = state.cases.lock().await;
    cases.push(CaseRecord::new(payload));
    if let Err(err) = persist_cases(&state.cases_path, &cases).await {
        cases.pop();
        return Err(err);
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "case created".to_owned(),
        }),
    ))
}

pub async fn get_case(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<CaseRecord>, AppError> {
    let cases = state.cases.lock().await;
    cases
        .iter()
        .find(|case| case.date_str() == Some(date.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("case not found"))
}

pub async fn delete_case(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut cases = state.cases.lock().await;
    let position = cases
        .iter()
        .position(|case| case.date_str() == Some(date.as_str()))
        .ok_or_else(|| AppError::not_found("case not found"))?;

    let removed = cases.remove(position);
    if let Err(err) = persist_cases(&state.cases_path, &cases).await {
        cases.insert(position, removed);
        return Err(err);
    }

    Ok(Json(MessageResponse {
        message: "case deleted".to_owned(),
    }))
}

pub async fn type_distribution(
    State(state): State<AppState>,
    Query(query): Query<CaseQuery>,
) -> Result<Json<OccurrenceCounts>, AppError> {
    let filter = to_filter(&query)?;
    let cases = state.cases.lock().await;
    let filtered = filter.apply(&cases);
    Ok(Json(count_occurrences(&filtered, &state.category_path)))
}

pub async fn ages(State(state): State<AppState>) -> Json<Vec<f64>> {
    let cases = state.cases.lock().await;
    Json(victim_ages(&cases))
}

pub async fn locations(State(state): State<AppState>) -> Json<Vec<LocationPoint>> {
    let cases = state.cases.lock().await;
    Json(location_points(&cases))
}

pub async fn sex_boxplot(State(state): State<AppState>) -> Json<Vec<SexAgePoint>> {
    let cases = state.cases.lock().await;
    Json(sex_age_points(&cases))
}

pub async fn model_coefs(State(state): State<AppState>) -> Result<Json<Vec<FeatureImportance>>, AppError> {
    Ok(Json(model_stats(&state)?.ranked_importances()))
}

pub async fn model_age_probabilities(
    State(state): State<AppState>,
) -> Result<Json<Vec<AgeProbability>>, AppError> {
    Ok(Json(model_stats(&state)?.age_probabilities.clone()))
}

pub async fn model_accuracy(State(state): State<AppState>) -> Result<Json<ClassAccuracy>, AppError> {
    Ok(Json(model_stats(&state)?.accuracy.clone()))
}

pub async fn model_correlations(
    State(state): State<AppState>,
) -> Result<Json<CorrelationResponse>, AppError> {
    let cases = state.cases.lock().await;
    age_type_correlation(&cases)
        .map(Json)
        .ok_or_else(|| AppError::unprocessable("not enough varied cases to correlate age and type"))
}

fn model_stats(state: &AppState) -> Result<&ModelStats, AppError> {
    (*state.model_stats)
        .as_ref()
        .ok_or_else(|| AppError::not_found("model statistics are not available"))
}

fn to_filter(query: &CaseQuery) -> Result<CaseFilter, AppError> {
    CaseFilter::parse(
        query.sexo.as_deref(),
        query.etnia.as_deref(),
        query.idade_min.as_deref(),
        query.idade_max.as_deref(),
        query.data_inicio.as_deref(),
        query.data_fim.as_deref(),
    )
    .map_err(AppError::from)
}

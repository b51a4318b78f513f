use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/reload", post(handlers::reload))
        .route("/api/cases", get(handlers::list_cases).post(handlers::create_case))
        .route("/api/cases/:date", get(handlers::get_case).delete(handlers::delete_case))
        .route("/api/stats/type-distribution", get(handlers::type_distribution))
        .route("/api/stats/ages", get(handlers::ages))
        .route("/api/stats/locations", get(handlers::locations))
        .route("/api/stats/sex-boxplot", get(handlers::sex_boxplot))
        .route("/api/model/coefs", get(handlers::model_coefs))
        .route("/api/model/age-probabilities", get(handlers::model_age_probabilities))
        .route("/api/model/accuracy", get(handlers::model_accuracy))
        .route("/api/model/correlations", get(handlers::model_correlations))
        .with_state(state)
}

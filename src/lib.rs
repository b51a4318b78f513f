pub mod aggregate;
pub mod app;
pub mod config;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod model_stats;
pub mod models;
pub mod records;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use aggregate::{bin_ages, count_occurrences, filter_by_range, refresh, DateRange};
pub use app::router;
pub use config::Config;
pub use records::{CaseRecord, FieldPath};
pub use state::AppState;
pub use storage::{load_cases, load_model_stats};

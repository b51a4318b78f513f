use crate::config::Config;
use crate::model_stats::ModelStats;
use crate::records::{CaseRecord, FieldPath};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub cases_path: PathBuf,
    pub category_path: FieldPath,
    pub cases: Arc<Mutex<Vec<CaseRecord>>>,
    pub model_stats: Arc<Option<ModelStats>>,
}

impl AppState {
    pub fn new(config: &Config, cases: Vec<CaseRecord>, model_stats: Option<ModelStats>) -> Self {
        Self {
            cases_path: config.cases_path.clone(),
            category_path: config.category_path.clone(),
            cases: Arc::new(Mutex::new(cases)),
            model_stats: Arc::new(model_stats),
        }
    }

    /// Swaps in a freshly loaded collection, returning its size.
    pub async fn replace_cases(&self, cases: Vec<CaseRecord>) -> usize {
        let mut guard = self.cases.lock().await;
        *guard = cases;
        guard.len()
    }
}

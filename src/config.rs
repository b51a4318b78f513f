use crate::records::{FieldPath, CATEGORY_FIELD};
use std::{env, path::PathBuf};

/// Runtime settings, read once from the environment at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cases_path: PathBuf,
    pub model_stats_path: PathBuf,
    pub category_path: FieldPath,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);
        let cases_path = lookup("CASES_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/cases.json"));
        let model_stats_path = lookup("MODEL_STATS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/model_stats.json"));
        let category_path = lookup("CASE_CATEGORY_PATH")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| CATEGORY_FIELD.to_owned());

        Self {
            port,
            cases_path,
            model_stats_path,
            category_path: FieldPath::parse(category_path.trim()),
        }
    }
}

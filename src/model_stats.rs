use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics exported by the offline training job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelStats {
    #[serde(default)]
    pub feature_importances: BTreeMap<String, f64>,
    #[serde(default)]
    pub age_probabilities: Vec<AgeProbability>,
    #[serde(default)]
    pub accuracy: ClassAccuracy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeProbability {
    pub faixa: String,
    pub probabilidades: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassAccuracy {
    pub classes: Vec<String>,
    pub precisao: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

impl ModelStats {
    /// Importances ordered by descending magnitude; ties keep name order.
    pub fn ranked_importances(&self) -> Vec<FeatureImportance> {
        let mut ranked: Vec<FeatureImportance> = self
            .feature_importances
            .iter()
            .map(|(feature, importance)| FeatureImportance {
                feature: feature.clone(),
                importance: *importance,
            })
            .collect();
        ranked.sort_by(|a, b| b.importance.abs().total_cmp(&a.importance.abs()));
        ranked
    }
}

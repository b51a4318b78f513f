use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Query string accepted by the case listing and distribution endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseQuery {
    pub sexo: Option<String>,
    pub etnia: Option<String>,
    pub idade_min: Option<String>,
    pub idade_max: Option<String>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationPoint {
    pub bairro: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexAgePoint {
    pub sexo: String,
    pub idade: f64,
    pub tipo_do_caso: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResponse {
    pub variaveis: Vec<String>,
    pub matriz: [[f64; 2]; 2],
}

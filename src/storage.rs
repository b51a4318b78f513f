use crate::errors::AppError;
use crate::model_stats::ModelStats;
use crate::records::CaseRecord;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

/// Start-up loader: any failure is logged and yields an empty collection.
pub async fn load_cases(path: &Path) -> Vec<CaseRecord> {
    match try_load_cases(path).await {
        Ok(cases) => cases,
        Err(err) => {
            error!("{}", err.message);
            Vec::new()
        }
    }
}

/// Strict loader used on reload; only a missing file counts as empty.
pub async fn try_load_cases(path: &Path) -> Result<Vec<CaseRecord>, AppError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("cases file {} not found, starting empty", path.display());
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(AppError::internal_message(format!("failed to read cases file: {err}")));
        }
    };
    let cases: Vec<CaseRecord> = serde_json::from_slice(&bytes)
        .map_err(|err| AppError::internal_message(format!("failed to parse cases file: {err}")))?;
    info!("loaded {} cases from {}", cases.len(), path.display());
    Ok(cases)
}

pub async fn persist_cases(path: &Path, cases: &[CaseRecord]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(cases).map_err(AppError::internal)?;
    fs::write(path, payload).await?;
    Ok(())
}

pub async fn load_model_stats(path: &Path) -> Option<ModelStats> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(stats) => Some(stats),
            Err(err) => {
                error!("failed to parse model stats file: {err}");
                None
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("model stats file {} not found, model endpoints disabled", path.display());
            None
        }
        Err(err) => {
            error!("failed to read model stats file: {err}");
            None
        }
    }
}

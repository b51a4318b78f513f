use crate::models::{CorrelationResponse, LocationPoint, SexAgePoint};
use crate::records::CaseRecord;
use std::collections::BTreeSet;

const NEIGHBOURHOODS: [(&str, f64, f64); 4] = [
    ("Centro", -23.5505, -46.6333),
    ("Bairro A", -23.55, -46.65),
    ("Bairro B", -23.52, -46.66),
    ("Zona Rural", -23.6, -46.7),
];

pub fn coordinates(neighbourhood: &str) -> Option<(f64, f64)> {
    NEIGHBOURHOODS
        .iter()
        .find(|(name, _, _)| *name == neighbourhood)
        .map(|(_, lat, lon)| (*lat, *lon))
}

/// One point per case whose neighbourhood has known coordinates.
pub fn location_points(records: &[CaseRecord]) -> Vec<LocationPoint> {
    records
        .iter()
        .filter_map(|record| {
            let bairro = record.location()?;
            let (lat, lon) = coordinates(bairro)?;
            Some(LocationPoint {
                bairro: bairro.to_owned(),
                lat,
                lon,
            })
        })
        .collect()
}

pub fn victim_ages(records: &[CaseRecord]) -> Vec<f64> {
    records.iter().filter_map(CaseRecord::raw_victim_age).collect()
}

pub fn sex_age_points(records: &[CaseRecord]) -> Vec<SexAgePoint> {
    records
        .iter()
        .filter_map(|record| {
            let sexo = record.victim_sex().filter(|s| !s.is_empty())?;
            let idade = record.raw_victim_age()?;
            let tipo = record.category().filter(|t| !t.is_empty())?;
            Some(SexAgePoint {
                sexo: sexo.to_owned(),
                idade,
                tipo_do_caso: tipo.to_owned(),
            })
        })
        .collect()
}

/// Pearson coefficient between victim age and the label-encoded case type.
///
/// Case types are encoded by their position among the sorted distinct types.
/// Returns `None` when fewer than two usable rows exist or either series is
/// constant.
pub fn age_type_correlation(records: &[CaseRecord]) -> Option<CorrelationResponse> {
    let rows: Vec<(f64, &str)> = records
        .iter()
        .filter_map(|record| Some((record.raw_victim_age()?, record.category()?)))
        .collect();
    if rows.len() < 2 {
        return None;
    }

    let classes: BTreeSet<&str> = rows.iter().map(|(_, class)| *class).collect();
    let encode = |class: &str| classes.iter().position(|c| *c == class).unwrap_or_default() as f64;
    let xs: Vec<f64> = rows.iter().map(|(age, _)| *age).collect();
    let ys: Vec<f64> = rows.iter().map(|(_, class)| encode(*class)).collect();

    let value = pearson(&xs, &ys)?;
    let value = (value * 10_000.0).round() / 10_000.0;
    Some(CorrelationResponse {
        variaveis: vec!["idade".to_owned(), "tipo_do_caso_codificado".to_owned()],
        matriz: [[1.0, value], [value, 1.0]],
    })
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(cov / denom)
}

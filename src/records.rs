use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DATE_FIELD: &str = "data_do_caso";
pub const CATEGORY_FIELD: &str = "tipo_do_caso";
pub const LOCATION_FIELD: &str = "localizacao";
pub const VICTIM_FIELD: &str = "vitima";
pub const MAX_VICTIM_AGE: f64 = 150.0;

pub type CaseDate = DateTime<Utc>;

/// A single case as delivered by the record source.
///
/// The payload is kept as raw JSON; the dashboard only ever reads it through
/// [`FieldPath`] lookups and the typed accessors below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseRecord(Value);

impl CaseRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path.resolve(&self.0)
    }

    pub fn date_str(&self) -> Option<&str> {
        self.0.get(DATE_FIELD).and_then(Value::as_str)
    }

    /// `None` when the date attribute is absent or not in a recognised format.
    pub fn date(&self) -> Option<CaseDate> {
        self.date_str().and_then(parse_case_date)
    }

    pub fn category(&self) -> Option<&str> {
        self.0.get(CATEGORY_FIELD).and_then(Value::as_str)
    }

    pub fn location(&self) -> Option<&str> {
        self.0.get(LOCATION_FIELD).and_then(Value::as_str)
    }

    fn victim_attr(&self, name: &str) -> Option<&Value> {
        self.0.get(VICTIM_FIELD).and_then(|victim| victim.get(name))
    }

    /// Victim age, only when it is a strictly positive number.
    pub fn victim_age(&self) -> Option<f64> {
        self.raw_victim_age().filter(|age| *age > 0.0)
    }

    /// Victim age as stored, any numeric value.
    pub fn raw_victim_age(&self) -> Option<f64> {
        self.victim_attr("idade").and_then(Value::as_f64)
    }

    pub fn victim_sex(&self) -> Option<&str> {
        self.victim_attr("sexo").and_then(Value::as_str)
    }

    pub fn victim_ethnicity(&self) -> Option<&str> {
        self.victim_attr("etnia").and_then(Value::as_str)
    }
}

impl From<Value> for CaseRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Dot separated attribute path such as `vitima.idade`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path.split('.').map(str::to_owned).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walks the path, stopping at the first missing attribute.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| match node {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// `null`, `false`, zero and the empty string count as "no value".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn display_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn parse_case_date(raw: &str) -> Option<CaseDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Checks that a submitted case carries every attribute the dashboard reads.
pub fn validate_case(value: &Value) -> Result<(), &'static str> {
    let victim = value
        .get(VICTIM_FIELD)
        .and_then(Value::as_object)
        .ok_or("vitima must be an object")?;
    if !["etnia", "idade", "sexo"].iter().all(|key| victim.contains_key(*key)) {
        return Err("vitima must contain etnia, idade and sexo");
    }
    if !victim
        .get("idade")
        .and_then(Value::as_f64)
        .is_some_and(|age| (0.0..=MAX_VICTIM_AGE).contains(&age))
    {
        return Err("vitima.idade must be a number between 0 and 150");
    }
    value
        .get(DATE_FIELD)
        .and_then(Value::as_str)
        .and_then(parse_case_date)
        .ok_or("data_do_caso must be an ISO date")?;
    if !value.get(CATEGORY_FIELD).is_some_and(Value::is_string) {
        return Err("tipo_do_caso must be a string");
    }
    if !value.get(LOCATION_FIELD).is_some_and(Value::is_string) {
        return Err("localizacao must be a string");
    }
    Ok(())
}

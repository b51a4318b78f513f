use crate::aggregate::{DateRange, InvalidDate};
use crate::records::CaseRecord;

/// Sentinel sent by the dashboard's select boxes for "no filter".
pub const ANY: &str = "todos";

/// Attribute filters applied by the case listing and distribution endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseFilter {
    pub sex: Option<String>,
    pub ethnicity: Option<String>,
    pub min_age: Option<f64>,
    pub max_age: Option<f64>,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    Date(InvalidDate),
    Age(String),
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::Date(err) => write!(f, "{err}"),
            FilterError::Age(raw) => write!(f, "invalid age '{raw}', expected an integer"),
        }
    }
}

impl std::error::Error for FilterError {}

impl From<InvalidDate> for FilterError {
    fn from(err: InvalidDate) -> Self {
        FilterError::Date(err)
    }
}

impl CaseFilter {
    pub fn parse(
        sex: Option<&str>,
        ethnicity: Option<&str>,
        min_age: Option<&str>,
        max_age: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            sex: selection(sex),
            ethnicity: selection(ethnicity),
            min_age: parse_age(min_age)?,
            max_age: parse_age(max_age)?,
            range: DateRange::parse(start, end)?,
        })
    }

    pub fn matches(&self, record: &CaseRecord) -> bool {
        if let Some(sex) = &self.sex {
            if record.victim_sex() != Some(sex.as_str()) {
                return false;
            }
        }
        if let Some(ethnicity) = &self.ethnicity {
            if record.victim_ethnicity() != Some(ethnicity.as_str()) {
                return false;
            }
        }
        if self.min_age.is_some() || self.max_age.is_some() {
            let Some(age) = record.raw_victim_age() else {
                return false;
            };
            if self.min_age.is_some_and(|min| age < min) || self.max_age.is_some_and(|max| age > max) {
                return false;
            }
        }
        self.range.contains(record.date())
    }

    pub fn apply(&self, records: &[CaseRecord]) -> Vec<CaseRecord> {
        records.iter().filter(|record| self.matches(record)).cloned().collect()
    }
}

fn selection(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && *value != ANY)
        .map(str::to_owned)
}

fn parse_age(raw: Option<&str>) -> Result<Option<f64>, FilterError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(|age| Some(age as f64))
            .map_err(|_| FilterError::Age(s.to_owned())),
    }
}

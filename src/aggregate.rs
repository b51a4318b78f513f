use crate::records::{display_key, is_truthy, CaseDate, CaseRecord, FieldPath, MAX_VICTIM_AGE};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const AGE_BIN_WIDTH: u32 = 10;
pub const MIN_AGE_SPAN: f64 = 100.0;
/// Ages above this share the top bin.
pub const MAX_AGE_SPAN: f64 = MAX_VICTIM_AGE;

/// Inclusive date bounds; a missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDate(pub String);

impl std::fmt::Display for InvalidDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid date '{}', expected YYYY-MM-DD", self.0)
    }
}

impl std::error::Error for InvalidDate {}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Parses the bounds as sent by a date input; blank means absent.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, InvalidDate> {
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Undated records fail every bound that is present.
    pub fn contains(&self, date: Option<CaseDate>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        let after_start = self.start.is_none_or(|start| date >= bound_instant(start));
        let before_end = self.end.is_none_or(|end| date <= bound_instant(end));
        after_start && before_end
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<NaiveDate>, InvalidDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| InvalidDate(s.to_owned())),
    }
}

fn bound_instant(date: NaiveDate) -> CaseDate {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Category counts in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceCounts {
    entries: IndexMap<String, u64>,
}

impl OccurrenceCounts {
    pub fn increment(&mut self, key: String) {
        *self.entries.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.values().sum()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }
}

impl Serialize for OccurrenceCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeHistogram {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

impl AgeHistogram {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Everything the charts need, computed from one filtered snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardDatasets {
    pub range: DateRange,
    pub category_path: String,
    pub total: usize,
    pub occurrence_counts: OccurrenceCounts,
    pub age_bins: AgeHistogram,
}

pub fn count_occurrences(records: &[CaseRecord], path: &FieldPath) -> OccurrenceCounts {
    let mut counts = OccurrenceCounts::default();
    for value in records.iter().filter_map(|record| record.get(path)) {
        if is_truthy(value) {
            counts.increment(display_key(value));
        }
    }
    counts
}

pub fn bin_ages(records: &[CaseRecord]) -> AgeHistogram {
    let ages: Vec<f64> = records.iter().filter_map(CaseRecord::victim_age).collect();
    let span = ages
        .iter()
        .copied()
        .fold(MIN_AGE_SPAN, f64::max)
        .min(MAX_AGE_SPAN);
    let bin_count = (span / f64::from(AGE_BIN_WIDTH)).ceil() as usize;

    let mut counts = vec![0u64; bin_count];
    for age in ages {
        // ages below 1 still belong to the first bin
        let index = ((age - 1.0) / f64::from(AGE_BIN_WIDTH)).floor().max(0.0) as usize;
        counts[index.min(bin_count - 1)] += 1;
    }

    let labels = (0..bin_count as u32)
        .map(|i| {
            let low = i * AGE_BIN_WIDTH + 1;
            format!("{low}-{}", low + AGE_BIN_WIDTH - 1)
        })
        .collect();

    AgeHistogram { labels, counts }
}

pub fn filter_by_range(records: &[CaseRecord], range: &DateRange) -> Vec<CaseRecord> {
    records
        .iter()
        .filter(|record| range.contains(record.date()))
        .cloned()
        .collect()
}

pub fn refresh(records: &[CaseRecord], range: &DateRange, category: &FieldPath) -> DashboardDatasets {
    let filtered = filter_by_range(records, range);
    DashboardDatasets {
        range: *range,
        category_path: category.to_string(),
        total: filtered.len(),
        occurrence_counts: count_occurrences(&filtered, category),
        age_bins: bin_ages(&filtered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn records(values: Vec<Value>) -> Vec<CaseRecord> {
        values.into_iter().map(CaseRecord::new).collect()
    }

    fn aged(ages: &[Value]) -> Vec<CaseRecord> {
        records(ages.iter().map(|age| json!({ "vitima": { "idade": age } })).collect())
    }

    fn dated(dates: &[&str]) -> Vec<CaseRecord> {
        records(dates.iter().map(|date| json!({ "data_do_caso": date })).collect())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn counts_skip_falsy_categories() {
        let cases = records(vec![
            json!({ "tipo_do_caso": "A" }),
            json!({ "tipo_do_caso": "A" }),
            json!({ "tipo_do_caso": "B" }),
            json!({ "tipo_do_caso": null }),
        ]);
        let counts = count_occurrences(&cases, &FieldPath::parse("tipo_do_caso"));
        assert_eq!(counts.get("A"), Some(2));
        assert_eq!(counts.get("B"), Some(1));
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn counts_keep_first_seen_order_and_serialize_as_object() {
        let cases = records(vec![
            json!({ "tipo_do_caso": "Tráfico" }),
            json!({ "tipo_do_caso": "Furto" }),
            json!({ "tipo_do_caso": "Tráfico" }),
            json!({ "tipo_do_caso": 0 }),
            json!({ "tipo_do_caso": "" }),
            json!({}),
        ]);
        let counts = count_occurrences(&cases, &FieldPath::parse("tipo_do_caso"));
        assert_eq!(counts.labels().collect::<Vec<_>>(), vec!["Tráfico", "Furto"]);
        assert_eq!(
            serde_json::to_string(&counts).unwrap(),
            r#"{"Tráfico":2,"Furto":1}"#
        );
    }

    #[test]
    fn counts_follow_nested_paths_and_stringify_values() {
        let cases = records(vec![
            json!({ "vitima": { "idade": 30 } }),
            json!({ "vitima": { "idade": 30 } }),
            json!({ "vitima": { "idade": 0 } }),
            json!({ "vitima": null }),
        ]);
        let counts = count_occurrences(&cases, &FieldPath::parse("vitima.idade"));
        assert_eq!(counts.get("30"), Some(2));
        assert_eq!(counts.total(), 2);
        assert!(count_occurrences(&cases, &FieldPath::parse("..")).is_empty());
    }

    #[test]
    fn counting_is_repeatable() {
        let cases = records(vec![json!({ "tipo_do_caso": "A" }), json!({ "tipo_do_caso": "B" })]);
        let path = FieldPath::parse("tipo_do_caso");
        assert_eq!(count_occurrences(&cases, &path), count_occurrences(&cases, &path));
    }

    #[test]
    fn empty_ages_still_produce_ten_bins() {
        let histogram = bin_ages(&[]);
        assert_eq!(histogram.labels.len(), 10);
        assert_eq!(histogram.counts, vec![0; 10]);
        assert_eq!(histogram.labels.first().map(String::as_str), Some("1-10"));
        assert_eq!(histogram.labels.last().map(String::as_str), Some("91-100"));
    }

    #[test]
    fn outlier_ages_extend_the_histogram() {
        let histogram = bin_ages(&aged(&[json!(5), json!(15), json!(25), json!(105)]));
        assert_eq!(histogram.counts.len(), 11);
        assert_eq!(histogram.counts[0], 1);
        assert_eq!(histogram.counts[1], 1);
        assert_eq!(histogram.counts[2], 1);
        assert_eq!(histogram.counts[10], 1);
        assert_eq!(histogram.labels[10], "101-110");
    }

    #[test]
    fn bin_edges_are_inclusive_on_the_high_end() {
        let histogram = bin_ages(&aged(&[json!(1), json!(10), json!(11), json!(100)]));
        assert_eq!(histogram.counts[0], 2);
        assert_eq!(histogram.counts[1], 1);
        assert_eq!(histogram.counts[9], 1);
    }

    #[test]
    fn fractional_age_above_the_floor_adds_a_bin() {
        let histogram = bin_ages(&aged(&[json!(100.5)]));
        assert_eq!(histogram.counts.len(), 11);
        assert_eq!(histogram.counts[9], 1);
        assert_eq!(histogram.total(), 1);
    }

    #[test]
    fn huge_ages_are_capped_into_the_top_bin() {
        let histogram = bin_ages(&aged(&[json!(1e20), json!(1e10), json!(151), json!(42)]));
        let expected_bins = (MAX_AGE_SPAN / f64::from(AGE_BIN_WIDTH)).ceil() as usize;
        assert_eq!(histogram.counts.len(), expected_bins);
        assert_eq!(histogram.labels.len(), expected_bins);
        assert_eq!(histogram.counts[expected_bins - 1], 3);
        assert_eq!(histogram.counts[4], 1);
    }

    #[test]
    fn every_positive_age_lands_in_exactly_one_bin() {
        let ages = [
            json!(0.01), json!(0.99), json!(1), json!(9.99), json!(10), json!(10.01), json!(11),
            json!(99.99), json!(100), json!(100.01), json!(109.5), json!(149.9), json!(150),
            json!(150.5), json!(1e6), json!(0), json!(-0.5), json!(null),
        ];
        let histogram = bin_ages(&aged(&ages));
        let positive = ages.iter().filter(|age| age.as_f64().is_some_and(|a| a > 0.0)).count();
        assert_eq!(histogram.total(), positive as u64);
        assert_eq!(histogram.labels.len(), histogram.counts.len());
        assert_eq!(histogram.counts.len(), 15);
        assert_eq!(histogram.counts[0], 6);
        assert_eq!(histogram.counts[1], 1);
        assert_eq!(histogram.counts[9], 3);
        assert_eq!(histogram.counts[10], 1);
        assert_eq!(histogram.counts[14], 4);
    }

    #[test]
    fn only_positive_ages_are_binned() {
        let mut cases = aged(&[json!(0), json!(-4), json!("20"), json!(null), json!(0.5), json!(33)]);
        cases.push(CaseRecord::new(json!({ "tipo_do_caso": "A" })));
        let histogram = bin_ages(&cases);
        assert_eq!(histogram.total(), 2);
        assert_eq!(histogram.counts[0], 1);
        assert_eq!(histogram.counts[3], 1);
    }

    #[test]
    fn range_keeps_only_dates_inside_bounds() {
        let cases = dated(&["2024-01-05", "2024-01-15", "2024-01-25"]);
        let range = DateRange::new(Some(ymd(2024, 1, 10)), Some(ymd(2024, 1, 20)));
        let filtered = filter_by_range(&cases, &range);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date_str(), Some("2024-01-15"));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let cases = dated(&["2024-01-10", "2024-01-20"]);
        let range = DateRange::new(Some(ymd(2024, 1, 10)), Some(ymd(2024, 1, 20)));
        assert_eq!(filter_by_range(&cases, &range), cases);
    }

    #[test]
    fn half_open_ranges() {
        let cases = dated(&["2024-01-05", "2024-01-15", "2024-01-25"]);
        let from = DateRange::new(Some(ymd(2024, 1, 15)), None);
        let until = DateRange::new(None, Some(ymd(2024, 1, 15)));
        assert_eq!(filter_by_range(&cases, &from).len(), 2);
        assert_eq!(filter_by_range(&cases, &until).len(), 2);
    }

    #[test]
    fn unbounded_range_is_identity() {
        let cases = dated(&["2024-01-05", "not a date", "2023-12-31"]);
        assert_eq!(filter_by_range(&cases, &DateRange::unbounded()), cases);
    }

    #[test]
    fn malformed_dates_are_excluded_by_any_bound() {
        let cases = dated(&["05/01/2024", "2024-01-15"]);
        let range = DateRange::new(Some(ymd(2000, 1, 1)), None);
        let filtered = filter_by_range(&cases, &range);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date_str(), Some("2024-01-15"));
    }

    #[test]
    fn widening_a_range_never_drops_records() {
        let cases = dated(&["2024-01-01", "2024-01-09", "2024-01-15", "2024-02-01", "2024-03-01"]);
        let narrow = DateRange::new(Some(ymd(2024, 1, 9)), Some(ymd(2024, 1, 31)));
        let wide = DateRange::new(Some(ymd(2024, 1, 1)), Some(ymd(2024, 2, 28)));
        let narrow_hits = filter_by_range(&cases, &narrow);
        let wide_hits = filter_by_range(&cases, &wide);
        assert!(narrow_hits.iter().all(|record| wide_hits.contains(record)));
        assert!(wide_hits.len() > narrow_hits.len());
    }

    #[test]
    fn parse_treats_blank_bounds_as_absent() {
        assert_eq!(DateRange::parse(Some(""), None).unwrap(), DateRange::unbounded());
        let range = DateRange::parse(Some("2024-01-10"), Some(" 2024-01-20 ")).unwrap();
        assert_eq!(range, DateRange::new(Some(ymd(2024, 1, 10)), Some(ymd(2024, 1, 20))));
        assert_eq!(
            DateRange::parse(Some("10/01/2024"), None),
            Err(InvalidDate("10/01/2024".to_owned()))
        );
    }

    #[test]
    fn refresh_aggregates_one_filtered_snapshot() {
        let cases = records(vec![
            json!({ "data_do_caso": "2024-01-05", "tipo_do_caso": "Furto", "vitima": { "idade": 20 } }),
            json!({ "data_do_caso": "2024-01-15", "tipo_do_caso": "Assalto", "vitima": { "idade": 44 } }),
            json!({ "data_do_caso": "2024-01-16", "tipo_do_caso": "Assalto", "vitima": { "idade": 0 } }),
            json!({ "data_do_caso": "2024-01-25", "tipo_do_caso": "Furto", "vitima": { "idade": 61 } }),
        ]);
        let range = DateRange::new(Some(ymd(2024, 1, 10)), Some(ymd(2024, 1, 20)));
        let datasets = refresh(&cases, &range, &FieldPath::parse("tipo_do_caso"));

        assert_eq!(datasets.total, 2);
        assert_eq!(datasets.occurrence_counts.get("Assalto"), Some(2));
        assert_eq!(datasets.occurrence_counts.get("Furto"), None);
        assert_eq!(datasets.age_bins.total(), 1);
        assert_eq!(datasets.age_bins.counts[4], 1);
        assert_eq!(datasets.category_path, "tipo_do_caso");
    }
}

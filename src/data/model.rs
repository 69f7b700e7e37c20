use std::collections::BTreeSet;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Record – one row of the mortality table
// ---------------------------------------------------------------------------

/// A single mortality observation (one row of the source table).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    /// Country name, as spelled in the source data.
    pub location: String,
    /// Calendar year of the estimate.
    pub year: i32,
    /// Age band label, e.g. `"0-4"` or `"15-49"`.
    pub age: String,
    /// `"Male"` or `"Female"`.
    pub sex: String,
    /// Estimated death count.
    pub val: f64,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed selection domains.
///
/// Built once at load time and only ever read afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All rows, in file order.
    pub records: Vec<Record>,
    /// Sorted set of distinct countries.
    pub locations: BTreeSet<String>,
    /// Sorted set of distinct years.
    pub years: BTreeSet<i32>,
}

impl Dataset {
    /// Build the selection domains from the loaded rows.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut locations = BTreeSet::new();
        let mut years = BTreeSet::new();
        for rec in &records {
            locations.insert(rec.location.clone());
            years.insert(rec.year);
        }
        Dataset {
            records,
            locations,
            years,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Country pre-selected when a dataset loads. The source data is
    /// Chad-centric; fall back to the alphabetically first country.
    pub fn default_location(&self) -> Option<&str> {
        const PREFERRED: &str = "Chad";
        if self.locations.contains(PREFERRED) {
            Some(PREFERRED)
        } else {
            self.locations.iter().next().map(String::as_str)
        }
    }

    /// Year pre-selected when a dataset loads (earliest on record).
    pub fn first_year(&self) -> Option<i32> {
        self.years.iter().next().copied()
    }
}

// ---------------------------------------------------------------------------
// Age band ordering
// ---------------------------------------------------------------------------

/// Sort key for age band labels: the numeric lower bound, so `"5-9"`
/// precedes `"10-14"`. `"<1"` sorts first, labels without digits last.
pub fn age_band_key(age: &str) -> u32 {
    if age.trim_start().starts_with('<') {
        return 0;
    }
    let digits: String = age
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(location: &str, year: i32, age: &str, sex: &str, val: f64) -> Record {
        Record {
            location: location.to_string(),
            year,
            age: age.to_string(),
            sex: sex.to_string(),
            val,
        }
    }

    #[test]
    fn domains_are_sorted_and_distinct() {
        let ds = Dataset::from_records(vec![
            rec("Mali", 2020, "0-4", "Male", 95.0),
            rec("Chad", 2019, "0-4", "Male", 110.0),
            rec("Chad", 2020, "0-4", "Female", 80.0),
        ]);
        assert_eq!(ds.len(), 3);
        let locations: Vec<_> = ds.locations.iter().cloned().collect();
        assert_eq!(locations, ["Chad", "Mali"]);
        let years: Vec<_> = ds.years.iter().copied().collect();
        assert_eq!(years, [2019, 2020]);
    }

    #[test]
    fn default_location_prefers_chad() {
        let ds = Dataset::from_records(vec![
            rec("Nigeria", 2020, "0-4", "Male", 1.0),
            rec("Chad", 2020, "0-4", "Male", 1.0),
        ]);
        assert_eq!(ds.default_location(), Some("Chad"));
    }

    #[test]
    fn default_location_falls_back_alphabetically() {
        let ds = Dataset::from_records(vec![
            rec("Uganda", 2020, "0-4", "Male", 1.0),
            rec("Mali", 2020, "0-4", "Male", 1.0),
        ]);
        assert_eq!(ds.default_location(), Some("Mali"));
    }

    #[test]
    fn age_bands_order_by_lower_bound() {
        let mut bands = vec!["70+", "10-14", "<1", "5-9", "0-4", "15-49"];
        bands.sort_by_key(|b| age_band_key(b));
        assert_eq!(bands, ["<1", "0-4", "5-9", "10-14", "15-49", "70+"]);
    }
}

use std::collections::BTreeMap;

use super::model::{Dataset, Record, age_band_key};

// ---------------------------------------------------------------------------
// AggregatedView – a grouped-and-summed slice of the dataset
// ---------------------------------------------------------------------------

/// Group keys with summed death counts, computed on demand for one chart
/// and discarded once the chart spec is built.
///
/// Keys are deterministically sorted, so views built from the same rows are
/// equal regardless of input row order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedView<K> {
    pub rows: Vec<(K, f64)>,
}

impl<K> AggregatedView<K> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum over all groups.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|(_, v)| v).sum()
    }
}

/// Two-dimensional pivot backing the grouped bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeSexPivot {
    /// Age bands in band order (the x axis).
    pub ages: Vec<String>,
    /// Per-sex series aligned to `ages`; cells with no rows are `0.0`.
    pub series: Vec<(String, Vec<f64>)>,
}

impl AgeSexPivot {
    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Rows matching the conjunction of the given equality constraints.
/// `None` leaves that dimension unconstrained.
pub fn filtered<'a>(
    dataset: &'a Dataset,
    location: Option<&str>,
    year: Option<i32>,
) -> Vec<&'a Record> {
    dataset
        .records
        .iter()
        .filter(|r| {
            location.map_or(true, |loc| r.location == loc) && year.map_or(true, |y| r.year == y)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Group-and-sum reductions
// ---------------------------------------------------------------------------

fn sum_by<K: Ord>(rows: &[&Record], key: impl Fn(&Record) -> K) -> BTreeMap<K, f64> {
    let mut groups: BTreeMap<K, f64> = BTreeMap::new();
    for &rec in rows {
        *groups.entry(key(rec)).or_default() += rec.val;
    }
    groups
}

/// Deaths per age band, in band order.
pub fn sum_by_age(rows: &[&Record]) -> AggregatedView<String> {
    let mut rows: Vec<(String, f64)> = sum_by(rows, |r| r.age.clone()).into_iter().collect();
    rows.sort_by(|(a, _), (b, _)| age_band_key(a).cmp(&age_band_key(b)).then(a.cmp(b)));
    AggregatedView { rows }
}

/// Deaths per sex, alphabetically.
pub fn sum_by_sex(rows: &[&Record]) -> AggregatedView<String> {
    AggregatedView {
        rows: sum_by(rows, |r| r.sex.clone()).into_iter().collect(),
    }
}

/// Deaths per country, alphabetically.
pub fn sum_by_location(rows: &[&Record]) -> AggregatedView<String> {
    AggregatedView {
        rows: sum_by(rows, |r| r.location.clone()).into_iter().collect(),
    }
}

/// Deaths per year, ascending.
pub fn sum_by_year(rows: &[&Record]) -> AggregatedView<i32> {
    AggregatedView {
        rows: sum_by(rows, |r| r.year).into_iter().collect(),
    }
}

/// Deaths per (age band, sex), pivoted so each sex series aligns with the
/// age axis. Cells with no matching rows hold `0.0`.
pub fn sum_by_age_sex(rows: &[&Record]) -> AgeSexPivot {
    let groups = sum_by(rows, |r| (r.age.clone(), r.sex.clone()));

    let mut ages: Vec<String> = groups.keys().map(|(age, _)| age.clone()).collect();
    ages.sort_by(|a, b| age_band_key(a).cmp(&age_band_key(b)).then(a.cmp(b)));
    ages.dedup();

    let mut sexes: Vec<String> = groups.keys().map(|(_, sex)| sex.clone()).collect();
    sexes.sort();
    sexes.dedup();

    let series = sexes
        .into_iter()
        .map(|sex| {
            let values = ages
                .iter()
                .map(|age| {
                    groups
                        .get(&(age.clone(), sex.clone()))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect();
            (sex, values)
        })
        .collect();

    AgeSexPivot { ages, series }
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

    fn fixture() -> Dataset {
        Dataset::from_records(vec![
            rec("Chad", 2020, "0-4", "Male", 120.0),
            rec("Chad", 2020, "0-4", "Female", 80.0),
            rec("Chad", 2020, "5-9", "Female", 30.0),
            rec("Chad", 2020, "10-14", "Male", 10.0),
            rec("Chad", 2019, "0-4", "Male", 140.0),
            rec("Mali", 2020, "0-4", "Male", 95.0),
            rec("Mali", 2018, "5-9", "Female", 12.0),
        ])
    }

    #[test]
    fn every_present_pair_sums_to_its_raw_rows() {
        let ds = fixture();
        for loc in &ds.locations {
            for &year in &ds.years {
                let raw: f64 = ds
                    .records
                    .iter()
                    .filter(|r| r.location == *loc && r.year == year)
                    .map(|r| r.val)
                    .sum();
                let rows = filtered(&ds, Some(loc.as_str()), Some(year));
                if raw == 0.0 {
                    assert!(rows.is_empty(), "{loc}/{year} should have no rows");
                } else {
                    assert!(!rows.is_empty(), "{loc}/{year} should have rows");
                    let view = sum_by_sex(&rows);
                    assert_eq!(view.total(), raw, "{loc}/{year} sum mismatch");
                }
            }
        }
    }

    #[test]
    fn absent_pair_yields_an_empty_view() {
        let ds = fixture();
        let rows = filtered(&ds, Some("Chad"), Some(1990));
        assert!(rows.is_empty());
        assert!(sum_by_sex(&rows).is_empty());
        assert!(sum_by_age(&rows).is_empty());
        assert!(sum_by_age_sex(&rows).is_empty());
    }

    #[test]
    fn single_constraint_filters() {
        let ds = fixture();
        assert_eq!(filtered(&ds, Some("Mali"), None).len(), 2);
        assert_eq!(filtered(&ds, None, Some(2020)).len(), 5);
        assert_eq!(filtered(&ds, None, None).len(), ds.len());
    }

    #[test]
    fn sex_donut_example_sums_duplicate_age_rows() {
        // Rows for Chad 2020, age 0-4: Male 120 and Female 80.
        let ds = Dataset::from_records(vec![
            rec("Chad", 2020, "0-4", "Male", 120.0),
            rec("Chad", 2020, "0-4", "Female", 80.0),
        ]);
        let rows = filtered(&ds, Some("Chad"), Some(2020));
        let view = sum_by_sex(&rows);
        assert_eq!(
            view.rows,
            vec![("Female".to_string(), 80.0), ("Male".to_string(), 120.0)]
        );
    }

    #[test]
    fn sex_grouping_is_invariant_to_row_order() {
        let ds = fixture();
        let mut reversed = ds.records.clone();
        reversed.reverse();
        let ds_rev = Dataset::from_records(reversed);

        let view = sum_by_sex(&filtered(&ds, Some("Chad"), Some(2020)));
        let view_rev = sum_by_sex(&filtered(&ds_rev, Some("Chad"), Some(2020)));
        assert_eq!(view, view_rev);
    }

    #[test]
    fn age_groups_come_out_in_band_order() {
        let ds = fixture();
        let view = sum_by_age(&filtered(&ds, Some("Chad"), Some(2020)));
        let bands: Vec<&str> = view.rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(bands, ["0-4", "5-9", "10-14"]);
    }

    #[test]
    fn years_come_out_ascending() {
        let ds = fixture();
        let view = sum_by_year(&filtered(&ds, Some("Chad"), None));
        assert_eq!(view.rows, vec![(2019, 140.0), (2020, 240.0)]);
    }

    #[test]
    fn pivot_aligns_series_and_fills_holes() {
        let ds = fixture();
        let pivot = sum_by_age_sex(&filtered(&ds, Some("Chad"), Some(2020)));
        assert_eq!(pivot.ages, ["0-4", "5-9", "10-14"]);
        assert_eq!(
            pivot.series,
            vec![
                ("Female".to_string(), vec![80.0, 30.0, 0.0]),
                ("Male".to_string(), vec![120.0, 0.0, 10.0]),
            ]
        );
    }

    #[test]
    fn location_sums_cover_all_countries_for_a_year() {
        let ds = fixture();
        let view = sum_by_location(&filtered(&ds, None, Some(2020)));
        assert_eq!(
            view.rows,
            vec![("Chad".to_string(), 240.0), ("Mali".to_string(), 95.0)]
        );
    }
}

use std::collections::BTreeMap;

use crate::chart::render;
use crate::chart::spec::ChartSpec;
use crate::data::aggregate;
use crate::data::model::Dataset;
use crate::predict::{PredictionResult, SymptomFlags, SymptomModel};

// ---------------------------------------------------------------------------
// Chart identity and selections
// ---------------------------------------------------------------------------

/// Identifies one of the five chart views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartId {
    AgeDonut,
    SexDonut,
    AgeSexBar,
    Map,
    Trend,
}

pub const ALL_CHARTS: [ChartId; 5] = [
    ChartId::AgeDonut,
    ChartId::SexDonut,
    ChartId::AgeSexBar,
    ChartId::Map,
    ChartId::Trend,
];

/// Country/year pair backing one chart's combo boxes. The map ignores
/// `country`, the trend line ignores `year`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub country: Option<String>,
    pub year: Option<i32>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// `dataset` and `model` are set once per load and only read afterwards;
/// everything else is rebuilt by the event handlers below.
pub struct AppState {
    /// Loaded dataset (None until a file loads).
    pub dataset: Option<Dataset>,

    /// Loaded classifier (None until an artifact loads).
    pub model: Option<SymptomModel>,

    /// Per-chart country/year selections.
    pub selections: BTreeMap<ChartId, Selection>,

    /// Chart specs, rebuilt per chart when its selection changes.
    charts: BTreeMap<ChartId, ChartSpec>,

    /// Symptom form checkboxes.
    pub symptoms: SymptomFlags,

    /// Last prediction, if the form was submitted successfully.
    pub prediction: Option<PredictionResult>,

    /// Inline error from the last form submission.
    pub prediction_error: Option<String>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            model: None,
            selections: BTreeMap::new(),
            charts: BTreeMap::new(),
            symptoms: SymptomFlags::default(),
            prediction: None,
            prediction_error: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: reset every selection to the default
    /// country and earliest year, then rebuild all five charts.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let country = dataset.default_location().map(str::to_string);
        let year = dataset.first_year();
        for chart in ALL_CHARTS {
            self.selections.insert(
                chart,
                Selection {
                    country: country.clone(),
                    year,
                },
            );
        }
        self.dataset = Some(dataset);
        self.status_message = None;
        self.rebuild_all();
    }

    /// Install a newly loaded classifier and clear any stale result.
    pub fn set_model(&mut self, model: SymptomModel) {
        self.model = Some(model);
        self.prediction = None;
        self.prediction_error = None;
    }

    /// The cached spec for one chart, if a dataset is loaded.
    pub fn chart(&self, chart: ChartId) -> Option<&ChartSpec> {
        self.charts.get(&chart)
    }

    // -- Event handlers ----------------------------------------------------

    /// Selection changed: update one chart's country and recompute only
    /// that chart.
    pub fn set_country(&mut self, chart: ChartId, country: String) {
        self.selections.entry(chart).or_default().country = Some(country);
        self.rebuild_chart(chart);
    }

    /// Selection changed: update one chart's year and recompute only that
    /// chart.
    pub fn set_year(&mut self, chart: ChartId, year: i32) {
        self.selections.entry(chart).or_default().year = Some(year);
        self.rebuild_chart(chart);
    }

    /// Form submitted: run the predictor once and stash the outcome.
    pub fn submit_symptoms(&mut self) {
        let Some(model) = &self.model else {
            self.prediction = None;
            self.prediction_error = Some("no model loaded".to_string());
            return;
        };

        match model.predict(&self.symptoms.to_features()) {
            Ok(result) => {
                log::info!(
                    "predicted label {} (p = {:.4})",
                    result.label,
                    result.probability
                );
                self.prediction = Some(result);
                self.prediction_error = None;
            }
            Err(e) => {
                log::error!("prediction failed: {e}");
                self.prediction = None;
                self.prediction_error = Some(e.to_string());
            }
        }
    }

    // -- Chart recomputation ----------------------------------------------

    pub fn rebuild_all(&mut self) {
        for chart in ALL_CHARTS {
            self.rebuild_chart(chart);
        }
    }

    fn rebuild_chart(&mut self, chart: ChartId) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let sel = self.selections.get(&chart).cloned().unwrap_or_default();
        let country = sel.country.clone().unwrap_or_default();
        let year = sel.year.unwrap_or_default();

        let spec = match chart {
            ChartId::AgeDonut => {
                let rows = aggregate::filtered(ds, sel.country.as_deref(), sel.year);
                render::age_donut(aggregate::sum_by_age(&rows), &country, year)
            }
            ChartId::SexDonut => {
                let rows = aggregate::filtered(ds, sel.country.as_deref(), sel.year);
                render::sex_donut(aggregate::sum_by_sex(&rows), &country, year)
            }
            ChartId::AgeSexBar => {
                let rows = aggregate::filtered(ds, sel.country.as_deref(), sel.year);
                render::age_sex_bar(aggregate::sum_by_age_sex(&rows), &country, year)
            }
            ChartId::Map => {
                let rows = aggregate::filtered(ds, None, sel.year);
                render::deaths_map(aggregate::sum_by_location(&rows), year)
            }
            ChartId::Trend => {
                let rows = aggregate::filtered(ds, sel.country.as_deref(), None);
                render::trend_line(aggregate::sum_by_year(&rows), &country)
            }
        };
        self.charts.insert(chart, spec);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use crate::predict::SYMPTOM_FIELDS;

    fn rec(location: &str, year: i32, age: &str, sex: &str, val: f64) -> Record {
        Record {
            location: location.to_string(),
            year,
            age: age.to_string(),
            sex: sex.to_string(),
            val,
        }
    }

    fn fixture_dataset() -> Dataset {
        Dataset::from_records(vec![
            rec("Chad", 2019, "0-4", "Male", 140.0),
            rec("Chad", 2020, "0-4", "Male", 120.0),
            rec("Chad", 2020, "0-4", "Female", 80.0),
            rec("Mali", 2020, "0-4", "Male", 95.0),
        ])
    }

    fn fixture_model() -> SymptomModel {
        SymptomModel {
            schema: SYMPTOM_FIELDS.iter().map(|s| s.to_string()).collect(),
            coefficients: vec![1.6, 0.9, 1.1, 0.7, 0.5, 0.4, 0.6, 0.5, 0.3],
            intercept: -2.0,
            positive_class: 1,
        }
    }

    #[test]
    fn loading_a_dataset_defaults_selections_and_builds_all_charts() {
        let mut state = AppState::default();
        state.set_dataset(fixture_dataset());

        for chart in ALL_CHARTS {
            let sel = &state.selections[&chart];
            assert_eq!(sel.country.as_deref(), Some("Chad"));
            assert_eq!(sel.year, Some(2019));
            assert!(state.chart(chart).is_some());
        }
        assert_eq!(
            state.chart(ChartId::AgeDonut).unwrap().title(),
            "Deaths by Age Group – Chad (2019)"
        );
    }

    #[test]
    fn changing_one_selection_rebuilds_only_that_chart() {
        let mut state = AppState::default();
        state.set_dataset(fixture_dataset());

        let sex_before = state.chart(ChartId::SexDonut).unwrap().clone();
        state.set_country(ChartId::AgeDonut, "Mali".to_string());

        assert_eq!(
            state.chart(ChartId::AgeDonut).unwrap().title(),
            "Deaths by Age Group – Mali (2019)"
        );
        assert_eq!(state.chart(ChartId::SexDonut).unwrap(), &sex_before);
    }

    #[test]
    fn selection_without_matching_rows_yields_an_empty_chart() {
        let mut state = AppState::default();
        state.set_dataset(fixture_dataset());

        // Mali has no 2019 rows
        state.set_country(ChartId::SexDonut, "Mali".to_string());
        assert!(state.chart(ChartId::SexDonut).unwrap().is_empty());

        state.set_year(ChartId::SexDonut, 2020);
        assert!(!state.chart(ChartId::SexDonut).unwrap().is_empty());
    }

    #[test]
    fn submitting_without_a_model_is_an_inline_error() {
        let mut state = AppState::default();
        state.submit_symptoms();
        assert!(state.prediction.is_none());
        assert!(state.prediction_error.is_some());
    }

    #[test]
    fn submitting_the_form_stores_a_result() {
        let mut state = AppState::default();
        state.set_model(fixture_model());
        state.symptoms.fever = true;
        state.submit_symptoms();

        let result = state.prediction.expect("prediction");
        assert!(state.prediction_error.is_none());
        assert!(result.probability > 0.0 && result.probability < 1.0);
    }
}

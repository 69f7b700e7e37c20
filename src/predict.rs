use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symptom fields the classifier was trained on, in training order.
pub const SYMPTOM_FIELDS: [&str; 9] = [
    "Fever",
    "Headache",
    "Chills",
    "Sweating",
    "Fatigue",
    "Nausea",
    "Vomiting",
    "Muscle_Pain",
    "Diarrhea",
];

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Failures loading the serialized model artifact. Same policy as dataset
/// loading: fatal at startup, a status message from the Open dialog.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("artifact has {coefficients} coefficients for {features} schema features")]
    CoefficientMismatch {
        coefficients: usize,
        features: usize,
    },
    #[error("positive_class must be 0 or 1, got {0}")]
    InvalidPositiveClass(u8),
}

/// A feature vector that does not match the schema the model was trained
/// on. Validated before every invocation; recoverable — the form stays
/// usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeatureSchemaError {
    #[error("missing feature '{0}'")]
    MissingFeature(String),
    #[error("unexpected feature '{0}'")]
    UnexpectedFeature(String),
    #[error("duplicate feature '{0}'")]
    DuplicateFeature(String),
    #[error("feature {index}: expected '{expected}', got '{actual}'")]
    OrderMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
}

// ---------------------------------------------------------------------------
// FeatureVector – the model's input
// ---------------------------------------------------------------------------

/// Ordered symptom flags submitted to the classifier. Built fresh per form
/// submission; name order must match the artifact schema exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    flags: Vec<(String, bool)>,
}

impl FeatureVector {
    pub fn new<S: Into<String>>(flags: Vec<(S, bool)>) -> Self {
        FeatureVector {
            flags: flags.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(|(n, _)| n.as_str())
    }

    /// Flags as the 0/1 values the model was trained on.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.flags.iter().map(|(_, v)| if *v { 1.0 } else { 0.0 })
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Checklist state behind the symptom form, one flag per trained feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymptomFlags {
    pub fever: bool,
    pub headache: bool,
    pub chills: bool,
    pub sweating: bool,
    pub fatigue: bool,
    pub nausea: bool,
    pub vomiting: bool,
    pub muscle_pain: bool,
    pub diarrhea: bool,
}

impl SymptomFlags {
    /// The feature vector in the exact order the classifier was trained on.
    pub fn to_features(&self) -> FeatureVector {
        let values = [
            self.fever,
            self.headache,
            self.chills,
            self.sweating,
            self.fatigue,
            self.nausea,
            self.vomiting,
            self.muscle_pain,
            self.diarrhea,
        ];
        FeatureVector::new(SYMPTOM_FIELDS.iter().copied().zip(values).collect())
    }
}

// ---------------------------------------------------------------------------
// SymptomModel – the pre-trained classifier
// ---------------------------------------------------------------------------

/// Outcome of a single predictor invocation. Exists only for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// Predicted class label.
    pub label: u8,
    /// Probability of the positive class, regardless of `label`.
    pub probability: f64,
}

/// A pre-trained logistic-regression classifier, deserialized from the
/// JSON artifact exported by the training pipeline. Loaded once per
/// session and only ever read afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomModel {
    /// Feature names, in training order.
    pub schema: Vec<String>,
    /// One weight per schema entry.
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Which class label `probability` refers to.
    #[serde(default = "default_positive_class")]
    pub positive_class: u8,
}

fn default_positive_class() -> u8 {
    1
}

/// Load a model artifact from a JSON file.
pub fn load_model(path: &Path) -> Result<SymptomModel, ModelLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model: SymptomModel = serde_json::from_str(&text)?;
    if model.coefficients.len() != model.schema.len() {
        return Err(ModelLoadError::CoefficientMismatch {
            coefficients: model.coefficients.len(),
            features: model.schema.len(),
        });
    }
    if model.positive_class > 1 {
        return Err(ModelLoadError::InvalidPositiveClass(model.positive_class));
    }
    Ok(model)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl SymptomModel {
    /// Check the vector against the trained schema: every field present,
    /// nothing extra, nothing duplicated, training order preserved.
    fn validate(&self, features: &FeatureVector) -> Result<(), FeatureSchemaError> {
        for expected in &self.schema {
            if !features.names().any(|n| n == expected) {
                return Err(FeatureSchemaError::MissingFeature(expected.clone()));
            }
        }
        for name in features.names() {
            if !self.schema.iter().any(|s| s == name) {
                return Err(FeatureSchemaError::UnexpectedFeature(name.to_string()));
            }
        }
        let mut seen = BTreeSet::new();
        for name in features.names() {
            if !seen.insert(name) {
                return Err(FeatureSchemaError::DuplicateFeature(name.to_string()));
            }
        }
        for (index, (expected, actual)) in self.schema.iter().zip(features.names()).enumerate() {
            if expected != actual {
                return Err(FeatureSchemaError::OrderMismatch {
                    index,
                    expected: expected.clone(),
                    actual: actual.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Score a feature vector. Deterministic; schema mismatches fail before
    /// the model is invoked rather than silently mis-predicting.
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, FeatureSchemaError> {
        self.validate(features)?;

        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.values())
                .map(|(w, x)| w * x)
                .sum::<f64>();
        let probability = sigmoid(z);
        let label = if probability >= 0.5 {
            self.positive_class
        } else {
            1 - self.positive_class
        };
        Ok(PredictionResult { label, probability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fixture_model() -> SymptomModel {
        SymptomModel {
            schema: SYMPTOM_FIELDS.iter().map(|s| s.to_string()).collect(),
            coefficients: vec![1.6, 0.9, 1.1, 0.7, 0.5, 0.4, 0.6, 0.5, 0.3],
            intercept: -2.0,
            positive_class: 1,
        }
    }

    fn canonical(flags: [bool; 9]) -> FeatureVector {
        FeatureVector::new(SYMPTOM_FIELDS.iter().copied().zip(flags).collect())
    }

    #[test]
    fn all_flags_false_baseline_fixture() {
        let model = fixture_model();
        let result = model.predict(&canonical([false; 9])).expect("predict");
        assert_eq!(result.label, 0);
        // sigmoid(-2.0), the regression baseline
        assert_relative_eq!(
            result.probability,
            0.119_202_922_022_117_55,
            epsilon = 1e-12
        );
    }

    #[test]
    fn prediction_is_deterministic() {
        let model = fixture_model();
        let flags = SymptomFlags {
            fever: true,
            chills: true,
            sweating: true,
            ..SymptomFlags::default()
        };
        let a = model.predict(&flags.to_features()).expect("predict");
        let b = model.predict(&flags.to_features()).expect("predict");
        assert_eq!(a, b);
    }

    #[test]
    fn all_flags_true_predicts_the_positive_class() {
        let model = fixture_model();
        let result = model.predict(&canonical([true; 9])).expect("predict");
        assert_eq!(result.label, 1);
        assert!(result.probability > 0.9);
    }

    #[test]
    fn missing_field_is_a_schema_error() {
        let model = fixture_model();
        let truncated: Vec<(&str, bool)> = SYMPTOM_FIELDS[..8].iter().map(|n| (*n, false)).collect();
        let err = model.predict(&FeatureVector::new(truncated)).unwrap_err();
        assert_eq!(err, FeatureSchemaError::MissingFeature("Diarrhea".to_string()));
    }

    #[test]
    fn extra_field_is_a_schema_error() {
        let model = fixture_model();
        let mut flags: Vec<(&str, bool)> = SYMPTOM_FIELDS.iter().map(|n| (*n, false)).collect();
        flags.push(("Rash", true));
        let err = model.predict(&FeatureVector::new(flags)).unwrap_err();
        assert_eq!(err, FeatureSchemaError::UnexpectedFeature("Rash".to_string()));
    }

    #[test]
    fn renamed_field_is_reported_as_missing() {
        let model = fixture_model();
        let mut flags: Vec<(&str, bool)> = SYMPTOM_FIELDS.iter().map(|n| (*n, false)).collect();
        flags[1].0 = "Migraine";
        let err = model.predict(&FeatureVector::new(flags)).unwrap_err();
        assert_eq!(err, FeatureSchemaError::MissingFeature("Headache".to_string()));
    }

    #[test]
    fn misordered_fields_are_a_schema_error() {
        let model = fixture_model();
        let mut flags: Vec<(&str, bool)> = SYMPTOM_FIELDS.iter().map(|n| (*n, false)).collect();
        flags.swap(0, 1);
        let err = model.predict(&FeatureVector::new(flags)).unwrap_err();
        assert_eq!(
            err,
            FeatureSchemaError::OrderMismatch {
                index: 0,
                expected: "Fever".to_string(),
                actual: "Headache".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_field_is_a_schema_error() {
        let model = fixture_model();
        let mut flags: Vec<(&str, bool)> = SYMPTOM_FIELDS.iter().map(|n| (*n, false)).collect();
        flags.push(("Fever", true));
        let err = model.predict(&FeatureVector::new(flags)).unwrap_err();
        assert_eq!(err, FeatureSchemaError::DuplicateFeature("Fever".to_string()));
    }

    #[test]
    fn artifact_round_trips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            serde_json::to_string(&fixture_model()).expect("serialize"),
        )
        .expect("write");

        let model = load_model(&path).expect("load");
        assert_eq!(model.schema.len(), 9);
        assert_eq!(model.positive_class, 1);
        assert_eq!(model.intercept, -2.0);
    }

    #[test]
    fn truncated_artifact_fails_to_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{\"schema\": [\"Fever\"").expect("write");
        let err = load_model(&path).unwrap_err();
        assert!(matches!(err, ModelLoadError::Parse(_)));
    }

    #[test]
    fn coefficient_count_must_match_schema() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.json");
        let mut model = fixture_model();
        model.coefficients.pop();
        std::fs::write(&path, serde_json::to_string(&model).expect("serialize")).expect("write");
        let err = load_model(&path).unwrap_err();
        assert!(matches!(
            err,
            ModelLoadError::CoefficientMismatch {
                coefficients: 8,
                features: 9,
            }
        ));
    }

    #[test]
    fn missing_artifact_is_an_io_error() {
        let err = load_model(Path::new("no/such/model.json")).unwrap_err();
        assert!(matches!(err, ModelLoadError::Io { .. }));
    }
}

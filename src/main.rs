mod app;
mod chart;
mod color;
mod data;
mod predict;
mod state;
mod ui;

use std::path::Path;

use anyhow::{Context, anyhow};
use app::MaladashApp;
use eframe::egui;
use state::AppState;

/// Artifacts opened at startup. Both are required up front: no chart can
/// render without the dataset and the predictor form is inert without the
/// model. `File → Open…` can swap either at runtime.
const DATASET_PATH: &str = "data/malaria_age_cleaned.csv";
const MODEL_PATH: &str = "data/symptom_model.json";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let dataset = data::loader::load(Path::new(DATASET_PATH))
        .with_context(|| format!("loading dataset from {DATASET_PATH}"))?;
    let model = predict::load_model(Path::new(MODEL_PATH))
        .with_context(|| format!("loading model from {MODEL_PATH}"))?;
    log::info!(
        "loaded {} rows covering {} countries; model with {} features",
        dataset.len(),
        dataset.locations.len(),
        model.schema.len()
    );

    let mut state = AppState::default();
    state.set_dataset(dataset);
    state.set_model(model);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Maladash – Global Malaria Mortality",
        options,
        Box::new(|_cc| Ok(Box::new(MaladashApp::new(state)))),
    )
    .map_err(|e| anyhow!("eframe terminated: {e}"))
}

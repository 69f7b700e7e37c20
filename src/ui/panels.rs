use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader;
use crate::predict;
use crate::state::{AppState, ChartId};

/// Sidebar sections: header, chart, whether it takes a country and a year.
const FILTER_SECTIONS: [(&str, ChartId, bool, bool); 5] = [
    ("Deaths by Age Group", ChartId::AgeDonut, true, true),
    ("Deaths by Sex", ChartId::SexDonut, true, true),
    ("Age-Sex Bar Chart", ChartId::AgeSexBar, true, true),
    ("Map", ChartId::Map, false, true),
    ("Trend Line", ChartId::Trend, true, false),
];

// ---------------------------------------------------------------------------
// Left side panel – chart filters and the symptom form
// ---------------------------------------------------------------------------

/// Render the left panel: per-chart filters, then the predictor form.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Chart Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            filter_sections(ui, state);
            ui.separator();
            symptom_form(ui, state);
        });
}

fn filter_sections(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the domains so we can mutate state inside the loop.
    let locations: Vec<String> = dataset.locations.iter().cloned().collect();
    let years: Vec<i32> = dataset.years.iter().copied().collect();

    for (title, chart, wants_country, wants_year) in FILTER_SECTIONS {
        egui::CollapsingHeader::new(RichText::new(title).strong())
            .id_salt(title)
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                let sel = state.selections.get(&chart).cloned().unwrap_or_default();

                if wants_country {
                    let current = sel.country.clone().unwrap_or_default();
                    egui::ComboBox::from_id_salt((title, "country"))
                        .selected_text(current.clone())
                        .show_ui(ui, |ui: &mut Ui| {
                            for loc in &locations {
                                if ui.selectable_label(current == *loc, loc).clicked() {
                                    state.set_country(chart, loc.clone());
                                }
                            }
                        });
                }

                if wants_year {
                    let current = sel.year;
                    let label = current.map(|y| y.to_string()).unwrap_or_default();
                    egui::ComboBox::from_id_salt((title, "year"))
                        .selected_text(label)
                        .show_ui(ui, |ui: &mut Ui| {
                            for &year in &years {
                                if ui
                                    .selectable_label(current == Some(year), year.to_string())
                                    .clicked()
                                {
                                    state.set_year(chart, year);
                                }
                            }
                        });
                }
            });
    }
}

// ---------------------------------------------------------------------------
// Symptom predictor form
// ---------------------------------------------------------------------------

fn symptom_form(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Symptom Predictor");
    ui.label(
        RichText::new("For educational purposes only; not a substitute for medical advice.")
            .italics()
            .small(),
    );
    ui.add_space(4.0);
    ui.label("Check the symptoms that apply:");

    ui.checkbox(&mut state.symptoms.fever, "Fever");
    ui.checkbox(&mut state.symptoms.headache, "Headache");
    ui.checkbox(&mut state.symptoms.chills, "Chills");
    ui.checkbox(&mut state.symptoms.sweating, "Sweating");
    ui.checkbox(&mut state.symptoms.fatigue, "Fatigue");
    ui.checkbox(&mut state.symptoms.nausea, "Nausea");
    ui.checkbox(&mut state.symptoms.vomiting, "Vomiting");
    ui.checkbox(&mut state.symptoms.muscle_pain, "Muscle Pain");
    ui.checkbox(&mut state.symptoms.diarrhea, "Diarrhea");

    ui.add_space(4.0);
    if ui.button("Predict").clicked() {
        state.submit_symptoms();
    }

    if let (Some(result), Some(model)) = (&state.prediction, &state.model) {
        let infected = result.label == model.positive_class;
        // The artifact reports the positive-class probability; show the
        // probability of the predicted class.
        let shown = if infected {
            result.probability
        } else {
            1.0 - result.probability
        };
        let (text, color) = if infected {
            (
                format!("Infected (probability: {:.1}%)", shown * 100.0),
                Color32::from_rgb(192, 57, 43),
            )
        } else {
            (
                format!("Not infected (probability: {:.1}%)", shown * 100.0),
                Color32::from_rgb(39, 142, 60),
            )
        };
        ui.label(RichText::new(text).color(color).strong());
    }

    if let Some(err) = &state.prediction_error {
        ui.label(RichText::new(err).color(Color32::RED));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open Data…").clicked() {
                open_data_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open Model…").clicked() {
                open_model_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows, {} countries, {} years",
                ds.len(),
                ds.locations.len(),
                ds.years.len()
            ));
        }
        if state.model.is_some() {
            ui.separator();
            ui.label("model loaded");
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_data_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open mortality data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match loader::load(&path) {
            Ok(dataset) => {
                log::info!(
                    "loaded {} rows covering {} countries",
                    dataset.len(),
                    dataset.locations.len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                // Keep the previous dataset; just surface the failure.
                log::error!("failed to load dataset: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

pub fn open_model_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open model artifact")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match predict::load_model(&path) {
            Ok(model) => {
                log::info!("loaded model with {} features", model.schema.len());
                state.set_model(model);
            }
            Err(e) => {
                log::error!("failed to load model: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

//! Writes the sample artifacts the dashboard opens by default:
//! `data/malaria_age_cleaned.csv` and `data/symptom_model.json`.

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // (country, annual malaria deaths at the 2015 baseline)
    let countries: [(&str, f64); 8] = [
        ("Burkina Faso", 24_000.0),
        ("Chad", 30_000.0),
        ("India", 50_000.0),
        ("Mali", 28_000.0),
        ("Niger", 25_000.0),
        ("Nigeria", 190_000.0),
        ("Tanzania", 22_000.0),
        ("Uganda", 27_000.0),
    ];
    // (age band, share of deaths) – under-fives dominate malaria mortality
    let age_bands: [(&str, f64); 6] = [
        ("0-4", 0.68),
        ("5-9", 0.08),
        ("10-14", 0.04),
        ("15-49", 0.12),
        ("50-69", 0.05),
        ("70+", 0.03),
    ];
    let sexes: [(&str, f64); 2] = [("Male", 0.52), ("Female", 0.48)];
    let years = 2015..=2021;

    std::fs::create_dir_all("data").expect("Failed to create data directory");

    let mut writer =
        csv::Writer::from_path("data/malaria_age_cleaned.csv").expect("Failed to create CSV");
    writer
        .write_record(["location", "year", "age", "sex", "val"])
        .expect("Failed to write header");

    let mut rows = 0usize;
    for (country, baseline) in countries {
        for year in years.clone() {
            // Gentle downward trend, distinct per country
            let trend = 0.965_f64.powi(year - 2015);
            for (band, band_share) in age_bands {
                for (sex, sex_share) in sexes {
                    let expected = baseline * trend * band_share * sex_share;
                    let noisy = (expected * (1.0 + rng.gauss(0.0, 0.05))).max(0.0);
                    let year_s = year.to_string();
                    let val_s = format!("{noisy:.1}");
                    writer
                        .write_record([country, year_s.as_str(), band, sex, val_s.as_str()])
                        .expect("Failed to write row");
                    rows += 1;
                }
            }
        }
    }
    writer.flush().expect("Failed to flush CSV");

    // Fixture classifier: logistic regression over the 9 symptom flags.
    let model = serde_json::json!({
        "schema": [
            "Fever", "Headache", "Chills", "Sweating", "Fatigue",
            "Nausea", "Vomiting", "Muscle_Pain", "Diarrhea"
        ],
        "coefficients": [1.6, 0.9, 1.1, 0.7, 0.5, 0.4, 0.6, 0.5, 0.3],
        "intercept": -2.0,
        "positive_class": 1,
    });
    std::fs::write(
        "data/symptom_model.json",
        serde_json::to_string_pretty(&model).expect("Failed to serialize model"),
    )
    .expect("Failed to write model");

    println!("Wrote {rows} rows to data/malaria_age_cleaned.csv and data/symptom_model.json");
}

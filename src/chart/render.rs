use crate::data::aggregate::{AgeSexPivot, AggregatedView};

use super::spec::{BarSeries, ChartSpec, Region};

// ---------------------------------------------------------------------------
// The five chart renderers
// ---------------------------------------------------------------------------
//
// Each renderer is a pure mapping from one aggregated view to one spec.
// An empty view produces an empty spec; it is never an error.

fn split<K>(view: AggregatedView<K>) -> (Vec<K>, Vec<f64>) {
    view.rows.into_iter().unzip()
}

/// Donut of deaths per age band for one country/year.
pub fn age_donut(view: AggregatedView<String>, country: &str, year: i32) -> ChartSpec {
    let (categories, values) = split(view);
    ChartSpec::Donut {
        title: format!("Deaths by Age Group – {country} ({year})"),
        categories,
        values,
    }
}

/// Donut of deaths per sex for one country/year.
pub fn sex_donut(view: AggregatedView<String>, country: &str, year: i32) -> ChartSpec {
    let (categories, values) = split(view);
    ChartSpec::Donut {
        title: format!("Deaths by Sex – {country} ({year})"),
        categories,
        values,
    }
}

/// Grouped bar of deaths per age band, one series per sex.
pub fn age_sex_bar(pivot: AgeSexPivot, country: &str, year: i32) -> ChartSpec {
    ChartSpec::GroupedBar {
        title: format!("Deaths by Age and Sex – {country} ({year})"),
        x_label: "Age group".to_string(),
        y_label: "Deaths".to_string(),
        categories: pivot.ages,
        series: pivot
            .series
            .into_iter()
            .map(|(name, values)| BarSeries { name, values })
            .collect(),
    }
}

/// Choropleth of deaths per country for one year, shaded on a scale
/// normalized to the worst-hit country.
pub fn deaths_map(view: AggregatedView<String>, year: i32) -> ChartSpec {
    let max = view.rows.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let regions = view
        .rows
        .into_iter()
        .map(|(location, value)| Region {
            intensity: if max > 0.0 { value / max } else { 0.0 },
            location,
            value,
        })
        .collect();
    ChartSpec::Choropleth {
        title: format!("Malaria Deaths by Country – {year}"),
        value_label: "Deaths".to_string(),
        regions,
    }
}

/// Trend line of deaths per year for one country.
pub fn trend_line(view: AggregatedView<i32>, country: &str) -> ChartSpec {
    let points = view
        .rows
        .into_iter()
        .map(|(year, value)| [year as f64, value])
        .collect();
    ChartSpec::TrendLine {
        title: format!("Trend of Malaria Deaths in {country}"),
        x_label: "Year".to_string(),
        y_label: "Deaths".to_string(),
        points,
    }
}

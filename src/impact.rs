use serde::Serialize;

/// Energy an incandescent 60 W bulb draws in one hour, in kWh.
pub const LIGHT_BULB_KWH_PER_HOUR: f64 = 0.06;
/// CO2 one mature tree absorbs per year, in grams.
pub const TREE_G_CO2_PER_YEAR: f64 = 21_000.0;
/// CO2 an average passenger car emits per mile, in grams.
pub const CAR_G_CO2_PER_MILE: f64 = 404.0;
/// Default number of executions the description projects to.
pub const DEFAULT_RUNS: u64 = 1_000_000;

/// Per-run energy and emissions expressed in everyday terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealWorldImpact {
    pub light_bulb_hours: f64,
    pub tree_planting_days: f64,
    pub car_miles: f64,
    /// Human-readable projection over many runs.
    pub description: String,
}

/// Converts energy and CO2 into relatable equivalents.
#[derive(Debug, Clone, Copy)]
pub struct ImpactTranslator {
    runs: u64,
}

impl ImpactTranslator {
    pub fn new(runs: u64) -> Self {
        Self { runs }
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Translates one run's `energy_wh` and `co2_g`.
    ///
    /// Zero (or negative) inputs give zero numeric fields.
    pub fn translate(&self, energy_wh: f64, co2_g: f64) -> RealWorldImpact {
        let energy_wh = non_negative(energy_wh);
        let co2_g = non_negative(co2_g);

        let light_bulb_hours = energy_wh / 1000.0 / LIGHT_BULB_KWH_PER_HOUR;
        let tree_planting_days = co2_g / (TREE_G_CO2_PER_YEAR / 365.0);
        let car_miles = co2_g / CAR_G_CO2_PER_MILE;

        let runs = self.runs as f64;
        let description = format!(
            "Running this code {} times = {:.2} hours of a light bulb, {:.2} tree-days of CO2 absorption, {:.2} miles driven",
            format_runs(self.runs),
            light_bulb_hours * runs,
            tree_planting_days * runs,
            car_miles * runs,
        );

        RealWorldImpact {
            light_bulb_hours,
            tree_planting_days,
            car_miles,
            description,
        }
    }
}

impl Default for ImpactTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_RUNS)
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// `1000000` -> `1M`, `2500` -> `2.5K`, small counts unchanged.
fn format_runs(runs: u64) -> String {
    let compact = |value: f64, suffix: &str| {
        let text = format!("{:.1}", value);
        let text = text.strip_suffix(".0").unwrap_or(&text).to_string();
        format!("{}{}", text, suffix)
    };
    match runs {
        r if r >= 1_000_000_000 => compact(r as f64 / 1e9, "B"),
        r if r >= 1_000_000 => compact(r as f64 / 1e6, "M"),
        r if r >= 1_000 => compact(r as f64 / 1e3, "K"),
        r => r.to_string(),
    }
}

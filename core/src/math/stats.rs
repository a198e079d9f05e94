pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean; zero for an empty slice.
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Largest `|v - center|` over the slice; zero for an empty slice.
    pub fn max_abs_deviation(values: &[f64], center: f64) -> f64 {
        values
            .iter()
            .map(|&v| (v - center).abs())
            .fold(0.0, f64::max)
    }
}

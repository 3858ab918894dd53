pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean; an empty sequence yields zero.
    pub fn mean<I>(values: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        let (sum, count) = values
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            return 0.0;
        }
        sum / count as f64
    }

    /// Mean of `|value - expected|`.
    pub fn mean_abs_deviation<I>(values: I, expected: f64) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        Self::mean(values.into_iter().map(|v| (v - expected).abs()))
    }

    /// Mean of `value - expected`, keeping the sign.
    pub fn mean_deviation<I>(values: I, expected: f64) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        Self::mean(values.into_iter().map(|v| v - expected))
    }
}

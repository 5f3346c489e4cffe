use serde::{Deserialize, Serialize};

/// Descriptive statistics summarizing a sample of `f32` values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of values in the sample.
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    /// Middle value, or the mean of the two middle values for even counts.
    pub median: f32,
    /// Population variance.
    pub variance: f32,
    pub std_dev: f32,
    /// `std_dev / (max - min)`, or `0.0` when all values are equal.
    ///
    /// Compares spread between samples of different scale, such as genes with
    /// different magnitudes.
    pub normalized_std_dev: f32,
}

impl DescriptiveStats {
    /// Computes statistics from unsorted values.
    ///
    /// Returns `None` if `values` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use evochess_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.count, 5);
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert!(DescriptiveStats::new([]).is_none());
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes statistics from values already sorted in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f32]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f32;
        let mean = sorted_values.iter().sum::<f32>() / n;
        let mid = count / 2;
        let median = if count % 2 == 0 {
            f32::midpoint(sorted_values[mid - 1], sorted_values[mid])
        } else {
            sorted_values[mid]
        };
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f32>()
            / n;
        let std_dev = variance.sqrt();
        let range = max - min;
        let normalized_std_dev = if range > 0.0 { std_dev / range } else { 0.0 };

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev,
            normalized_std_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_of_known_sample() {
        let stats = DescriptiveStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.median, 4.5);
        assert_eq!(stats.variance, 4.0);
        assert_eq!(stats.std_dev, 2.0);
        assert!((stats.normalized_std_dev - 2.0 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_sample_has_zero_spread() {
        let stats = DescriptiveStats::new([0.0; 4]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.normalized_std_dev, 0.0);

        let single = DescriptiveStats::new([3.5]).unwrap();
        assert_eq!(single.median, 3.5);
        assert_eq!(single.normalized_std_dev, 0.0);
    }

    #[test]
    #[should_panic(expected = "sorted")]
    fn test_from_sorted_rejects_unsorted_input() {
        let _ = DescriptiveStats::from_sorted(&[2.0, 1.0]);
    }

    #[test]
    fn test_serializes_all_fields() {
        let stats = DescriptiveStats::new([1.0, 3.0]).unwrap();
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["median"], 2.0);
    }
}

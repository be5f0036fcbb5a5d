//! Grouped statistics used to impute and aggregate catalog rows

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// `f64` with a total order, so decimal columns can key ordered maps
#[derive(Debug, Clone, Copy)]
pub struct OrdF64(pub f64);

impl PartialEq for OrdF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Arithmetic mean, `None` for an empty input
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Most frequent value; ties go to the lowest value
pub fn mode<T, I>(values: I) -> Option<T>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(T, usize)> = None;
    // Ascending iteration: a later value only wins with a strictly higher count
    for (value, count) in counts {
        match &best {
            Some((_, best_count)) if *best_count >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// [`mode`] over a nullable column; NULLs are ignored
pub fn mode_present<T, I>(values: I) -> Option<T>
where
    T: Ord,
    I: IntoIterator<Item = Option<T>>,
{
    mode(values.into_iter().flatten())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean([24.0, 25.0, 26.0]), Some(25.0));
        assert_eq!(mean([20.0, 22.0]), Some(21.0));
        assert_eq!(mean(std::iter::empty()), None);
    }

    #[test]
    fn test_mode_highest_count_wins() {
        assert_eq!(mode([3, 1, 3, 2, 3, 1]), Some(3));
    }

    #[test]
    fn test_mode_tie_goes_to_lowest_value() {
        assert_eq!(mode([8, 7, 7, 8]), Some(7));
        assert_eq!(mode(["b", "a"]), Some("a"));
        assert_eq!(mode([true, false]), Some(false));
    }

    #[test]
    fn test_mode_empty() {
        assert_eq!(mode(Vec::<i64>::new()), None);
    }

    #[test]
    fn test_mode_on_decimals() {
        let widths = [7.5, 8.0, 7.5, 8.0, 6.5].map(OrdF64);
        assert_eq!(mode(widths).map(|v| v.0), Some(7.5));
    }

    #[test]
    fn test_mode_present_ignores_nulls() {
        assert_eq!(mode_present([None, None, Some(300), None]), Some(300));
        assert_eq!(mode_present::<i64, _>([None, None]), None);
    }
}

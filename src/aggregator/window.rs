/// Trailing-window arithmetic mean over an ordered series
///
/// Returns one entry per input position. A position is defined only when a
/// full window of consecutive values ends at it and none of those values is
/// missing; every other position is `None`. Gaps are never interpolated or
/// zero-filled - a null inside the window makes the whole window undefined.
pub fn trailing_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut means = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        if window == 0 || i + 1 < window {
            means.push(None);
            continue;
        }

        let mut sum = 0.0;
        let mut complete = true;
        for value in &values[i + 1 - window..=i] {
            match value {
                Some(v) => sum += v,
                None => {
                    complete = false;
                    break;
                }
            }
        }

        means.push(complete.then(|| sum / window as f64));
    }

    means
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_full_window_mean() {
        let values = present(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let means = trailing_mean(&values, 10);

        assert_eq!(means.len(), 10);
        assert!(means[..9].iter().all(Option::is_none));
        assert_eq!(means[9], Some(5.5));
    }

    #[test]
    fn test_short_series_has_no_defined_positions() {
        let values = present(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let means = trailing_mean(&values, 10);

        assert!(means.iter().all(Option::is_none));
    }

    #[test]
    fn test_rolling_positions() {
        let values = present(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let means = trailing_mean(&values, 3);

        assert_eq!(means, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_null_inside_window_undefines_it() {
        let mut values = present(&[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0,
        ]);
        values[10] = None;
        let means = trailing_mean(&values, 10);

        // Index 10 sits inside the trailing window of both last positions
        assert_eq!(means[9], Some(5.5));
        assert_eq!(means[10], None);
        assert_eq!(means[11], None);
    }

    #[test]
    fn test_null_outside_window_is_ignored() {
        let mut values = present(&[
            0.0, 1.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0,
        ]);
        values[0] = None;
        values[1] = None;
        let means = trailing_mean(&values, 10);

        // The trailing window of the last position covers indices 2..=11
        assert_eq!(means[11], Some(7.5));
    }

    #[test]
    fn test_all_null_series() {
        let values = vec![None; 12];
        let means = trailing_mean(&values, 10);

        assert!(means.iter().all(Option::is_none));
    }

    #[test]
    fn test_window_of_one() {
        let values = vec![Some(4.0), None, Some(6.0)];
        let means = trailing_mean(&values, 1);

        assert_eq!(means, vec![Some(4.0), None, Some(6.0)]);
    }

    #[test]
    fn test_empty_series() {
        assert!(trailing_mean(&[], 10).is_empty());
    }
}

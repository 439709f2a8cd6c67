//! Rounding residual correction shared by the suggestion heuristic and the
//! final frame of a reallocation transition.

use crate::domain::Decimal;

/// Index of the largest value, first occurrence on ties.
pub fn index_of_max(values: &[Decimal]) -> Option<usize> {
    let mut best: Option<(usize, Decimal)> = None;
    for (i, v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if *v <= b => {}
            _ => best = Some((i, *v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Clamp every value into `[0, 100]` and push the difference to 100 onto the
/// largest element.
///
/// When clamping the largest element leaves part of the residual unabsorbed
/// the correction repeats on the new largest element. The result sums to
/// exactly 100 for any non-empty input.
pub fn fix_residual(values: &[Decimal]) -> Vec<Decimal> {
    let mut out: Vec<Decimal> = values.iter().map(|v| v.clamp_percentage()).collect();

    while let Some(idx) = index_of_max(&out) {
        let sum: Decimal = out.iter().sum();
        let residual = Decimal::hundred() - sum;
        if residual.is_zero() {
            break;
        }
        out[idx] = (out[idx] + residual).clamp_percentage();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(values: &[i64]) -> Vec<Decimal> {
        values
            .iter()
            .map(|v| Decimal::new(rust_decimal::Decimal::from(*v)))
            .collect()
    }

    fn sum(values: &[Decimal]) -> Decimal {
        values.iter().sum()
    }

    #[test]
    fn test_no_change_when_already_100() {
        assert_eq!(fix_residual(&ds(&[50, 30, 20])), ds(&[50, 30, 20]));
    }

    #[test]
    fn test_residual_goes_to_largest() {
        assert_eq!(fix_residual(&ds(&[33, 33, 33])), ds(&[34, 33, 33]));
        assert_eq!(fix_residual(&ds(&[20, 41, 40])), ds(&[20, 40, 40]));
    }

    #[test]
    fn test_ties_pick_first() {
        assert_eq!(index_of_max(&ds(&[10, 40, 40])), Some(1));
        assert_eq!(index_of_max(&[]), None);
    }

    #[test]
    fn test_clamps_out_of_range_inputs() {
        let fixed = fix_residual(&ds(&[-10, 150]));
        assert_eq!(fixed, ds(&[0, 100]));
    }

    #[test]
    fn test_overflow_spills_to_next_largest() {
        // 200 buckets at 1 each: the largest can only absorb down to 0.
        let fixed = fix_residual(&vec![Decimal::from(1u32); 200]);
        assert_eq!(sum(&fixed), Decimal::hundred());
        assert!(fixed.iter().all(|v| !v.is_negative()));
    }

    #[test]
    fn test_all_zero_input() {
        assert_eq!(fix_residual(&ds(&[0, 0, 0])), ds(&[100, 0, 0]));
    }

    #[test]
    fn test_empty_input() {
        assert!(fix_residual(&[]).is_empty());
    }
}

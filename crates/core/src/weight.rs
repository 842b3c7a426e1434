//! Integer-percent weights and the weighted rollup shared by goals and
//! team-quarters.

use crate::error::{OkrError, OkrResult};

/// Expected sum of sibling weights.
pub const FULL_WEIGHT: u32 = 100;

/// Rejects weights outside `0..=100`.
pub fn validate_weight(field: &str, weight: u32) -> OkrResult<()> {
    if weight > FULL_WEIGHT {
        return Err(OkrError::Validation(format!(
            "{field} weight must be 0..100, got {weight}"
        )));
    }
    Ok(())
}

/// `round(Σ weight * progress / 100)`, rounding halves up.
///
/// Not normalized by the weight sum: children whose weights do not add up to
/// 100 produce exactly the progress their raw weights imply.
pub fn weighted_rollup(parts: impl IntoIterator<Item = (u32, u32)>) -> u32 {
    let total: u64 = parts
        .into_iter()
        .map(|(weight, progress)| u64::from(weight) * u64::from(progress))
        .sum();
    u32::try_from((total + 50) / 100).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[(60, 50), (40, 100)], 70)]
    #[case(&[(40, 70)], 28)]
    #[case(&[(50, 1)], 1)]
    #[case(&[(50, 3)], 2)]
    #[case(&[(30, 10), (30, 10)], 6)]
    #[case(&[], 0)]
    fn test_weighted_rollup(#[case] parts: &[(u32, u32)], #[case] expected: u32) {
        assert_eq!(weighted_rollup(parts.iter().copied()), expected);
    }

    #[test]
    fn test_rollup_is_not_normalized() {
        // Weights summing to 50 halve the result rather than being scaled up.
        assert_eq!(weighted_rollup([(25, 100), (25, 100)]), 50);
        // Overshooting weights overshoot the result.
        assert_eq!(weighted_rollup([(80, 100), (80, 100)]), 160);
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight("goal", 0).is_ok());
        assert!(validate_weight("goal", 100).is_ok());
        assert!(matches!(
            validate_weight("goal", 101),
            Err(OkrError::Validation(msg)) if msg.contains("goal weight")
        ));
    }
}

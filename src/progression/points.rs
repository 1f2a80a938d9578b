//! Unlock points
//!
//! One point per completed checklist item, one spent per unlocked skill
//! beyond the first. Always recomputed, never stored.

/// Points already spent by a build holding `unlocked` skills
pub fn spent_points(unlocked: usize) -> usize {
    unlocked.saturating_sub(1)
}

/// `max(0, completed - max(0, unlocked - 1))`
pub fn available_points(completed: usize, unlocked: usize) -> u32 {
    let available = completed.saturating_sub(spent_points(unlocked));
    u32::try_from(available).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_four_items_two_done_two_unlocked() {
        assert_eq!(available_points(2, 2), 1);
    }

    #[test]
    fn test_no_build_spends_nothing() {
        assert_eq!(spent_points(0), 0);
        assert_eq!(available_points(3, 0), 3);
        assert_eq!(available_points(3, 1), 3);
    }

    #[test]
    fn test_overspent_clamps_to_zero() {
        assert_eq!(available_points(1, 5), 0);
    }

    proptest! {
        #[test]
        fn prop_matches_formula(completed in 0usize..100, unlocked in 0usize..100) {
            let expected = (completed as i64 - (unlocked as i64 - 1).max(0)).max(0);
            prop_assert_eq!(available_points(completed, unlocked) as i64, expected);
        }
    }
}

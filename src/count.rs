//! Closed-form size of the candidate space.
//!
//! The generator never has to run to know how many candidates it will emit:
//! `d * (n + sum_{r=2..n} P(n, r) * m(r))` where `m(r)` is the number of
//! separator choices for `r - 1` gaps. Arithmetic saturates at `u128::MAX`.
use crate::generator::{SEPARATORS, SeparatorMode};

/// Separator patterns for a local part made of `r` chunks.
pub fn separator_multiplier(r: usize, mode: SeparatorMode) -> u128 {
    let k = SEPARATORS.len() as u128;
    match (r, mode) {
        (0 | 1, _) => 1,
        (_, SeparatorMode::Normal) => k,
        (_, SeparatorMode::Crazy) => {
            let gaps = u32::try_from(r - 1).unwrap_or(u32::MAX);
            k.checked_pow(gaps).unwrap_or(u128::MAX)
        }
    }
}

/// Candidates emitted for exactly `r` chunks, across all domains.
pub fn count_for_length(n: usize, d: usize, r: usize, mode: SeparatorMode) -> u128 {
    if r == 0 || r > n {
        return 0;
    }
    let mut perms: u128 = 1;
    for i in 0..r {
        perms = perms.saturating_mul((n - i) as u128);
    }
    perms
        .saturating_mul(separator_multiplier(r, mode))
        .saturating_mul(d as u128)
}

/// Total number of candidates for `n` chunks and `d` domains.
pub fn combination_count(n: usize, d: usize, mode: SeparatorMode) -> u128 {
    if n == 0 || d == 0 {
        return 0;
    }
    let mut total: u128 = n as u128;
    // P(n, r) built incrementally: P(n, r) = P(n, r - 1) * (n - r + 1)
    let mut perms: u128 = n as u128;
    for r in 2..=n {
        perms = perms.saturating_mul((n - r + 1) as u128);
        total = total.saturating_add(perms.saturating_mul(separator_multiplier(r, mode)));
        if total == u128::MAX {
            break;
        }
    }
    total.saturating_mul(d as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_chunks_one_domain_is_ten() {
        assert_eq!(combination_count(2, 1, SeparatorMode::Normal), 10);
        assert_eq!(combination_count(2, 1, SeparatorMode::Crazy), 10);
    }

    #[test]
    fn crazy_grows_with_gap_count() {
        // n=3: 3 + 6*4 + 6*4 = 51 normal; 3 + 6*4 + 6*16 = 123 crazy
        assert_eq!(combination_count(3, 1, SeparatorMode::Normal), 51);
        assert_eq!(combination_count(3, 1, SeparatorMode::Crazy), 123);
        assert_eq!(combination_count(3, 5, SeparatorMode::Crazy), 615);
    }

    #[test]
    fn per_length_counts_sum_to_total() {
        for mode in [SeparatorMode::Normal, SeparatorMode::Crazy] {
            let sum: u128 = (1..=5).map(|r| count_for_length(5, 3, r, mode)).sum();
            assert_eq!(sum, combination_count(5, 3, mode));
        }
    }

    #[test]
    fn degenerate_inputs_and_saturation() {
        assert_eq!(combination_count(0, 10, SeparatorMode::Normal), 0);
        assert_eq!(combination_count(4, 0, SeparatorMode::Normal), 0);
        assert_eq!(combination_count(200, 50, SeparatorMode::Crazy), u128::MAX);
    }
}

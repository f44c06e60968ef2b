//! Bobot normalization
//!
//! Rescales a category's weights so they total exactly a target while every
//! row keeps at least a floor value. Exact integer arithmetic throughout:
//! - rows whose proportional share falls below the floor are pinned to it
//! - the remaining budget is split proportionally by largest remainder
//! - remainder ties go to the larger original weight, then the earlier row

use std::cmp::Reverse;

/// Default minimum weight per row
pub const DEFAULT_FLOOR: u32 = 5;

/// Normalize `weights` to total `target`, each at least `floor`
///
/// When `floor × len` exceeds `target` the floor is lowered to
/// `target / len`. All-zero input is split evenly, earlier rows taking the
/// leftover units. Output order matches input order.
#[must_use]
pub fn normalize_weights(weights: &[u32], target: u32, floor: u32) -> Vec<u32> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let n_u32 = u32::try_from(n).unwrap_or(u32::MAX);
    let floor = floor.min(target / n_u32);

    let mut pinned = vec![false; n];
    loop {
        let free: Vec<usize> = (0..n).filter(|&i| !pinned[i]).collect();
        if free.is_empty() {
            break;
        }
        let budget = budget_for(target, floor, n - free.len());
        let free_sum: u64 = free.iter().map(|&i| u64::from(weights[i])).sum();
        if free_sum == 0 {
            break;
        }
        // share < floor  <=>  w * budget < floor * free_sum
        let newly: Vec<usize> = free
            .iter()
            .copied()
            .filter(|&i| u64::from(weights[i]) * budget < u64::from(floor) * free_sum)
            .collect();
        if newly.is_empty() {
            break;
        }
        for i in newly {
            pinned[i] = true;
        }
    }

    let mut out: Vec<u32> = pinned.iter().map(|&p| if p { floor } else { 0 }).collect();
    let free: Vec<usize> = (0..n).filter(|&i| !pinned[i]).collect();
    if free.is_empty() {
        return out;
    }
    let budget = budget_for(target, floor, n - free.len());
    let free_sum: u64 = free.iter().map(|&i| u64::from(weights[i])).sum();

    if free_sum == 0 {
        let count = free.len() as u64;
        let each = budget / count;
        let extra = budget % count;
        for (k, &i) in free.iter().enumerate() {
            let bonus = u64::from((k as u64) < extra);
            out[i] = to_u32(each + bonus);
        }
        return out;
    }

    let mut remainders: Vec<(usize, u64)> = Vec::with_capacity(free.len());
    let mut assigned: u64 = 0;
    for &i in &free {
        let numerator = u64::from(weights[i]) * budget;
        let quotient = numerator / free_sum;
        out[i] = to_u32(quotient);
        assigned += quotient;
        remainders.push((i, numerator % free_sum));
    }

    let deficit = usize::try_from(budget - assigned).unwrap_or(usize::MAX);
    remainders.sort_by_key(|&(i, rem)| (Reverse(rem), Reverse(weights[i]), i));
    for &(i, _) in remainders.iter().take(deficit) {
        out[i] += 1;
    }
    out
}

fn budget_for(target: u32, floor: u32, pinned: usize) -> u64 {
    u64::from(target) - u64::from(floor) * pinned as u64
}

fn to_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn five_strengths_summing_to_120() {
        let out = normalize_weights(&[40, 30, 25, 15, 10], 100, DEFAULT_FLOOR);
        assert_eq!(out, vec![33, 25, 21, 13, 8]);
        assert_eq!(out.iter().sum::<u32>(), 100);
        assert!(out.iter().all(|&w| w >= 5));
    }

    #[test]
    fn tiny_weights_are_lifted_to_floor() {
        let out = normalize_weights(&[95, 1, 1, 1], 100, DEFAULT_FLOOR);
        assert_eq!(out, vec![85, 5, 5, 5]);
    }

    #[test]
    fn already_normalized_is_unchanged() {
        let input = [50, 30, 20];
        assert_eq!(normalize_weights(&input, 100, DEFAULT_FLOOR), input.to_vec());
    }

    #[test]
    fn all_zero_splits_evenly() {
        assert_eq!(normalize_weights(&[0, 0, 0], 100, DEFAULT_FLOOR), vec![34, 33, 33]);
    }

    #[test]
    fn floor_is_lowered_when_too_many_rows() {
        let out = normalize_weights(&[1; 25], 100, DEFAULT_FLOOR);
        assert_eq!(out.iter().sum::<u32>(), 100);
        assert!(out.iter().all(|&w| w == 4));
    }

    #[test]
    fn remainder_ties_prefer_heavier_then_earlier() {
        // 3 equal rows: 100/3 leaves one unit for the earliest row
        assert_eq!(normalize_weights(&[10, 10, 10], 100, 0), vec![34, 33, 33]);
    }

    #[test]
    fn empty_input() {
        assert!(normalize_weights(&[], 100, DEFAULT_FLOOR).is_empty());
    }
}

//! The ordering oracle: a Las Vegas sort.
//!
//! `r_sort` never compares its way to a sorted order. It shuffles a
//! clone of the input, verifies the shuffle is non-decreasing and keeps
//! reshuffling until one passes. Callers treat it as a black box that
//! returns a sorted permutation after an unpredictable number of draws;
//! the decoder uses it to re-derive the dictionary order from the
//! header. Expected draw count grows factorially with the number of
//! distinct elements, which is fine at dictionary scale and is capped
//! by the [`SearchBudget`] when a caller needs a bound.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::search::{SearchBudget, SearchExhausted};

/// Return a sorted clone of `items` by shuffle-and-verify.
pub fn r_sort<T: Ord + Clone>(
    items: &[T],
    budget: &SearchBudget,
    rng: &mut impl Rng,
) -> Result<Vec<T>, SearchExhausted> {
    let mut clone = items.to_vec();
    let mut spent = 0u64;
    loop {
        budget.register(&mut spent)?;
        clone.shuffle(rng);
        if clone.windows(2).all(|w| w[0] <= w[1]) {
            return Ok(clone);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn returns_a_sorted_permutation() {
        let input = vec!["pear", "apple", "quince", "fig", "apple"];
        let sorted = r_sort(&input, &SearchBudget::UNBOUNDED, &mut thread_rng()).unwrap();

        let mut expected = input.clone();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn empty_and_singleton_need_one_draw() {
        let rng = &mut thread_rng();
        let budget = SearchBudget::limited(1);
        assert_eq!(r_sort::<u8>(&[], &budget, rng).unwrap(), Vec::<u8>::new());
        assert_eq!(r_sort(&[7], &budget, rng).unwrap(), vec![7]);
    }

    #[test]
    fn exhaustion_surfaces_when_capped() {
        // 8 distinct elements: a single shuffle lands sorted with
        // probability 1/40320, so a 1-draw budget all but always trips.
        let input: Vec<u32> = (0..8).rev().collect();
        let mut failures = 0;
        for _ in 0..3 {
            if r_sort(&input, &SearchBudget::limited(1), &mut thread_rng()).is_err() {
                failures += 1;
            }
        }
        assert!(failures > 0);
    }
}

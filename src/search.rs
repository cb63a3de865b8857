//! Retry accounting for the reject-and-restart searches.
//!
//! Three places in the format are defined as randomized searches with no
//! closed form: cipher decryption, matrix division and the ordering
//! oracle. Each one samples a candidate, checks it against a predicate
//! and starts over on failure, so none of them has a termination bound.
//! [`SearchBudget`] makes that risk injectable: the default keeps the
//! format's retry-forever semantics, while callers that cannot tolerate
//! an unbounded loop can cap the attempt count and handle
//! [`SearchExhausted`].

use thiserror::Error;

/// Attempt cap shared by every randomized search in the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBudget {
    /// Maximum candidates a single search may draw. `None` retries forever.
    pub max_attempts: Option<u64>,
}

impl SearchBudget {
    /// Retry until a candidate passes, however long that takes.
    pub const UNBOUNDED: SearchBudget = SearchBudget { max_attempts: None };

    /// Give up (with [`SearchExhausted`]) after `max_attempts` candidates.
    pub fn limited(max_attempts: u64) -> Self {
        SearchBudget { max_attempts: Some(max_attempts) }
    }

    /// Record one drawn candidate against the budget.
    pub fn register(&self, spent: &mut u64) -> Result<(), SearchExhausted> {
        *spent += 1;
        match self.max_attempts {
            Some(max) if *spent > max => Err(SearchExhausted { attempts: max }),
            _ => Ok(()),
        }
    }
}

/// A capped randomized search ran out of attempts before any candidate
/// passed its verification predicate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("randomized search gave up after {attempts} attempts")]
pub struct SearchExhausted {
    pub attempts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_trips() {
        let mut spent = 0;
        for _ in 0..10_000 {
            SearchBudget::UNBOUNDED.register(&mut spent).unwrap();
        }
        assert_eq!(spent, 10_000);
    }

    #[test]
    fn limited_trips_after_cap() {
        let budget = SearchBudget::limited(3);
        let mut spent = 0;
        assert!(budget.register(&mut spent).is_ok());
        assert!(budget.register(&mut spent).is_ok());
        assert!(budget.register(&mut spent).is_ok());
        assert_eq!(budget.register(&mut spent), Err(SearchExhausted { attempts: 3 }));
    }
}

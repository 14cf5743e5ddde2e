//! Budget-aware batch planning
//!
//! Providers cap how much text a single request may carry, so a catalog is
//! split into an ordered sequence of batches. Each candidate batch is sized
//! through a caller-supplied measure that includes the driver's request
//! wrapping (prompt scaffolding, JSON envelope), and a batch is closed as soon
//! as the next entry would push it over budget.

use crate::StringSet;
use crate::mt::error::MtResult;
use serde::{Deserialize, Serialize};

/// Default divisor applied to a provider's output budget
///
/// Translations routinely come back longer than their source, and the
/// request wrapping eats into the budget as well.
pub const DEFAULT_BUFFER_FACTOR: usize = 2;

/// Unit in which a driver measures request size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    /// Approximate LLM tokens, see [`approximate_tokens`]
    Tokens,
    /// Unicode scalar values
    Chars,
    /// UTF-8 bytes
    Bytes,
}

impl SizeUnit {
    pub fn estimate(self, text: &str) -> usize {
        match self {
            SizeUnit::Tokens => approximate_tokens(text),
            SizeUnit::Chars => text.chars().count(),
            SizeUnit::Bytes => text.len(),
        }
    }
}

/// Rough token count: one token per four characters, rounded up
///
/// Close enough to BPE tokenizers for English and conservative for most
/// other scripts, without pulling a tokenizer into the build.
pub fn approximate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Usable request budget for a provider output limit
pub fn budget_for(max_output: usize, buffer_factor: usize) -> usize {
    (max_output / buffer_factor.max(1)).max(1)
}

/// Allowance for the separator a driver puts between two entries
/// (a newline, a JSON comma)
const ENTRY_SEPARATOR: usize = 1;

/// Partition `texts` into ordered batches that each fit within `budget`
///
/// `measure` sizes a request body including its wrapping. It is called once
/// on an empty set to learn the fixed overhead and once per entry; a batch is
/// sized as that overhead plus the cost of each entry and a separator between
/// entries, so planning stays linear in the number of entries.
///
/// A measurement error counts as infinitely large so the planner closes the
/// batch instead of risking an oversized request. An entry that is over budget
/// on its own still gets a batch of its own; it is never split or dropped.
pub fn plan<F>(texts: &StringSet, mut measure: F, budget: usize) -> Vec<StringSet>
where
    F: FnMut(&StringSet) -> MtResult<usize>,
{
    let mut batches = Vec::new();
    if texts.is_empty() {
        return batches;
    }

    let overhead = measure(&StringSet::new()).unwrap_or(0);
    let mut current = StringSet::new();
    let mut current_size: usize = 0;

    for (key, text) in texts {
        let mut single = StringSet::new();
        single.insert(key.clone(), text.clone());
        let cost = measure(&single)
            .map(|size| size.saturating_sub(overhead))
            .unwrap_or(usize::MAX);

        let size = if current.is_empty() {
            overhead.saturating_add(cost)
        } else {
            current_size
                .saturating_add(ENTRY_SEPARATOR)
                .saturating_add(cost)
        };

        if size > budget && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current_size = overhead.saturating_add(cost);
        } else {
            current_size = size;
        }
        current.extend(single);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::error::MtError;
    use proptest::prelude::*;

    fn numbered(count: usize, text: &str) -> StringSet {
        (0..count)
            .map(|i| (format!("key{:03}", i), text.to_string()))
            .collect()
    }

    /// Total characters of all values, no wrapping overhead
    fn value_chars(batch: &StringSet) -> MtResult<usize> {
        Ok(batch.values().map(|v| v.chars().count()).sum())
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        let batches = plan(&StringSet::new(), value_chars, 100);
        assert!(batches.is_empty());
    }

    #[test]
    fn test_everything_fits_in_one_batch() {
        let texts = numbered(5, "abcd");
        let batches = plan(&texts, value_chars, 100);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], texts);
    }

    #[test]
    fn test_splits_when_budget_exceeded() {
        // 10 chars each plus a separator, 25 char budget: two per batch
        let texts = numbered(5, "0123456789");
        let batches = plan(&texts, value_chars, 25);
        let sizes: Vec<usize> = batches.iter().map(StringSet::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_oversized_entry_gets_its_own_batch() {
        let mut texts = StringSet::new();
        texts
            .with_entry("a", "short")
            .with_entry("b", &"x".repeat(500))
            .with_entry("c", "short");

        let batches = plan(&texts, value_chars, 20);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[1].get("b").map(String::len), Some(500));
    }

    #[test]
    fn test_wrapping_overhead_counts_against_budget() {
        let texts = numbered(4, "abc");
        // 20 units of fixed scaffolding per request
        let with_overhead = |batch: &StringSet| value_chars(batch).map(|n| n + 20);
        // 20 + 3 + 1 + 3 fits, a third entry does not
        let batches = plan(&texts, with_overhead, 27);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 2));
    }

    #[test]
    fn test_measures_each_entry_once() {
        let texts = numbered(2000, "abc");
        let mut calls = 0;
        let mut largest = 0;
        let counting = |batch: &StringSet| {
            calls += 1;
            largest = largest.max(batch.len());
            value_chars(batch)
        };

        let batches = plan(&texts, counting, 100);
        assert_eq!(batches.iter().map(StringSet::len).sum::<usize>(), 2000);
        // One call for the empty overhead, then one per entry
        assert_eq!(calls, 2001);
        assert_eq!(largest, 1);
    }

    #[test]
    fn test_estimation_failure_never_counts_as_zero() {
        let texts = numbered(3, "abc");
        let failing = |_: &StringSet| -> MtResult<usize> {
            Err(MtError::ConfigError("tokenizer unavailable".to_string()))
        };
        let batches = plan(&texts, failing, 1_000_000);
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn test_budget_for() {
        assert_eq!(budget_for(1000, 2), 500);
        assert_eq!(budget_for(2048, DEFAULT_BUFFER_FACTOR), 1024);
        assert_eq!(budget_for(1, 2), 1);
        assert_eq!(budget_for(100, 0), 100);
    }

    #[test]
    fn test_size_units() {
        assert_eq!(SizeUnit::Chars.estimate("héllo"), 5);
        assert_eq!(SizeUnit::Bytes.estimate("héllo"), 6);
        assert_eq!(SizeUnit::Tokens.estimate("12345678"), 2);
        assert_eq!(SizeUnit::Tokens.estimate("123456789"), 3);
        assert_eq!(approximate_tokens(""), 0);
    }

    proptest! {
        #[test]
        fn prop_batches_partition_input_in_order(
            entries in proptest::collection::btree_map("[a-z]{1,8}", "[a-z ]{0,30}", 0..40),
            budget in 1usize..120,
        ) {
            let texts = StringSet::from(entries);
            let batches = plan(&texts, value_chars, budget);

            let flattened: Vec<String> = batches
                .iter()
                .flat_map(|b| b.keys().cloned().collect::<Vec<_>>())
                .collect();
            let original: Vec<String> = texts.keys().cloned().collect();
            prop_assert_eq!(flattened, original);

            prop_assert!(batches.iter().all(|b| !b.is_empty()));
            for batch in &batches {
                if batch.len() > 1 {
                    prop_assert!(value_chars(batch).unwrap() <= budget);
                }
            }
        }
    }
}

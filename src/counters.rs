/// A named-counter table used for pipeline observability
///
///
use std::collections::BTreeMap;
use serde::Serialize;

pub const MAIN: &str = "MAIN";
pub const FILE_ERROR: &str = "FILE_ERROR";
pub const FILE_SUCCESS: &str = "FILE_SUCCESS";
pub const TRANSCRIPT_FOUND: &str = "TRANSCRIPT_FOUND";
pub const TRANSCRIPT_NOT_FOUND: &str = "TRANSCRIPT_NOT_FOUND";
pub const SUBSTITUTION_FOUND: &str = "SUBSTITUTION_FOUND";
pub const SUBSTITUTION_NOT_FOUND: &str = "SUBSTITUTION_NOT_FOUND";
pub const SUBSTITUTION_SUCCESS: &str = "SUBSTITUTION_SUCCESS";
pub const SUBSTITUTION_ERROR: &str = "SUBSTITUTION_ERROR";
pub const POSITION_FOUND: &str = "POSITION_FOUND";
pub const POSITION_2ND_ATTEMPT_FOUND: &str = "POSITION_2ND_ATTEMPT_FOUND";
pub const POSITION_3RD_ATTEMPT_FOUND: &str = "POSITION_3RD_ATTEMPT_FOUND";
pub const POSITION_NOT_FOUND: &str = "POSITION_NOT_FOUND";
pub const UNIPROT_TO_GRCH38_NOT_FOUND: &str = "UNIPROTtoGRch38_NOT_FOUND";
pub const MULTI_SEQ_FOUND: &str = "MULTI_SEQ_FOUND";
pub const MULTI_SEQ_POSITION_FOUND: &str = "MULTI_SEQ_POSITION_FOUND";
pub const SUBSTITUTION_FOUND_2ND_ATTEMPT: &str = "SUBSTITUTION_FOUND_2ND_ATTEMPT";
pub const SUBSTITUTION_FOUND_3RD_ATTEMPT: &str = "SUBSTITUTION_FOUND_3RD_ATTEMPT";

/// The full counter vocabulary, initialized to zero on construction so that
/// consumers always see a stable table. This crate increments only a subset;
/// the remaining names (multi-attempt resolution, cross-assembly mapping) are
/// kept at zero for parity with the wider processing pipeline.
pub const ALL_COUNTERS: [&str; 18] = [
    MAIN,
    FILE_ERROR,
    FILE_SUCCESS,
    TRANSCRIPT_FOUND,
    TRANSCRIPT_NOT_FOUND,
    SUBSTITUTION_FOUND,
    SUBSTITUTION_NOT_FOUND,
    SUBSTITUTION_SUCCESS,
    SUBSTITUTION_ERROR,
    POSITION_FOUND,
    POSITION_2ND_ATTEMPT_FOUND,
    POSITION_3RD_ATTEMPT_FOUND,
    POSITION_NOT_FOUND,
    UNIPROT_TO_GRCH38_NOT_FOUND,
    MULTI_SEQ_FOUND,
    MULTI_SEQ_POSITION_FOUND,
    SUBSTITUTION_FOUND_2ND_ATTEMPT,
    SUBSTITUTION_FOUND_3RD_ATTEMPT,
];

/// ### Summary
/// A table of named integer counters tracking pipeline outcomes, e.g. how many
/// transcript lookups hit or missed the database. One instance is created per
/// run and threaded by reference through the processing functions; parallel
/// workers fill local instances that are merged at a single aggregation point.
/// There is no process-wide counter state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticCounters
{
    counts: BTreeMap<&'static str, u64>,
}

impl DiagnosticCounters
{
    /// ### Summary
    /// Create a counter table with every name in the vocabulary set to zero.
    pub fn new() -> Self
    {
        let mut counts = BTreeMap::new();
        for name in ALL_COUNTERS.iter()
        {
            counts.insert(*name, 0u64);
        }
        DiagnosticCounters { counts }
    }

    /// ### Summary
    /// Reset every counter in the table back to zero, keeping the vocabulary.
    pub fn reset(&mut self)
    {
        for value in self.counts.values_mut()
        {
            *value = 0;
        }
    }

    #[inline]
    pub fn increment(&mut self, name: &'static str)
    {
        self.add(name, 1)
    }

    /// Unknown names are admitted into the table; the vocabulary is open so
    /// collaborators can tally their own stages alongside the core's.
    #[inline]
    pub fn add(&mut self, name: &'static str, amount: u64)
    {
        *self.counts.entry(name).or_insert(0) += amount;
    }

    #[inline]
    pub fn get(&self, name: &str) -> u64
    {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// ### Summary
    /// Fold another counter table into this one. Used as the aggregation point
    /// after parallel sections: each worker returns a local tally and the
    /// caller merges them one at a time, so counters are never incremented
    /// concurrently.
    pub fn merge(&mut self, other: &DiagnosticCounters)
    {
        for (name, value) in other.counts.iter()
        {
            *self.counts.entry(name).or_insert(0) += value;
        }
    }

    /// Iterate the table in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_
    {
        self.counts.iter().map(|(name, value)| (*name, *value))
    }
}

impl Default for DiagnosticCounters
{
    fn default() -> Self
    {
        DiagnosticCounters::new()
    }
}

/// Error kinds used across the crate, split by blast radius: loading a
/// sequence database or a mutation table can fail the whole run, while a
/// single bad row only fails that row.
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while building a [`crate::sequence_db::SequenceDatabase`].
/// Nothing downstream can succeed without a database, so these abort the run.
#[derive(Debug, Error)]
pub enum DatabaseError
{
    #[error("failed to read sequence database {path:?}: {source}")]
    Io
    {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse sequence database {path:?}: {reason}")]
    Parse
    {
        path: PathBuf,
        reason: String,
    },
    #[error("no sequence records could be loaded from {path:?}")]
    NoRecords
    {
        path: PathBuf,
    },
    /// Neither the header keywords nor the content scan could discover the
    /// named column; this aborts the whole load, it is not a per-row error.
    #[error("no {role} column could be discovered in {path:?}")]
    ColumnNotFound
    {
        role: &'static str,
        path: PathBuf,
    },
    #[error("unsupported sequence database format: {path:?}")]
    UnsupportedFormat
    {
        path: PathBuf,
    },
    #[error("failed to use cached database {path:?}: {reason}")]
    Cache
    {
        path: PathBuf,
        reason: String,
    },
}

/// Fatal errors raised while reading a mutation table or resolving the
/// caller-supplied column mapping. Raised before any row is processed.
#[derive(Debug, Error)]
pub enum TableError
{
    #[error("failed to read mutation table {path:?}: {source}")]
    Io
    {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse mutation table {path:?}: {reason}")]
    Parse
    {
        path: PathBuf,
        reason: String,
    },
    #[error("unsupported mutation table format: {path:?}")]
    UnsupportedFormat
    {
        path: PathBuf,
    },
    #[error("column '{column}' does not exist in {path:?}")]
    ColumnNotFound
    {
        column: String,
        path: PathBuf,
    },
}

/// Recoverable per-row errors. The batch driver converts each of these into
/// statistic/counter increments and moves on to the next row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError
{
    #[error("transcript {id} was not found in the sequence database")]
    TranscriptNotFound
    {
        id: String,
    },
    /// The notation uses a recognizable but unsupported scheme, most commonly
    /// nucleotide-level `c.` strings. Reported distinctly from malformed input.
    #[error("unsupported mutation notation: {notation}")]
    UnsupportedNotation
    {
        notation: String,
    },
    #[error("invalid mutation notation: {notation}")]
    InvalidNotation
    {
        notation: String,
    },
    #[error("position {position} is out of range for a sequence of length {length}")]
    PositionOutOfRange
    {
        position: usize,
        length: usize,
    },
}

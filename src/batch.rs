/// The batch driver: runs every row of a mutation table through transcript
/// resolution, notation parsing and peptide windowing, folding per-row
/// outcomes into run statistics. A bad row never aborts the batch.
///
///
use std::fs;
use std::io;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::counters::{self, DiagnosticCounters};
use crate::errors::{RowError, TableError};
use crate::mutation::MutationRecord;
use crate::mutation_table::MutationTable;
use crate::peptides::{extract_mutant_peptide, format_fasta_record, PeptideResult};
use crate::sequence_db::SequenceDatabase;
use crate::utils::normalize_transcript_id;

/// The caller-chosen column names for the identifier and mutation columns.
/// The batch path never auto-detects these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping
{
    pub transcript_id: String,
    pub mutation: String,
}

impl ColumnMapping
{
    pub fn new(transcript_id: &str, mutation: &str) -> Self
    {
        ColumnMapping {
            transcript_id: transcript_id.to_string(),
            mutation: mutation.to_string(),
        }
    }
}

/// ### Summary
/// Aggregated outcome counts over one batch run. `total` covers every input
/// row; `processed` counts rows that completed the whole pipeline, so it
/// always equals `successful`; `successful + failed == total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics
{
    #[serde(rename = "total_mutations")]
    pub total: u64,
    #[serde(rename = "processed_mutations")]
    pub processed: u64,
    #[serde(rename = "successful_peptides")]
    pub successful: u64,
    #[serde(rename = "failed_peptides")]
    pub failed: u64,
    pub invalid_transcripts: u64,
    pub invalid_mutations: u64,
}

impl RunStatistics
{
    /// Fold one terminally-resolved row outcome into the statistics.
    fn record(&mut self, outcome: &Result<PeptideResult, RowError>)
    {
        match outcome
        {
            Ok(_) =>
            {
                self.successful += 1;
                self.processed += 1;
            }
            Err(RowError::TranscriptNotFound { .. }) =>
            {
                self.invalid_transcripts += 1;
                self.failed += 1;
            }
            Err(RowError::UnsupportedNotation { .. })
            | Err(RowError::InvalidNotation { .. })
            | Err(RowError::PositionOutOfRange { .. }) =>
            {
                self.invalid_mutations += 1;
                self.failed += 1;
            }
        }
    }
}

/// ### Summary
/// The structured result of one batch run: the ordered peptide list (input
/// row order, failed rows omitted) plus the final statistics. Serializes to
/// the summary JSON layout; the FASTA rendering lives in
/// [`Self::to_fasta`]/[`Self::write_fasta`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary
{
    #[serde(rename = "mutation_peptides")]
    pub peptides: Vec<PeptideResult>,
    pub stats: RunStatistics,
    #[serde(skip)]
    pub window_size: usize,
}

impl BatchSummary
{
    /// Render every peptide as FASTA, in input row order.
    pub fn to_fasta(&self, include_sequence_info: bool) -> String
    {
        self.peptides
            .iter()
            .map(|result| format_fasta_record(result, self.window_size, include_sequence_info))
            .collect()
    }

    pub fn write_fasta(&self, path: &Path, include_sequence_info: bool) -> io::Result<()>
    {
        fs::write(path, self.to_fasta(include_sequence_info))
    }

    /// The summary JSON document: the ordered peptide list plus statistics.
    pub fn to_json(&self) -> serde_json::Result<String>
    {
        serde_json::to_string_pretty(self)
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()>
    {
        let document = self
            .to_json()
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
        fs::write(path, document)
    }
}

/// ### Summary
/// Drives the full batch over a mutation table against a read-only sequence
/// database. Each row walks resolve -> parse -> window; failures at any stage
/// are absorbed into the statistics and the next row is processed.
pub struct BatchProcessor<'a>
{
    database: &'a SequenceDatabase,
    window_size: usize,
}

impl<'a> BatchProcessor<'a>
{
    pub fn new(database: &'a SequenceDatabase, window_size: usize) -> Self
    {
        if window_size == 0
        {
            panic!("the peptide window size must be at least 1");
        }
        BatchProcessor { database, window_size }
    }

    /// ### Summary
    /// Process one row: normalize the identifier cell, resolve it against the
    /// database, parse the mutation notation and window the sequence. Every
    /// stage outcome is tallied into `diagnostics`, including the terminal
    /// `SUBSTITUTION_SUCCESS`/`SUBSTITUTION_ERROR` verdict.
    pub fn process_row(
        &self,
        table: &MutationTable,
        row: usize,
        identifier_column: usize,
        mutation_column: usize,
        diagnostics: &mut DiagnosticCounters,
    ) -> Result<PeptideResult, RowError>
    {
        let outcome = self.resolve_row(table, row, identifier_column, mutation_column, diagnostics);
        match outcome
        {
            Ok(_) => diagnostics.increment(counters::SUBSTITUTION_SUCCESS),
            Err(_) => diagnostics.increment(counters::SUBSTITUTION_ERROR),
        }
        outcome
    }

    fn resolve_row(
        &self,
        table: &MutationTable,
        row: usize,
        identifier_column: usize,
        mutation_column: usize,
        diagnostics: &mut DiagnosticCounters,
    ) -> Result<PeptideResult, RowError>
    {
        diagnostics.increment(counters::MAIN);

        let transcript_id = normalize_transcript_id(table.cell(row, identifier_column));
        let sequence = self.database.lookup(&transcript_id, diagnostics)?;

        let notation = table.cell(row, mutation_column);
        let record = match MutationRecord::parse(&transcript_id, notation)
        {
            Ok(record) =>
            {
                diagnostics.increment(counters::SUBSTITUTION_FOUND);
                record
            }
            Err(error) =>
            {
                diagnostics.increment(counters::SUBSTITUTION_NOT_FOUND);
                return Err(error);
            }
        };

        let window = match extract_mutant_peptide(
            sequence,
            record.position_0based(),
            record.mutant_aa,
            self.window_size,
        )
        {
            Ok(window) =>
            {
                diagnostics.increment(counters::POSITION_FOUND);
                window
            }
            Err(error) =>
            {
                diagnostics.increment(counters::POSITION_NOT_FOUND);
                return Err(error);
            }
        };

        Ok(PeptideResult {
            transcript_id: record.transcript_id,
            mutation_notation: record.notation,
            position_1based: record.position_1based,
            peptide: window.peptide,
            original_aa_in_sequence: window.original_aa_in_sequence,
            mutant_aa: record.mutant_aa,
        })
    }

    /// ### Summary
    /// Run the batch sequentially, row by row in input order.
    /// ### Returns
    /// The summary, or a fatal [`TableError`] when the column mapping does not
    /// resolve (raised before any row is processed).
    pub fn process(
        &self,
        table: &MutationTable,
        mapping: &ColumnMapping,
        diagnostics: &mut DiagnosticCounters,
    ) -> Result<BatchSummary, TableError>
    {
        let identifier_column = table.require_column(&mapping.transcript_id)?;
        let mutation_column = table.require_column(&mapping.mutation)?;

        let mut stats = RunStatistics { total: table.num_rows() as u64, ..Default::default() };
        let mut peptides = Vec::new();
        for row in 0..table.num_rows()
        {
            let outcome =
                self.process_row(table, row, identifier_column, mutation_column, diagnostics);
            stats.record(&outcome);
            match outcome
            {
                Ok(result) => peptides.push(result),
                Err(error) => log::warn!("row {}: {}", row + 1, error),
            }
        }

        Ok(BatchSummary { peptides, stats, window_size: self.window_size })
    }

    /// ### Summary
    /// Run the batch with rayon. Rows are embarrassingly parallel: the
    /// database is shared read-only, each row task fills a local counter
    /// table, and row outcomes plus locals are folded at a single aggregation
    /// point afterwards, in input row order. Produces results and statistics
    /// identical to [`Self::process`].
    pub fn par_process(
        &self,
        table: &MutationTable,
        mapping: &ColumnMapping,
        diagnostics: &mut DiagnosticCounters,
    ) -> Result<BatchSummary, TableError>
    {
        let identifier_column = table.require_column(&mapping.transcript_id)?;
        let mutation_column = table.require_column(&mapping.mutation)?;

        let outcomes: Vec<(Result<PeptideResult, RowError>, DiagnosticCounters)> = (0..table
            .num_rows())
            .into_par_iter()
            .map(|row| {
                let mut local = DiagnosticCounters::new();
                let outcome =
                    self.process_row(table, row, identifier_column, mutation_column, &mut local);
                (outcome, local)
            })
            .collect();

        // single-writer aggregation point, in input row order
        let mut stats = RunStatistics { total: table.num_rows() as u64, ..Default::default() };
        let mut peptides = Vec::new();
        for (row, (outcome, local)) in outcomes.into_iter().enumerate()
        {
            diagnostics.merge(&local);
            stats.record(&outcome);
            match outcome
            {
                Ok(result) => peptides.push(result),
                Err(error) => log::warn!("row {}: {}", row + 1, error),
            }
        }

        Ok(BatchSummary { peptides, stats, window_size: self.window_size })
    }
}

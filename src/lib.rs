/// A collection of functions and types for mapping point-mutation calls onto
/// reference protein sequences and generating mutant peptide windows for
/// LC-MS/MS database search.
///
/// The crate is the processing core behind an interactive front-end: the
/// front-end chooses the files, the column mapping and the window size, and
/// renders whatever this crate returns. Nothing here installs a logger,
/// opens dialogs or creates directories.
///
///
use std::path::Path;

use chrono::Utc;

pub mod batch;
pub mod counters;
pub mod errors;
pub mod file_block;
pub mod mutation;
pub mod mutation_table;
pub mod peptides;
pub mod sequence_db;
pub mod utils;

pub use crate::batch::{BatchProcessor, BatchSummary, ColumnMapping, RunStatistics};
pub use crate::counters::DiagnosticCounters;
pub use crate::errors::{DatabaseError, RowError, TableError};
pub use crate::mutation::MutationRecord;
pub use crate::mutation_table::MutationTable;
pub use crate::peptides::{PeptideResult, PeptideWindow};
pub use crate::sequence_db::SequenceDatabase;

/// ### Summary
/// Load a sequence database from a FASTA or delimited tabular reference file,
/// dispatching on the file extension.
/// ### Parameters
/// path: the reference file to load
/// ### Returns
/// The read-only database, or a fatal [`DatabaseError`] with file and column
/// context.
pub fn load_sequence_database(path: &Path) -> Result<SequenceDatabase, DatabaseError>
{
    log::info!("loading sequence database from {} ... {}", path.display(), Utc::now());
    let database = SequenceDatabase::from_file(path)?;
    log::info!("sequence database ready with {} entries", database.len());
    Ok(database)
}

/// ### Summary
/// Read a mutation table (CSV, TSV or MAF) into memory so its columns can be
/// mapped and the batch run over it.
pub fn read_mutation_table(path: &Path) -> Result<MutationTable, TableError>
{
    MutationTable::read_table(path)
}

/// ### Summary
/// Run the full peptide generation batch: resolve the caller-chosen columns,
/// process every row in parallel against the database and fold the outcomes
/// into statistics. The counter table is reset at the start of the run.
/// ### Parameters
/// database: the read-only identifier-to-sequence mapping
/// table: the mutation table to iterate
/// mapping: the caller-chosen identifier and mutation column names
/// window_size: total peptide window length centered on each mutation site
/// diagnostics: the run's counter table, reset and then filled
/// ### Returns
/// The ordered peptide results plus run statistics, or a fatal
/// [`TableError`] when the mapping does not resolve. Per-row failures never
/// abort the run; a summary with zero successful peptides is a valid outcome.
pub fn generate_mutant_peptides(
    database: &SequenceDatabase,
    table: &MutationTable,
    mapping: &ColumnMapping,
    window_size: usize,
    diagnostics: &mut DiagnosticCounters,
) -> Result<BatchSummary, TableError>
{
    diagnostics.reset();
    log::info!(
        "processing {} mutations with a window of {} ... {}",
        table.num_rows(),
        window_size,
        Utc::now()
    );
    let summary =
        BatchProcessor::new(database, window_size).par_process(table, mapping, diagnostics)?;
    log::info!(
        "generated {} peptides from {} mutations, {} failed ... {}",
        summary.stats.successful,
        summary.stats.total,
        summary.stats.failed,
        Utc::now()
    );
    Ok(summary)
}

#[cfg(test)]
mod test_pipeline
{
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn end_to_end_from_files()
    {
        let directory = tempfile::tempdir().unwrap();

        let database_path = directory.path().join("sequences.fasta");
        let mut database_file = File::create(&database_path).unwrap();
        write!(database_file, ">ENST00000000001.4\nMAVLIRRPLV\n>ENST00000000002\nGLATEKSRWSG\n")
            .unwrap();
        drop(database_file);

        let table_path = directory.path().join("calls.csv");
        let mut table_file = File::create(&table_path).unwrap();
        write!(
            table_file,
            "Transcript_ID,Protein_Change\nENST00000000001,p.V3E\nENST00000000002.1,p.G1W\nENST00000009999,p.A2T\n"
        )
        .unwrap();
        drop(table_file);

        let database = load_sequence_database(&database_path).unwrap();
        let table = read_mutation_table(&table_path).unwrap();
        let mapping = ColumnMapping::new("Transcript_ID", "Protein_Change");
        let mut diagnostics = DiagnosticCounters::new();
        let summary =
            generate_mutant_peptides(&database, &table, &mapping, 5, &mut diagnostics).unwrap();

        assert_eq!(summary.stats.total, 3);
        assert_eq!(summary.stats.successful, 2);
        assert_eq!(summary.stats.invalid_transcripts, 1);
        assert_eq!(summary.peptides[0].peptide, "MAELI");
        assert_eq!(summary.peptides[1].peptide, "WLA");
        assert_eq!(diagnostics.get(counters::TRANSCRIPT_FOUND), 2);

        let fasta_path = directory.path().join("mutation_peptides.fasta");
        summary.write_fasta(&fasta_path, true).unwrap();
        let rendered = std::fs::read_to_string(&fasta_path).unwrap();
        assert!(rendered.starts_with(">ENST00000000001|V3E|pos:3|window:5|mutant\nMAELI\n"));

        let json_path = directory.path().join("analysis_summary.json");
        summary.write_json(&json_path).unwrap();
        let document: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(document["stats"]["total_mutations"], 3);
    }
}

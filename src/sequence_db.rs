/// The identifier-to-sequence lookup built from heterogeneous reference
/// files: plain FASTA, or delimited tabular exports whose identifier cells
/// carry quoted, semicolon-separated ENST lists (the shape UniProt produces).
///
///
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::counters::{self, DiagnosticCounters};
use crate::errors::{DatabaseError, RowError};
use crate::utils::{
    enst_pattern, extract_enst_ids, looks_like_protein_sequence, quoted_pattern, strip_version,
};

/// How many leading non-empty cells of a column the identifier content
/// detector inspects.
const IDENTIFIER_SAMPLE: usize = 10;
/// How many leading non-empty cells of a column the sequence content
/// detector inspects.
const SEQUENCE_SAMPLE: usize = 5;

const IDENTIFIER_KEYWORDS: [&str; 3] = ["ensembl", "enst", "transcript"];
const SEQUENCE_KEYWORDS: [&str; 3] = ["sequence", "seq", "protein"];

/// A column-discovery strategy: given the headers, the data records and the
/// set of excluded column indices, return the matching column if any.
/// Detectors are tried in order, first success wins, so new heuristics can be
/// appended without touching the loader.
pub type ColumnDetector = Box<dyn Fn(&[String], &[csv::StringRecord], &[usize]) -> Option<usize>>;

/// ### Summary
/// A detector matching on the column name: the first non-excluded header
/// whose lowercased name contains any of the keywords wins.
pub fn keyword_detector(keywords: &'static [&'static str]) -> ColumnDetector
{
    Box::new(move |headers, _records, excluded| {
        headers
            .iter()
            .enumerate()
            .filter(|(index, _)| !excluded.contains(index))
            .find(|(_, header)| {
                let lowered = header.to_lowercase();
                keywords.iter().any(|keyword| lowered.contains(keyword))
            })
            .map(|(index, _)| index)
    })
}

/// ### Summary
/// A detector matching on cell content: the first non-excluded column whose
/// leading `sample_size` non-empty values contain at least one cell accepted
/// by the predicate wins.
pub fn content_detector<P>(sample_size: usize, predicate: P) -> ColumnDetector
where
    P: Fn(&str) -> bool + 'static,
{
    Box::new(move |headers, records, excluded| {
        (0..headers.len())
            .filter(|index| !excluded.contains(index))
            .find(|&index| {
                records
                    .iter()
                    .filter_map(|record| record.get(index))
                    .map(|cell| cell.trim())
                    .filter(|cell| !cell.is_empty())
                    .take(sample_size)
                    .any(|cell| predicate(cell))
            })
    })
}

/// The ordered strategies for discovering the identifier column.
pub fn identifier_detectors() -> Vec<ColumnDetector>
{
    let enst = enst_pattern();
    vec![
        keyword_detector(&IDENTIFIER_KEYWORDS),
        content_detector(IDENTIFIER_SAMPLE, move |cell| enst.is_match(cell)),
    ]
}

/// The ordered strategies for discovering the sequence column.
pub fn sequence_detectors() -> Vec<ColumnDetector>
{
    vec![
        keyword_detector(&SEQUENCE_KEYWORDS),
        content_detector(SEQUENCE_SAMPLE, looks_like_protein_sequence),
    ]
}

fn detect_column(
    headers: &[String],
    records: &[csv::StringRecord],
    excluded: &[usize],
    detectors: &[ColumnDetector],
) -> Option<usize>
{
    detectors
        .iter()
        .find_map(|detector| detector(headers, records, excluded))
}

fn tabular_delimiter(path: &Path) -> u8
{
    match extension_of(path).as_str()
    {
        "tsv" | "txt" => b'\t',
        _ => b',',
    }
}

fn extension_of(path: &Path) -> String
{
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_lowercase())
        .unwrap_or_default()
}

/// ### Summary
/// The read-only transcript-identifier-to-protein-sequence mapping the batch
/// driver resolves against. Built once per run from a FASTA or tabular source
/// (or restored from a binary cache) and never mutated afterwards, so it can
/// be shared freely across parallel workers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceDatabase
{
    sequences: HashMap<String, String>,
}

impl SequenceDatabase
{
    pub fn new() -> Self
    {
        SequenceDatabase { sequences: HashMap::new() }
    }

    /// ### Summary
    /// Load a database from a file, dispatching on the extension: FASTA for
    /// `fasta`/`fa`/`faa`/`fna`, delimited tabular for `csv`/`tsv`/`txt`.
    pub fn from_file(path: &Path) -> Result<Self, DatabaseError>
    {
        match extension_of(path).as_str()
        {
            "fasta" | "fa" | "faa" | "fna" => SequenceDatabase::load_fasta(path),
            "csv" | "tsv" | "txt" => SequenceDatabase::load_tabular(path),
            _ => Err(DatabaseError::UnsupportedFormat { path: path.to_path_buf() }),
        }
    }

    /// ### Summary
    /// Build the mapping from a FASTA file. The key of each record is the
    /// first whitespace token of its header, kept up to (but excluding) the
    /// first `.`; folded sequence lines are concatenated. Records with an
    /// empty identifier or sequence are skipped.
    pub fn load_fasta(path: &Path) -> Result<Self, DatabaseError>
    {
        let file = File::open(path)
            .map_err(|source| DatabaseError::Io { path: path.to_path_buf(), source })?;
        let reader = BufReader::new(file);

        let mut sequences = HashMap::new();
        let mut current_id: Option<String> = None;
        let mut current_seq = String::new();
        for line in reader.lines()
        {
            let line =
                line.map_err(|source| DatabaseError::Io { path: path.to_path_buf(), source })?;
            let line = line.trim();
            if let Some(header) = line.strip_prefix('>')
            {
                if let Some(id) = current_id.take()
                {
                    if !id.is_empty() && !current_seq.is_empty()
                    {
                        sequences.insert(id, std::mem::take(&mut current_seq));
                    }
                }
                current_seq.clear();
                let token = header.trim().split_whitespace().next().unwrap_or("");
                current_id = Some(strip_version(token).to_string());
            }
            else if current_id.is_some()
            {
                current_seq.push_str(line);
            }
        }
        if let Some(id) = current_id.take()
        {
            if !id.is_empty() && !current_seq.is_empty()
            {
                sequences.insert(id, current_seq);
            }
        }

        if sequences.is_empty()
        {
            return Err(DatabaseError::NoRecords { path: path.to_path_buf() });
        }
        log::info!("loaded {} sequences from FASTA {}", sequences.len(), path.display());
        Ok(SequenceDatabase { sequences })
    }

    /// ### Summary
    /// Build the mapping from a delimited tabular export. The delimiter is
    /// chosen from the extension (`tsv`/`txt` are tab, anything else comma),
    /// the identifier and sequence columns are discovered with the ordered
    /// detector lists, and each identifier cell may register the row's
    /// sequence under several extracted ENST tokens (version-stripped).
    /// ### Returns
    /// The database, or [`DatabaseError::ColumnNotFound`] when either column
    /// cannot be discovered; that aborts the whole load.
    pub fn load_tabular(path: &Path) -> Result<Self, DatabaseError>
    {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(tabular_delimiter(path))
            .flexible(true)
            .from_path(path)
            .map_err(|error| csv_database_error(error, path))?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|error| csv_database_error(error, path))?
            .iter()
            .map(|header| header.to_string())
            .collect();
        let mut records = Vec::new();
        for record in reader.records()
        {
            records.push(record.map_err(|error| csv_database_error(error, path))?);
        }

        let identifier_column =
            detect_column(&headers, &records, &[], &identifier_detectors()).ok_or(
                DatabaseError::ColumnNotFound { role: "identifier", path: path.to_path_buf() },
            )?;
        let sequence_column =
            detect_column(&headers, &records, &[identifier_column], &sequence_detectors())
                .ok_or(DatabaseError::ColumnNotFound {
                    role: "sequence",
                    path: path.to_path_buf(),
                })?;
        log::info!(
            "using column '{}' for identifiers and '{}' for sequences in {}",
            headers[identifier_column],
            headers[sequence_column],
            path.display()
        );

        let enst = enst_pattern();
        let quoted = quoted_pattern();
        let mut sequences = HashMap::new();
        for record in records.iter()
        {
            let identifier_cell = record.get(identifier_column).unwrap_or("").trim();
            let sequence_cell = record.get(sequence_column).unwrap_or("").trim();
            if identifier_cell.is_empty() || sequence_cell.is_empty()
            {
                continue;
            }
            for enst_id in extract_enst_ids(identifier_cell, &enst, &quoted)
            {
                sequences.insert(strip_version(&enst_id).to_string(), sequence_cell.to_string());
            }
        }

        if sequences.is_empty()
        {
            return Err(DatabaseError::NoRecords { path: path.to_path_buf() });
        }
        log::info!("mapped {} ENST identifiers from {}", sequences.len(), path.display());
        Ok(SequenceDatabase { sequences })
    }

    /// ### Summary
    /// Resolve an identifier (version suffix ignored) and record the outcome
    /// in the counter table: `TRANSCRIPT_FOUND` on a hit,
    /// `TRANSCRIPT_NOT_FOUND` on a miss.
    pub fn lookup(
        &self,
        identifier: &str,
        diagnostics: &mut DiagnosticCounters,
    ) -> Result<&str, RowError>
    {
        let key = strip_version(identifier);
        match self.sequences.get(key)
        {
            Some(sequence) =>
            {
                diagnostics.increment(counters::TRANSCRIPT_FOUND);
                Ok(sequence.as_str())
            }
            None =>
            {
                diagnostics.increment(counters::TRANSCRIPT_NOT_FOUND);
                Err(RowError::TranscriptNotFound { id: key.to_string() })
            }
        }
    }

    /// Uncounted accessor with the same identifier normalization as `lookup`.
    #[inline]
    pub fn get(&self, identifier: &str) -> Option<&String>
    {
        self.sequences.get(strip_version(identifier))
    }

    #[inline]
    pub fn len(&self) -> usize
    {
        self.sequences.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool
    {
        self.sequences.is_empty()
    }

    /// Register one identifier-sequence pair (version suffix stripped).
    pub fn insert(&mut self, identifier: &str, sequence: &str)
    {
        self.sequences
            .insert(strip_version(identifier).to_string(), sequence.to_string());
    }

    /// ### Summary
    /// Serialize the mapping to disk with bincode so later runs over the same
    /// source file can skip parsing and reload it with [`Self::from_cache`].
    pub fn cache_to_disk(&self, path: &Path) -> Result<(), DatabaseError>
    {
        let file = File::create(path)
            .map_err(|source| DatabaseError::Io { path: path.to_path_buf(), source })?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &self.sequences)
            .map_err(|error| DatabaseError::Cache {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })
    }

    /// Restore a mapping written by [`Self::cache_to_disk`].
    pub fn from_cache(path: &Path) -> Result<Self, DatabaseError>
    {
        let file = File::open(path)
            .map_err(|source| DatabaseError::Io { path: path.to_path_buf(), source })?;
        let reader = BufReader::new(file);
        let sequences: HashMap<String, String> = bincode::deserialize_from(reader)
            .map_err(|error| DatabaseError::Cache {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?;
        Ok(SequenceDatabase { sequences })
    }

    /// ### Summary
    /// Write the mapping out as FASTA, one `>identifier` / sequence pair per
    /// entry, identifier-sorted so the output is deterministic.
    pub fn save_to_fasta(&self, path: &Path) -> Result<(), DatabaseError>
    {
        let file = File::create(path)
            .map_err(|source| DatabaseError::Io { path: path.to_path_buf(), source })?;
        let mut writer = BufWriter::new(file);
        let mut identifiers: Vec<&String> = self.sequences.keys().collect();
        identifiers.sort();
        for identifier in identifiers
        {
            writeln!(writer, ">{}", identifier)
                .and_then(|_| writeln!(writer, "{}", self.sequences[identifier]))
                .map_err(|source| DatabaseError::Io { path: path.to_path_buf(), source })?;
        }
        Ok(())
    }
}

fn csv_database_error(error: csv::Error, path: &Path) -> DatabaseError
{
    DatabaseError::Parse { path: path.to_path_buf(), reason: error.to_string() }
}

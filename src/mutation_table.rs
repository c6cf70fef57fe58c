/// An in-memory representation of the caller-selected mutation table, read
/// from comma-delimited, tab-delimited, or MAF-style (tab-delimited with `#`
/// comment lines) files.
///
///
use std::path::{Path, PathBuf};

use crate::errors::TableError;

/// ### Summary
/// Headers plus raw row records. Cells are addressed by row index and column
/// index; missing cells in ragged rows read as empty strings, matching how
/// the rest of the pipeline treats absent values. Column selection for the
/// batch path is never auto-detected: the caller resolves its chosen column
/// names through [`Self::column_index`].
#[derive(Debug, Clone)]
pub struct MutationTable
{
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl MutationTable
{
    /// ### Summary
    /// Read a mutation table from disk. The delimiter and comment handling
    /// are chosen from the extension: `csv` is comma-delimited, `tsv` is
    /// tab-delimited, `maf` and `txt` are tab-delimited with lines starting
    /// with `#` skipped. Ragged rows are tolerated.
    pub fn read_table(path: &Path) -> Result<Self, TableError>
    {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_lowercase())
            .unwrap_or_default();
        let (delimiter, comment) = match extension.as_str()
        {
            "csv" => (b',', None),
            "tsv" => (b'\t', None),
            "maf" | "txt" => (b'\t', Some(b'#')),
            _ => return Err(TableError::UnsupportedFormat { path: path.to_path_buf() }),
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .comment(comment)
            .flexible(true)
            .from_path(path)
            .map_err(|error| csv_table_error(error, path))?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|error| csv_table_error(error, path))?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for record in reader.records()
        {
            rows.push(record.map_err(|error| csv_table_error(error, path))?);
        }

        log::info!(
            "loaded mutation table {} with {} rows and {} columns",
            path.display(),
            rows.len(),
            headers.len()
        );
        Ok(MutationTable { path: path.to_path_buf(), headers, rows })
    }

    /// Build a table directly from headers and rows; used by callers that
    /// already hold row records (and by tests).
    pub fn from_records(headers: Vec<String>, rows: Vec<csv::StringRecord>) -> Self
    {
        MutationTable { path: PathBuf::from("<memory>"), headers, rows }
    }

    #[inline]
    pub fn num_rows(&self) -> usize
    {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool
    {
        self.rows.is_empty()
    }

    #[inline]
    pub fn headers(&self) -> &[String]
    {
        &self.headers
    }

    #[inline]
    pub fn path(&self) -> &Path
    {
        &self.path
    }

    /// Resolve a caller-supplied column name to its index, exact match.
    pub fn column_index(&self, name: &str) -> Option<usize>
    {
        self.headers.iter().position(|header| header == name)
    }

    /// The raw cell at (row, column); empty when the row is too short.
    #[inline]
    pub fn cell(&self, row: usize, column: usize) -> &str
    {
        self.rows
            .get(row)
            .and_then(|record| record.get(column))
            .unwrap_or("")
    }

    /// Resolve a mapping name or fail with the fatal, path-carrying error the
    /// batch driver surfaces before any row is processed.
    pub fn require_column(&self, name: &str) -> Result<usize, TableError>
    {
        self.column_index(name).ok_or_else(|| TableError::ColumnNotFound {
            column: name.to_string(),
            path: self.path.clone(),
        })
    }
}

fn csv_table_error(error: csv::Error, path: &Path) -> TableError
{
    TableError::Parse { path: path.to_path_buf(), reason: error.to_string() }
}

#[cfg(test)]
mod test_mutation_table
{
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_fixture(directory: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf
    {
        let path = directory.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_tables_are_comma_delimited()
    {
        let directory = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &directory,
            "calls.csv",
            "Transcript_ID,Protein_Change,Gene\nENST00000288602.11,p.V600E,BRAF\n",
        );
        let table = MutationTable::read_table(&path).unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.headers(), &["Transcript_ID", "Protein_Change", "Gene"]);
        assert_eq!(table.cell(0, 0), "ENST00000288602.11");
        assert_eq!(table.cell(0, 1), "p.V600E");
    }

    #[test]
    fn maf_comment_lines_are_skipped()
    {
        let directory = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &directory,
            "calls.maf",
            "#version 2.4\nTranscript_ID\tProtein_Change\nENST00000269305\tp.R175H\n#trailing comment\nENST00000288602\tp.V600E\n",
        );
        let table = MutationTable::read_table(&path).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.cell(0, 1), "p.R175H");
        assert_eq!(table.cell(1, 1), "p.V600E");
    }

    #[test]
    fn ragged_rows_read_missing_cells_as_empty()
    {
        let directory = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &directory,
            "calls.tsv",
            "Transcript_ID\tProtein_Change\nENST00000269305\n",
        );
        let table = MutationTable::read_table(&path).unwrap();
        assert_eq!(table.cell(0, 0), "ENST00000269305");
        assert_eq!(table.cell(0, 1), "");
        // out-of-range rows are also empty rather than a panic
        assert_eq!(table.cell(5, 0), "");
    }

    #[test]
    fn column_resolution_is_exact_and_fatal_when_missing()
    {
        let directory = tempfile::tempdir().unwrap();
        let path = write_fixture(&directory, "calls.csv", "Transcript_ID,Protein_Change\n");
        let table = MutationTable::read_table(&path).unwrap();
        assert_eq!(table.column_index("Protein_Change"), Some(1));
        assert_eq!(table.column_index("protein_change"), None);
        match table.require_column("Missing")
        {
            Err(TableError::ColumnNotFound { column, .. }) => assert_eq!(column, "Missing"),
            other => panic!("expected ColumnNotFound, got {:?}", other),
        }
    }

    #[test]
    fn unknown_extensions_are_rejected()
    {
        match MutationTable::read_table(Path::new("calls.xlsx"))
        {
            Err(TableError::UnsupportedFormat { .. }) => {}
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }
}

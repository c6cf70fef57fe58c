/// Peptide window extraction around a mutation site and FASTA formatting of
/// the resulting records
///
///
use serde::{Deserialize, Serialize};

use crate::errors::RowError;

/// ### Summary
/// One generated mutant peptide. `mutation_notation` is the prefix-stripped
/// description body (`V600E`); `original_aa_in_sequence` is the residue that
/// was actually present in the reference at the mutation site, which callers
/// can compare against the residue the notation declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeptideResult
{
    pub transcript_id: String,
    #[serde(rename = "mutation")]
    pub mutation_notation: String,
    #[serde(rename = "position")]
    pub position_1based: usize,
    pub peptide: String,
    #[serde(rename = "original_aa")]
    pub original_aa_in_sequence: char,
    pub mutant_aa: char,
}

/// The outcome of windowing one site: the mutant peptide and the reference
/// residue that was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeptideWindow
{
    pub peptide: String,
    pub original_aa_in_sequence: char,
}

/// ### Summary
/// Compute the clamped peptide window centered on a zero-based position and
/// substitute the mutant residue at that position.
/// ### Parameters
/// sequence: the reference protein sequence
/// position: the zero-based mutation site
/// mutant_aa: the residue to place at the site
/// window_size: total window length; the half-window is `window_size / 2`
/// ### Returns
/// The mutant peptide of length `min(window_size, sequence length)`, shorter
/// than `window_size` only when the site sits near a sequence boundary, or
/// [`RowError::PositionOutOfRange`] when the site is not inside the sequence.
pub fn extract_mutant_peptide(
    sequence: &str,
    position: usize,
    mutant_aa: char,
    window_size: usize,
) -> Result<PeptideWindow, RowError>
{
    let residues: Vec<char> = sequence.chars().collect();
    let length = residues.len();
    if position >= length
    {
        return Err(RowError::PositionOutOfRange { position: position + 1, length });
    }

    let half_window = window_size / 2;
    let start = position.saturating_sub(half_window);
    let end = std::cmp::min(length, position + half_window + 1);
    let rel_pos = position - start;
    if rel_pos >= end - start
    {
        // unreachable given the clamping above; kept so window arithmetic
        // inconsistencies surface as a per-row error instead of a panic
        return Err(RowError::PositionOutOfRange { position: position + 1, length });
    }

    let mut peptide = String::with_capacity(end - start);
    for (offset, residue) in residues[start..end].iter().enumerate()
    {
        if offset == rel_pos
        {
            peptide.push(mutant_aa);
        }
        else
        {
            peptide.push(*residue);
        }
    }

    Ok(PeptideWindow { peptide, original_aa_in_sequence: residues[position] })
}

/// ### Summary
/// Render one peptide record as a FASTA entry. With sequence info included the
/// header carries the transcript, the substitution, the 1-based position, the
/// window size and a `mutant` tag; without it the header is a compact
/// underscore-joined form.
pub fn format_fasta_record(
    result: &PeptideResult,
    window_size: usize,
    include_sequence_info: bool,
) -> String
{
    if include_sequence_info
    {
        format!(
            ">{}|{}|pos:{}|window:{}|mutant\n{}\n",
            result.transcript_id,
            result.mutation_notation,
            result.position_1based,
            window_size,
            result.peptide
        )
    }
    else
    {
        format!(
            ">{}_{}_mutant\n{}\n",
            result.transcript_id, result.mutation_notation, result.peptide
        )
    }
}

#[cfg(test)]
mod test_peptide_windowing
{
    use super::*;

    const SEQUENCE: &str = "MAVLIRRPLV";

    #[test]
    fn interior_site_gets_the_full_window()
    {
        // p.V3E on a length-10 sequence with window 5: start=0, end=5
        let window = extract_mutant_peptide(SEQUENCE, 2, 'E', 5).unwrap();
        assert_eq!(window.peptide, "MAELI");
        assert_eq!(window.original_aa_in_sequence, 'V');
    }

    #[test]
    fn left_boundary_clamps_the_window()
    {
        // p.M1K: start=0, end=3
        let window = extract_mutant_peptide(SEQUENCE, 0, 'K', 5).unwrap();
        assert_eq!(window.peptide, "KAV");
        assert_eq!(window.original_aa_in_sequence, 'M');
    }

    #[test]
    fn right_boundary_clamps_the_window()
    {
        // p.V10K: start=7, end=10
        let window = extract_mutant_peptide(SEQUENCE, 9, 'K', 5).unwrap();
        assert_eq!(window.peptide, "PLK");
        assert_eq!(window.original_aa_in_sequence, 'V');
    }

    #[test]
    fn window_larger_than_the_sequence_returns_the_whole_sequence()
    {
        let window = extract_mutant_peptide(SEQUENCE, 2, 'E', 25).unwrap();
        assert_eq!(window.peptide, "MAELIRRPLV");
        assert_eq!(window.peptide.len(), SEQUENCE.len());
    }

    #[test]
    fn out_of_range_positions_fail()
    {
        assert_eq!(
            extract_mutant_peptide(SEQUENCE, 15, 'K', 5).unwrap_err(),
            RowError::PositionOutOfRange { position: 16, length: 10 }
        );
        assert_eq!(
            extract_mutant_peptide("", 0, 'K', 5).unwrap_err(),
            RowError::PositionOutOfRange { position: 1, length: 0 }
        );
    }

    #[test]
    fn fasta_records_follow_the_header_layout()
    {
        let result = PeptideResult {
            transcript_id: "ENST00000288602".to_string(),
            mutation_notation: "V600E".to_string(),
            position_1based: 600,
            peptide: "GLATEKSRWSG".to_string(),
            original_aa_in_sequence: 'V',
            mutant_aa: 'E',
        };
        assert_eq!(
            format_fasta_record(&result, 11, true),
            ">ENST00000288602|V600E|pos:600|window:11|mutant\nGLATEKSRWSG\n"
        );
        assert_eq!(
            format_fasta_record(&result, 11, false),
            ">ENST00000288602_V600E_mutant\nGLATEKSRWSG\n"
        );
    }
}

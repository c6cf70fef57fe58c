/// Small helpers shared by the database loaders and the batch driver:
/// identifier normalization, ENST token extraction and the protein-sequence
/// content heuristic.
use std::collections::HashSet;
use regex::Regex;

/// The 20-letter amino acid alphabet used by the sequence content heuristic.
pub const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

/// Matches an Ensembl transcript accession with an optional version suffix,
/// e.g. `ENST00000436697` or `ENST00000436697.3`.
pub fn enst_pattern() -> Regex
{
    Regex::new(r"ENST\d+(?:\.\d+)?").unwrap()
}

/// Matches double-quoted segments, the shape UniProt exports use for
/// semicolon-separated cross-reference lists.
pub fn quoted_pattern() -> Regex
{
    Regex::new("\"([^\"]*)\"").unwrap()
}

/// ### Summary
/// Drop the version suffix from a transcript identifier, keeping the text up
/// to (but excluding) the first `.`.
#[inline]
pub fn strip_version(identifier: &str) -> &str
{
    match identifier.find('.')
    {
        Some(index) => &identifier[..index],
        None => identifier,
    }
}

/// ### Summary
/// Normalize a raw identifier cell the way the batch driver expects it:
/// trim, prepend `ENST` when the cell is purely numeric, then drop any
/// version suffix.
pub fn normalize_transcript_id(raw: &str) -> String
{
    let trimmed = raw.trim();
    let with_prefix = if !trimmed.starts_with("ENST")
        && !trimmed.is_empty()
        && trimmed.chars().all(|c| c.is_ascii_digit())
    {
        format!("ENST{}", trimmed)
    }
    else
    {
        trimmed.to_string()
    };
    strip_version(&with_prefix).to_string()
}

/// ### Summary
/// Extract every ENST token from an identifier cell, scanning quoted segments
/// first and then the whole cell, de-duplicated in first-seen order. Tokens
/// keep their version suffix here; callers strip it when registering.
/// ### Parameters
/// text: the raw cell value
/// enst: the compiled [`enst_pattern`]
/// quoted: the compiled [`quoted_pattern`]
pub fn extract_enst_ids(text: &str, enst: &Regex, quoted: &Regex) -> Vec<String>
{
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for captures in quoted.captures_iter(text)
    {
        if let Some(segment) = captures.get(1)
        {
            for token in enst.find_iter(segment.as_str())
            {
                if seen.insert(token.as_str().to_string())
                {
                    ids.push(token.as_str().to_string());
                }
            }
        }
    }
    for token in enst.find_iter(text)
    {
        if seen.insert(token.as_str().to_string())
        {
            ids.push(token.as_str().to_string());
        }
    }
    ids
}

/// ### Summary
/// Decide whether a cell value looks like a protein sequence: longer than 50
/// characters, and at least 80% of its whitespace-stripped, uppercased
/// characters drawn from the 20-letter amino acid alphabet.
pub fn looks_like_protein_sequence(text: &str) -> bool
{
    if text.len() <= 50
    {
        return false;
    }
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if stripped.is_empty()
    {
        return false;
    }
    let residues = stripped.chars().filter(|c| AMINO_ACIDS.contains(*c)).count();
    residues as f64 / stripped.chars().count() as f64 >= 0.8
}

/// Parsing of protein-level single-substitution notation, e.g. `p.V600E`
///
///
use serde::{Deserialize, Serialize};

use crate::errors::RowError;

/// ### Summary
/// One parsed amino acid substitution tied to its transcript. `notation` holds
/// the prefix-stripped body of the description (`V600E`), which is also the
/// form reported in output headers. `position_1based` is always >= 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord
{
    pub transcript_id: String,
    pub notation: String,
    pub position_1based: usize,
    pub original_aa: char,
    pub mutant_aa: char,
}

impl MutationRecord
{
    /// ### Summary
    /// Parse a single mutation description into a structured substitution.
    /// Only `p.<OriginalAA><Position><MutantAA>` is supported; any other
    /// leading token (most commonly nucleotide-level `c.` strings) is reported
    /// as [`RowError::UnsupportedNotation`], distinct from malformed input.
    /// ### Parameters
    /// transcript_id: the already-normalized transcript the substitution is on
    /// notation: the raw mutation description, e.g. `p.V600E`
    /// ### Returns
    /// The parsed record, or a per-row error describing why the description
    /// could not be used. The declared original residue is NOT checked against
    /// the reference sequence; the notation is trusted as written.
    pub fn parse(transcript_id: &str, notation: &str) -> Result<Self, RowError>
    {
        let trimmed = notation.trim();
        if !trimmed.starts_with("p.")
        {
            return Err(RowError::UnsupportedNotation { notation: trimmed.to_string() });
        }

        let body: Vec<char> = trimmed[2..].chars().collect();
        if body.len() < 3
        {
            return Err(RowError::InvalidNotation { notation: trimmed.to_string() });
        }

        let original_aa = body[0];
        let mutant_aa = body[body.len() - 1];
        // windowing operates on residue characters, so both ends must be ASCII
        if !original_aa.is_ascii() || !mutant_aa.is_ascii()
        {
            return Err(RowError::InvalidNotation { notation: trimmed.to_string() });
        }

        // maximal run of decimal digits starting at the second character
        let digits: String = body[1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let position_1based = digits
            .parse::<usize>()
            .map_err(|_| RowError::InvalidNotation { notation: trimmed.to_string() })?;
        if position_1based == 0
        {
            return Err(RowError::InvalidNotation { notation: trimmed.to_string() });
        }

        Ok(MutationRecord {
            transcript_id: transcript_id.to_string(),
            notation: trimmed[2..].to_string(),
            position_1based,
            original_aa,
            mutant_aa,
        })
    }

    /// The zero-based position of the substitution in its sequence.
    #[inline]
    pub fn position_0based(&self) -> usize
    {
        self.position_1based - 1
    }
}

#[cfg(test)]
mod test_mutation_parsing
{
    use super::*;

    #[test]
    fn canonical_substitution_is_parsed()
    {
        let record = MutationRecord::parse("ENST00000288602", "p.V600E").unwrap();
        assert_eq!(record.transcript_id, "ENST00000288602");
        assert_eq!(record.notation, "V600E");
        assert_eq!(record.position_1based, 600);
        assert_eq!(record.position_0based(), 599);
        assert_eq!(record.original_aa, 'V');
        assert_eq!(record.mutant_aa, 'E');
    }

    #[test]
    fn surrounding_whitespace_is_tolerated()
    {
        let record = MutationRecord::parse("ENST00000288602", " p.M1K ").unwrap();
        assert_eq!(record.position_1based, 1);
        assert_eq!(record.original_aa, 'M');
        assert_eq!(record.mutant_aa, 'K');
    }

    #[test]
    fn nucleotide_notation_is_reported_as_unsupported()
    {
        let error = MutationRecord::parse("ENST00000288602", "c.1799T>A").unwrap_err();
        assert_eq!(error, RowError::UnsupportedNotation { notation: "c.1799T>A".to_string() });
    }

    #[test]
    fn malformed_bodies_are_invalid()
    {
        // fewer than 3 characters after the prefix
        assert_eq!(
            MutationRecord::parse("ENST00000288602", "p.VE").unwrap_err(),
            RowError::InvalidNotation { notation: "p.VE".to_string() }
        );
        // no digit run after the first character
        assert_eq!(
            MutationRecord::parse("ENST00000288602", "p.VAL").unwrap_err(),
            RowError::InvalidNotation { notation: "p.VAL".to_string() }
        );
        // empty cell
        assert_eq!(
            MutationRecord::parse("ENST00000288602", "").unwrap_err(),
            RowError::UnsupportedNotation { notation: String::new() }
        );
    }

    #[test]
    fn position_zero_is_rejected()
    {
        assert_eq!(
            MutationRecord::parse("ENST00000288602", "p.A0G").unwrap_err(),
            RowError::InvalidNotation { notation: "p.A0G".to_string() }
        );
    }

    #[test]
    fn stop_gain_mutant_residue_is_accepted()
    {
        let record = MutationRecord::parse("ENST00000269305", "p.R196*").unwrap();
        assert_eq!(record.position_1based, 196);
        assert_eq!(record.mutant_aa, '*');
    }
}

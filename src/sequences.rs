//! Sequence extraction and epitope annotation.
//!
//! Interface residues are reported by their structure numbering. The helpers
//! here translate them onto the one-letter chain sequence so that epitope
//! positions can be marked as `[X]` for downstream sequence models.

use crate::chains::ChainExt;
use crate::interface::InterfaceResidue;
use pdbtbx::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Get sequences of all chains in a PDB structure.
///
/// # Arguments
///
/// * `pdb` - Reference to a PDB structure
///
/// # Returns
///
/// A `HashMap` mapping chain IDs to their sequences as strings.
///
/// # Example
///
/// ```no_run
/// use epicontacts::{load_model, get_sequences};
///
/// let (pdb, _errors) = load_model("path/to/structure.pdb").unwrap();
/// let sequences = get_sequences(&pdb);
/// for (chain_id, seq) in sequences {
///     println!("Chain {}: {}", chain_id, seq);
/// }
/// ```
pub fn get_sequences(pdb: &PDB) -> HashMap<String, String> {
    pdb.chains()
        .map(|chain| (chain.id().to_string(), chain.pdb_seq().join("")))
        .collect()
}

/// Map residue numbers of a chain to 1-based positions in its sequence.
///
/// Positions follow residue order in the first model, so they line up with
/// [`get_sequences`]. When several residues share a number (insertion codes),
/// the number maps to the first of them. Missing chains give an empty map.
pub fn residue_index_map(pdb: &PDB, chain_id: &str) -> HashMap<isize, usize> {
    let mut index_map = HashMap::new();
    let Some(chain) = pdb
        .models()
        .next()
        .and_then(|model| model.chains().find(|c| c.id() == chain_id))
    else {
        return index_map;
    };

    for (idx, residue) in chain.residues().enumerate() {
        index_map.entry(residue.serial_number()).or_insert(idx + 1);
    }
    index_map
}

/// Put square brackets around the epitope positions of a sequence.
///
/// `tokens` are residue tokens such as `"A:ARG 176"`. Tokens for other
/// chains, tokens carrying an insertion code and residue numbers missing from
/// `index_map` are ignored.
///
/// # Example
///
/// ```
/// use epicontacts::highlight_residues;
/// use std::collections::HashMap;
///
/// let index_map: HashMap<isize, usize> = [(10, 1), (11, 2), (12, 3)].into_iter().collect();
/// let tokens = vec!["A:TYR 10".to_string(), "A:LYS 12".to_string()];
/// assert_eq!(highlight_residues("YGK", "A", &tokens, &index_map), "[Y]G[K]");
/// ```
pub fn highlight_residues(
    sequence: &str,
    chain_id: &str,
    tokens: &[String],
    index_map: &HashMap<isize, usize>,
) -> String {
    let positions: HashSet<usize> = tokens
        .iter()
        .filter_map(|token| token_residue_number(token, chain_id))
        .filter_map(|resi| index_map.get(&resi).copied())
        .collect();
    debug!(
        "Highlighting {} of {} tokens on chain {chain_id}",
        positions.len(),
        tokens.len()
    );

    let mut highlighted = String::with_capacity(sequence.len() + 2 * positions.len());
    for (i, aa) in sequence.chars().enumerate() {
        if positions.contains(&(i + 1)) {
            highlighted.push('[');
            highlighted.push(aa);
            highlighted.push(']');
        } else {
            highlighted.push(aa);
        }
    }
    highlighted
}

/// Sorted, de-duplicated query residue tokens of an interface.
pub fn epitope_tokens(residues: &[InterfaceResidue]) -> Vec<String> {
    residues
        .iter()
        .map(InterfaceResidue::token)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Residue number of a `"CHAIN:RESN NUM"` token on the given chain.
fn token_residue_number(token: &str, chain_id: &str) -> Option<isize> {
    let (chain, residue) = token.split_once(':')?;
    if chain != chain_id {
        return None;
    }
    let number = residue.split_whitespace().nth(1)?;
    number.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::ResidueKey;
    use crate::utils::load_model;

    fn load_toy_complex() -> PDB {
        let root = env!("CARGO_MANIFEST_DIR");
        let path = format!("{}/{}", root, "test-data/toy_complex.pdb");
        let (pdb, _) = load_model(&path).unwrap();
        pdb
    }

    fn residue(chain: &str, resn: &str, resi: isize) -> InterfaceResidue {
        let key = |chain: &str, resn: &str, resi| ResidueKey {
            chain: chain.to_string(),
            resi,
            insertion: String::new(),
            resn: resn.to_string(),
        };
        InterfaceResidue {
            query: key(chain, resn, resi),
            partner: key("H", "LEU", 99),
            contact_count: 4,
            min_distance: 3.5,
            partners: Vec::new(),
        }
    }

    #[test]
    fn test_get_sequences() {
        let pdb = load_toy_complex();
        let sequences = get_sequences(&pdb);
        assert_eq!(sequences["A"], "YGKDSA");
        assert_eq!(sequences["H"], "LSD");
        assert_eq!(sequences["L"], "KT");
    }

    #[test]
    fn test_residue_index_map() {
        let pdb = load_toy_complex();
        let index_map = residue_index_map(&pdb, "A");
        assert_eq!(index_map.len(), 6);
        assert_eq!(index_map[&10], 1);
        assert_eq!(index_map[&14], 5);
        assert_eq!(index_map[&30], 6);

        // Insertion codes keep their sequence position
        let index_map = residue_index_map(&pdb, "H");
        assert_eq!(index_map[&100], 2);
        assert_eq!(index_map[&101], 3);

        assert!(residue_index_map(&pdb, "Z").is_empty());
    }

    #[test]
    fn test_highlight_residues() {
        let pdb = load_toy_complex();
        let index_map = residue_index_map(&pdb, "A");
        let tokens = vec![
            "A:TYR 10".to_string(),
            "A:LYS 12".to_string(),
            "H:GLY 11".to_string(),
            "A:ALA 999".to_string(),
            "A:SER 14B".to_string(),
        ];
        assert_eq!(
            highlight_residues("YGKDSA", "A", &tokens, &index_map),
            "[Y]G[K]DSA"
        );
        assert_eq!(highlight_residues("YGKDSA", "A", &[], &index_map), "YGKDSA");
    }

    #[test]
    fn test_epitope_tokens() {
        let residues = vec![
            residue("A", "LYS", 12),
            residue("A", "ARG", 176),
            residue("A", "LYS", 12),
        ];
        assert_eq!(epitope_tokens(&residues), vec!["A:ARG 176", "A:LYS 12"]);
    }
}

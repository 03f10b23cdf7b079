//! Run the interface analysis over many structure files.

use crate::config::InterfaceConfig;
use crate::error::InterfaceError;
use crate::interface::{get_interface_residues, InterfaceResidue};
use crate::utils::{load_model, run_with_threads};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome for one structure file of a batch.
#[derive(Debug)]
pub struct BatchEntry {
    /// Structure file as given.
    pub path: PathBuf,
    /// Interface residues, or why this file failed.
    pub result: Result<Vec<InterfaceResidue>, InterfaceError>,
}

/// Find the interface residues of every structure in `paths`.
///
/// Structures are analysed independently on a dedicated pool of
/// `num_threads` threads (0 for all cores). Entries are returned in input
/// order and a failing structure only fails its own entry.
pub fn get_interface_batch(
    paths: &[PathBuf],
    config: &InterfaceConfig,
    num_threads: usize,
) -> Vec<BatchEntry> {
    debug!(
        "Processing {} structures on {} threads",
        paths.len(),
        if num_threads == 0 {
            "all".to_string()
        } else {
            num_threads.to_string()
        }
    );

    run_with_threads(num_threads, || {
        paths
            .par_iter()
            .map(|path| BatchEntry {
                path: path.clone(),
                result: analyse_file(path, config),
            })
            .collect()
    })
}

fn analyse_file(
    path: &Path,
    config: &InterfaceConfig,
) -> Result<Vec<InterfaceResidue>, InterfaceError> {
    let (pdb, errors) = load_model(&path.to_string_lossy())?;
    for e in errors {
        warn!("{}: {e}", path.display());
    }

    let residues = get_interface_residues(&pdb, config);
    match &residues {
        Ok(residues) => debug!(
            "{}: {} interface residues",
            path.display(),
            residues.len()
        ),
        Err(e) => warn!("{}: {e}", path.display()),
    }
    residues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() {
        let root = env!("CARGO_MANIFEST_DIR");
        let good = PathBuf::from(format!("{}/{}", root, "test-data/toy_complex.pdb"));
        let missing = PathBuf::from(format!("{}/{}", root, "test-data/missing.pdb"));
        let paths = vec![good.clone(), missing.clone(), good.clone()];
        let config = InterfaceConfig::new("A", &["H", "L"]).with_min_contacts(1);

        let entries = get_interface_batch(&paths, &config, 2);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].path, good);
        assert_eq!(entries[1].path, missing);
        assert!(matches!(
            entries[1].result,
            Err(InterfaceError::StructureRead { .. })
        ));

        let first = entries[0].result.as_ref().unwrap();
        let last = entries[2].result.as_ref().unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, last, "Repeated structures should give equal results");
    }
}

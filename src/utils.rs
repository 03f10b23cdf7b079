use crate::error::InterfaceError;
use crate::residues::ResidueExt;
use pdbtbx::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Open an atomic data file with [`pdbtbx::ReadOptions`] and keep only amino acid residues.
///
/// Waters, ions and other hetero groups are removed. Parser warnings are
/// returned alongside the structure; a file that cannot be parsed at all
/// becomes [`InterfaceError::StructureRead`].
pub fn load_model(input_file: &str) -> Result<(PDB, Vec<PDBError>), InterfaceError> {
    let (mut pdb, errors) = pdbtbx::ReadOptions::default()
        .set_only_atomic_coords(true)
        .set_level(pdbtbx::StrictnessLevel::Loose)
        .read(input_file)
        .map_err(|errors| InterfaceError::StructureRead {
            path: PathBuf::from(input_file),
            details: errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        })?;

    // Remove non-protein residues from model
    pdb.remove_residues_by(|res| !matches!(res.resn(), Some(code) if code != "O"));

    Ok((pdb, errors))
}

/// Parse a chain selection of the form `QUERY/PARTNER1,PARTNER2`.
///
/// The query side holds exactly one chain; the partner side holds one or more
/// comma separated chains, none of which may be the query chain. Duplicate
/// partner chains are collapsed, keeping their first position.
pub fn parse_chain_selection(groups: &str) -> Result<(String, Vec<String>), InterfaceError> {
    let sel_vec: Vec<&str> = groups.split('/').collect();
    if sel_vec.len() != 2 {
        return Err(InterfaceError::InvalidChainSelection(format!(
            "'{groups}' is not of the form QUERY/PARTNER1,PARTNER2"
        )));
    }

    let query = sel_vec[0].trim();
    if query.is_empty() || query.contains(',') {
        return Err(InterfaceError::InvalidChainSelection(format!(
            "exactly one query chain is required, got '{query}'"
        )));
    }

    let mut partners: Vec<String> = Vec::new();
    for chain in sel_vec[1].split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if chain == query {
            return Err(InterfaceError::InvalidChainSelection(format!(
                "chain {chain} is both the query and a partner"
            )));
        }
        if !partners.iter().any(|p| p == chain) {
            partners.push(chain.to_string());
        }
    }
    if partners.is_empty() {
        return Err(InterfaceError::InvalidChainSelection(
            "at least one partner chain is required".to_string(),
        ));
    }

    Ok((query.to_string(), partners))
}

/// Run `f` on a dedicated rayon pool with `num_threads` threads (0 for all cores).
pub fn run_with_threads<F, R>(num_threads: usize, f: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
    {
        Ok(pool) => pool.install(f),
        Err(e) => {
            warn!("Failed to build a thread pool ({e}); falling back to the global pool");
            f()
        }
    }
}

/// Write a DataFrame to a file, replacing the extension to match `file_type`.
///
/// Returns the path that was written.
pub fn write_df_to_file(
    df: &mut DataFrame,
    file_path: &Path,
    file_type: DataFrameFileType,
) -> Result<PathBuf, InterfaceError> {
    let output_path = file_path.with_extension(file_type.to_string());
    let mut file = std::fs::File::create(&output_path)?;
    match file_type {
        DataFrameFileType::Csv => {
            CsvWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Json => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(df)?;
        }
        DataFrameFileType::NDJson => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::JsonLines)
                .finish(df)?;
        }
    }
    Ok(output_path)
}

/// File format for writing DataFrames.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum DataFrameFileType {
    /// Comma-separated values
    Csv,
    /// Parquet columnar storage
    Parquet,
    /// Standard JSON
    Json,
    /// Newline-delimited JSON
    NDJson,
}

impl std::fmt::Display for DataFrameFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DataFrameFileType::Csv => write!(f, "csv"),
            DataFrameFileType::Parquet => write!(f, "parquet"),
            DataFrameFileType::Json => write!(f, "json"),
            DataFrameFileType::NDJson => write!(f, "ndjson"),
        }
    }
}

impl std::str::FromStr for DataFrameFileType {
    type Err = InterfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(DataFrameFileType::Csv),
            "parquet" => Ok(DataFrameFileType::Parquet),
            "json" => Ok(DataFrameFileType::Json),
            "ndjson" | "jsonl" => Ok(DataFrameFileType::NDJson),
            other => Err(InterfaceError::InvalidConfig(format!(
                "unknown output format '{other}'"
            ))),
        }
    }
}

/// Narrow a residue number for DataFrame columns.
pub(crate) fn checked_i32(value: isize) -> PolarsResult<i32> {
    i32::try_from(value).map_err(|_| {
        PolarsError::ComputeError(format!("residue number {value} exceeds i32 limits").into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn good_chain_selections() {
        assert_eq!(
            parse_chain_selection("A/H,L").unwrap(),
            ("A".to_string(), vec!["H".to_string(), "L".to_string()])
        );
        assert_eq!(
            parse_chain_selection(" A / H, L ,H").unwrap(),
            ("A".to_string(), vec!["H".to_string(), "L".to_string()])
        );
        assert_eq!(
            parse_chain_selection("C/B").unwrap(),
            ("C".to_string(), vec!["B".to_string()])
        );
    }

    #[test]
    fn bad_chain_selections() {
        for groups in ["", "A", "A/", "/H,L", "A,B/H", "A/H/L", "A/A,H"] {
            assert!(
                matches!(
                    parse_chain_selection(groups),
                    Err(InterfaceError::InvalidChainSelection(_))
                ),
                "'{groups}' should be rejected"
            );
        }
    }

    #[test]
    fn file_type_round_trip() {
        for file_type in [
            DataFrameFileType::Csv,
            DataFrameFileType::Parquet,
            DataFrameFileType::Json,
            DataFrameFileType::NDJson,
        ] {
            assert_eq!(
                file_type.to_string().parse::<DataFrameFileType>().unwrap(),
                file_type
            );
        }
        assert!("xlsx".parse::<DataFrameFileType>().is_err());
    }

    #[test]
    fn test_write_csv() {
        let mut df = df!(
            "query_chain" => ["A", "A"],
            "query_resi" => [12i32, 13],
        )
        .unwrap();
        let dir = std::env::temp_dir().join("epicontacts-write-test");
        std::fs::create_dir_all(&dir).unwrap();
        let written = write_df_to_file(&mut df, &dir.join("residues"), DataFrameFileType::Csv)
            .unwrap();
        assert_eq!(written.extension().unwrap(), "csv");
        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.starts_with("query_chain,query_resi"));
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_load_model_drops_waters() {
        let root = env!("CARGO_MANIFEST_DIR");
        let path = format!("{}/{}", root, "test-data/toy_complex.pdb");
        let (pdb, _) = load_model(&path).unwrap();
        assert!(pdb
            .residues()
            .all(|r| r.name().is_some_and(|name| name != "HOH")));
        assert_eq!(pdb.chain_count(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_model("does/not/exist.pdb"),
            Err(InterfaceError::StructureRead { .. })
        ));
    }

    #[test]
    fn test_run_with_threads() {
        let threads = run_with_threads(2, rayon::current_num_threads);
        assert_eq!(threads, 2);
    }
}

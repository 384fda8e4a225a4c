/// Startup loading of the catalog and similarity matrix
///
/// Supported files, all relative to the data directory:
///   - `movie_dict.json`: the catalog, either column-oriented
///     (`{"movie_id": {"0": 19995, ...}, "title": {"0": "Avatar", ...}}` or
///     `{"movie_id": [...], "title": [...]}`) or a records array
///     (`[{"movie_id": 19995, "title": "Avatar"}, ...]`). Extra columns are ignored.
///   - `similarity.bin`: bincode serialized `Vec<Vec<f32>>` (preferred)
///   - `similarity.json`: array of rows; a row may be nested and is flattened
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{DataFormat, LoadError};
use crate::models::MovieId;

use super::{Catalog, SimilarityMatrix};

pub const CATALOG_FILE: &str = "movie_dict.json";
pub const MATRIX_BINCODE_FILE: &str = "similarity.bin";
pub const MATRIX_JSON_FILE: &str = "similarity.json";

/// Validated catalog and matrix pair
#[derive(Debug)]
pub struct Dataset {
    pub catalog: Catalog,
    pub matrix: SimilarityMatrix,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Records(Vec<CatalogRow>),
    Columns(CatalogColumns),
}

#[derive(Deserialize)]
struct CatalogRow {
    movie_id: MovieId,
    title: String,
}

#[derive(Deserialize)]
struct CatalogColumns {
    movie_id: Column<MovieId>,
    title: Column<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Column<T> {
    List(Vec<T>),
    Indexed(HashMap<String, T>),
}

impl<T> Column<T> {
    /// Pairs every value with its row key, sorted by key
    ///
    /// Index-keyed columns may have gaps (rows dropped before the dump); only
    /// the relative order of the keys matters. List columns are keyed by position.
    fn into_keyed(self, name: &str) -> Result<Vec<(u64, T)>, String> {
        match self {
            Column::List(values) => Ok((0u64..).zip(values).collect()),
            Column::Indexed(map) => {
                let mut keyed = map
                    .into_iter()
                    .map(|(key, value)| {
                        key.trim()
                            .parse::<u64>()
                            .map(|index| (index, value))
                            .map_err(|_| format!("column `{}` has non-integer row key {:?}", name, key))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                keyed.sort_by_key(|(index, _)| *index);

                if let Some(pair) = keyed.windows(2).find(|pair| pair[0].0 == pair[1].0) {
                    return Err(format!("column `{}` has duplicate row key {}", name, pair[0].0));
                }

                Ok(keyed)
            }
        }
    }
}

/// Loads and cross-validates the catalog and matrix found in `data_dir`
pub fn load_dataset(data_dir: &Path) -> Result<Dataset, LoadError> {
    let catalog = load_catalog(&data_dir.join(CATALOG_FILE))?;
    let matrix = load_matrix(data_dir)?;

    if matrix.size() != catalog.len() {
        return Err(LoadError::DimensionMismatch {
            catalog: catalog.len(),
            matrix: matrix.size(),
        });
    }

    info!(
        movies = catalog.len(),
        data_dir = %data_dir.display(),
        "Loaded catalog and similarity matrix"
    );

    Ok(Dataset { catalog, matrix })
}

/// Loads the catalog table
pub fn load_catalog(path: &Path) -> Result<Catalog, LoadError> {
    if !path.exists() {
        return Err(LoadError::CatalogMissing(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: CatalogFile =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| parse_error(path, DataFormat::Json, e))?;

    let rows = match parsed {
        CatalogFile::Records(rows) => rows.into_iter().map(|r| (r.movie_id, r.title)).collect(),
        CatalogFile::Columns(columns) => {
            let ids = columns
                .movie_id
                .into_keyed("movie_id")
                .map_err(|e| parse_error(path, DataFormat::Json, e))?;
            let titles = columns
                .title
                .into_keyed("title")
                .map_err(|e| parse_error(path, DataFormat::Json, e))?;

            if ids.len() != titles.len() {
                return Err(parse_error(
                    path,
                    DataFormat::Json,
                    format!(
                        "column lengths differ: {} movie ids, {} titles",
                        ids.len(),
                        titles.len()
                    ),
                ));
            }

            // catalog index is the position after sorting, matching the matrix rows
            ids.into_iter()
                .zip(titles)
                .map(|((id_key, movie_id), (title_key, title))| {
                    if id_key == title_key {
                        Ok((movie_id, title))
                    } else {
                        Err(parse_error(
                            path,
                            DataFormat::Json,
                            format!(
                                "row keys differ between columns: movie_id has {}, title has {}",
                                id_key, title_key
                            ),
                        ))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let catalog = Catalog::new(rows);
    info!(movies = catalog.len(), path = %path.display(), "Loaded catalog");
    Ok(catalog)
}

/// Loads the similarity matrix, preferring the bincode file over the JSON one
///
/// A bincode file that exists but fails to decode is logged and skipped in
/// favour of the JSON file. When neither loads, the last decode error wins
/// over "missing" so corrupt data is never reported as absent data.
pub fn load_matrix(data_dir: &Path) -> Result<SimilarityMatrix, LoadError> {
    let bincode_path = data_dir.join(MATRIX_BINCODE_FILE);
    let json_path = data_dir.join(MATRIX_JSON_FILE);

    let mut last_error = None;

    if bincode_path.exists() {
        match load_matrix_bincode(&bincode_path) {
            Ok(matrix) => {
                info!(size = matrix.size(), path = %bincode_path.display(), "Loaded similarity matrix");
                return Ok(matrix);
            }
            Err(e) => {
                warn!(error = %e, "Failed to load bincode similarity matrix");
                last_error = Some(e);
            }
        }
    }

    if json_path.exists() {
        let matrix = load_matrix_json(&json_path)?;
        info!(size = matrix.size(), path = %json_path.display(), "Loaded similarity matrix");
        return Ok(matrix);
    }

    Err(last_error.unwrap_or_else(|| LoadError::MatrixMissing {
        dir: data_dir.to_path_buf(),
        candidates: vec![MATRIX_BINCODE_FILE.to_string(), MATRIX_JSON_FILE.to_string()],
    }))
}

fn load_matrix_bincode(path: &Path) -> Result<SimilarityMatrix, LoadError> {
    let data = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rows: Vec<Vec<f32>> =
        bincode::deserialize(&data).map_err(|e| parse_error(path, DataFormat::Bincode, e))?;

    SimilarityMatrix::from_rows(rows)
}

fn load_matrix_json(path: &Path) -> Result<SimilarityMatrix, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| parse_error(path, DataFormat::Json, e))?;

    let raw_rows = parsed.as_array().ok_or_else(|| {
        parse_error(path, DataFormat::Json, "expected a top-level array of rows")
    })?;

    let mut rows = Vec::with_capacity(raw_rows.len());
    for (i, raw) in raw_rows.iter().enumerate() {
        let mut row = Vec::with_capacity(raw_rows.len());
        flatten_row(raw, &mut row)
            .map_err(|e| parse_error(path, DataFormat::Json, format!("row {}: {}", i, e)))?;
        rows.push(row);
    }

    SimilarityMatrix::from_rows(rows)
}

/// Appends every number in `value` to `out`, descending into nested arrays
fn flatten_row(value: &Value, out: &mut Vec<f32>) -> Result<(), String> {
    match value {
        Value::Number(n) => {
            let score = n
                .as_f64()
                .ok_or_else(|| format!("score {} is not representable as a float", n))?;
            out.push(score as f32);
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(|item| flatten_row(item, out)),
        other => Err(format!("expected a number, found {}", other)),
    }
}

fn parse_error(path: &Path, format: DataFormat, reason: impl ToString) -> LoadError {
    LoadError::Parse {
        path: PathBuf::from(path),
        format,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_json(dir: &TempDir, name: &str, value: &Value) {
        std::fs::write(dir.path().join(name), serde_json::to_vec(value).unwrap()).unwrap();
    }

    fn write_bincode(dir: &TempDir, rows: &[Vec<f32>]) {
        std::fs::write(
            dir.path().join(MATRIX_BINCODE_FILE),
            bincode::serialize(rows).unwrap(),
        )
        .unwrap();
    }

    fn column_catalog() -> Value {
        json!({
            "movie_id": {"0": 1, "1": 2, "2": 3},
            "title": {"0": "Alpha", "1": "Beta", "2": "Gamma"},
            "tags": {"0": "a", "1": "b", "2": "c"}
        })
    }

    fn sample_rows() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.8, 0.3],
            vec![0.8, 1.0, 0.5],
            vec![0.3, 0.5, 1.0],
        ]
    }

    #[test]
    fn test_load_column_catalog_orders_by_index() {
        let dir = TempDir::new().unwrap();
        write_json(
            &dir,
            CATALOG_FILE,
            &json!({
                "movie_id": {"10": 11, "2": 3, "0": 1, "1": 2, "3": 4, "4": 5, "5": 6, "6": 7, "7": 8, "8": 9, "9": 10},
                "title": {"10": "K", "2": "C", "0": "A", "1": "B", "3": "D", "4": "E", "5": "F", "6": "G", "7": "H", "8": "I", "9": "J"}
            }),
        );

        let catalog = load_catalog(&dir.path().join(CATALOG_FILE)).unwrap();
        let titles: Vec<&str> = catalog.titles().collect();
        assert_eq!(titles, vec!["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K"]);
        assert_eq!(catalog.get(10).unwrap().movie_id, MovieId::Numeric(11));
    }

    #[test]
    fn test_load_list_and_record_catalogs() {
        let dir = TempDir::new().unwrap();
        write_json(
            &dir,
            CATALOG_FILE,
            &json!({"movie_id": [1, "2", 3.0], "title": ["Alpha", "Beta", "Gamma"]}),
        );
        let catalog = load_catalog(&dir.path().join(CATALOG_FILE)).unwrap();
        assert_eq!(catalog.get(1).unwrap().movie_id, MovieId::Numeric(2));
        assert_eq!(catalog.get(2).unwrap().movie_id, MovieId::Numeric(3));

        write_json(
            &dir,
            CATALOG_FILE,
            &json!([{"movie_id": 1, "title": "Alpha"}, {"movie_id": "x-1", "title": "Beta"}]),
        );
        let catalog = load_catalog(&dir.path().join(CATALOG_FILE)).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).unwrap().movie_id, MovieId::Raw(json!("x-1")));
    }

    #[test]
    fn test_catalog_with_gaps_in_index_is_compacted() {
        let dir = TempDir::new().unwrap();
        write_json(
            &dir,
            CATALOG_FILE,
            &json!({
                "movie_id": {"3": 4, "0": 1, "1": 2},
                "title": {"0": "Alpha", "3": "Delta", "1": "Beta"}
            }),
        );
        write_bincode(&dir, &sample_rows());

        let dataset = load_dataset(dir.path()).unwrap();
        let titles: Vec<&str> = dataset.catalog.titles().collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Delta"]);

        let delta = dataset.catalog.find_by_title("Delta").unwrap();
        assert_eq!(delta.catalog_index, 2);
        assert_eq!(delta.movie_id, MovieId::Numeric(4));
    }

    #[test]
    fn test_catalog_columns_with_different_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        write_json(
            &dir,
            CATALOG_FILE,
            &json!({"movie_id": {"0": 1, "2": 3}, "title": {"0": "Alpha", "1": "Beta"}}),
        );
        let err = load_catalog(&dir.path().join(CATALOG_FILE)).unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: DataFormat::Json, .. }));
    }

    #[test]
    fn test_catalog_with_duplicate_row_keys_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_json(
            &dir,
            CATALOG_FILE,
            &json!({"movie_id": {"1": 1, "01": 2}, "title": {"1": "Alpha", "01": "Beta"}}),
        );
        let err = load_catalog(&dir.path().join(CATALOG_FILE)).unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: DataFormat::Json, .. }));
    }

    #[test]
    fn test_missing_catalog_is_distinct_from_corrupt_catalog() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CATALOG_FILE);

        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, LoadError::CatalogMissing(_)));

        std::fs::write(&path, b"\x80\x04\x95 not json").unwrap();
        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: DataFormat::Json, .. }));
    }

    #[test]
    fn test_load_dataset_prefers_bincode() {
        let dir = TempDir::new().unwrap();
        write_json(&dir, CATALOG_FILE, &column_catalog());
        write_bincode(&dir, &sample_rows());
        write_json(&dir, MATRIX_JSON_FILE, &json!([[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]));

        let dataset = load_dataset(dir.path()).unwrap();
        assert_eq!(dataset.catalog.len(), 3);
        assert_eq!(dataset.matrix.row(0).unwrap()[1], 0.8);
    }

    #[test]
    fn test_corrupt_bincode_falls_back_to_json() {
        let dir = TempDir::new().unwrap();
        write_json(&dir, CATALOG_FILE, &column_catalog());
        std::fs::write(dir.path().join(MATRIX_BINCODE_FILE), b"\x01\x02").unwrap();
        write_json(&dir, MATRIX_JSON_FILE, &json!(sample_rows()));

        let dataset = load_dataset(dir.path()).unwrap();
        assert_eq!(dataset.matrix.row(2).unwrap()[1], 0.5);
    }

    #[test]
    fn test_corrupt_bincode_without_fallback_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MATRIX_BINCODE_FILE), b"\x01\x02").unwrap();

        let err = load_matrix(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: DataFormat::Bincode, .. }));
    }

    #[test]
    fn test_missing_matrix() {
        let dir = TempDir::new().unwrap();
        let err = load_matrix(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::MatrixMissing { .. }));
    }

    #[test]
    fn test_json_rows_are_flattened() {
        let dir = TempDir::new().unwrap();
        write_json(
            &dir,
            MATRIX_JSON_FILE,
            &json!([[[1.0, 0.25]], [[0.25], [1.0]]]),
        );

        let matrix = load_matrix(dir.path()).unwrap();
        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.row(0).unwrap(), &[1.0, 0.25]);
        assert_eq!(matrix.row(1).unwrap(), &[0.25, 1.0]);
    }

    #[test]
    fn test_non_numeric_json_matrix() {
        let dir = TempDir::new().unwrap();
        write_json(&dir, MATRIX_JSON_FILE, &json!([[1.0, "high"], [0.1, 1.0]]));

        let err = load_matrix(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { format: DataFormat::Json, .. }));
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_json(&dir, CATALOG_FILE, &column_catalog());
        write_bincode(&dir, &[vec![1.0, 0.5], vec![0.5, 1.0]]);

        let err = load_dataset(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DimensionMismatch {
                catalog: 3,
                matrix: 2
            }
        ));
    }
}

use crate::error::LoadError;

/// Dense, square similarity matrix stored row-major
///
/// Row and column `i` both refer to catalog index `i`. Symmetry is expected
/// but not checked.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Builds a matrix from already-flattened rows, rejecting anything non-square
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, LoadError> {
        let size = rows.len();
        let mut scores = Vec::with_capacity(size * size);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(LoadError::Shape(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            scores.extend(row);
        }

        Ok(Self { size, scores })
    }

    /// Number of rows (equal to the number of columns)
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.size {
            return None;
        }
        let start = index * self.size;
        Some(&self.scores[start..start + self.size])
    }
}

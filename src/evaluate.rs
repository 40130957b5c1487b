use serde::Serialize;

use crate::error::{KMeansError, Result};
use crate::point::Point;

/// Cluster-by-class counts. `counts[r][c]` is the number of labeled points
/// in cluster `r` whose class is `c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    pub counts: Vec<Vec<usize>>,
    /// Points left out of the table because their class is unknown
    pub unlabeled: usize,
}

impl ContingencyTable {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            counts: vec![vec![0; cols]; rows],
            unlabeled: 0,
        }
    }

    pub fn from_counts(counts: Vec<Vec<usize>>) -> Result<Self> {
        if let Some(first) = counts.first() {
            if counts.iter().any(|row| row.len() != first.len()) {
                return Err(KMeansError::RaggedTable);
            }
        }
        Ok(Self {
            counts,
            unlabeled: 0,
        })
    }

    pub fn rows(&self) -> usize {
        self.counts.len()
    }

    pub fn cols(&self) -> usize {
        self.counts.first().map_or(0, Vec::len)
    }

    pub fn get(&self, row: usize, col: usize) -> usize {
        self.counts[row][col]
    }

    pub fn row_sums(&self) -> Vec<usize> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn col_sums(&self) -> Vec<usize> {
        let mut sums = vec![0; self.cols()];
        for row in &self.counts {
            for (sum, &count) in sums.iter_mut().zip(row) {
                *sum += count;
            }
        }
        sums
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// Cross-tabulate cluster assignments against ground-truth classes.
///
/// Unlabeled points are skipped and counted in `unlabeled`. A labeled point
/// without a cluster, or any id outside its range, is an error.
pub fn build_contingency_table(
    points: &[Point],
    assignments: &[Option<usize>],
    k: usize,
    num_classes: usize,
) -> Result<ContingencyTable> {
    if points.len() != assignments.len() {
        return Err(KMeansError::PointCountMismatch {
            expected: assignments.len(),
            found: points.len(),
        });
    }

    let mut table = ContingencyTable::zeros(k, num_classes);
    for (idx, (point, assignment)) in points.iter().zip(assignments).enumerate() {
        let Some(label) = point.classifier else {
            table.unlabeled += 1;
            continue;
        };
        let cluster = assignment.ok_or(KMeansError::Unassigned(idx))?;
        if cluster >= k {
            return Err(KMeansError::ClusterOutOfRange { cluster, k });
        }
        if label >= num_classes {
            return Err(KMeansError::LabelOutOfRange { label, num_classes });
        }
        table.counts[cluster][label] += 1;
    }

    if table.unlabeled > 0 {
        debug!("{} unlabeled points left out of the table", table.unlabeled);
    }
    Ok(table)
}

fn entropy(sums: &[usize], total: f64) -> f64 {
    sums.iter()
        .filter(|&&s| s > 0)
        .map(|&s| {
            let p = s as f64 / total;
            -p * p.ln()
        })
        .sum()
}

/// Normalized mutual information, `2 * I / (H_row + H_col)`.
pub fn nmi(table: &ContingencyTable) -> Result<f64> {
    let row_sums = table.row_sums();
    let col_sums = table.col_sums();
    let total = col_sums.iter().sum::<usize>();
    if total == 0 {
        return Err(KMeansError::DegenerateDistribution);
    }
    let n = total as f64;

    let h_row = entropy(&row_sums, n);
    let h_col = entropy(&col_sums, n);
    // A single occupied cluster or a single class carries no information
    if h_row == 0.0 || h_col == 0.0 {
        return Err(KMeansError::DegenerateDistribution);
    }

    let mut mutual = 0.0;
    for (r, row) in table.counts.iter().enumerate() {
        for (c, &count) in row.iter().enumerate() {
            // empty cells contribute nothing
            if count == 0 {
                continue;
            }
            let p_cell = count as f64 / n;
            let p_row = row_sums[r] as f64 / n;
            let p_col = col_sums[c] as f64 / n;
            mutual += p_cell * (p_cell / (p_row * p_col)).ln();
        }
    }

    Ok(2.0 * mutual / (h_row + h_col))
}

use crate::error::{KMeansError, Result};

/// A feature vector with its ground-truth class, if known.
///
/// Points are never mutated once loaded. Cluster ids are kept by the engine in
/// a separate array indexed like the point slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub data: Vec<f64>,
    pub classifier: Option<usize>,
}

impl Point {
    pub fn new(data: Vec<f64>) -> Self {
        Self {
            data,
            classifier: None,
        }
    }

    pub fn labeled(data: Vec<f64>, classifier: usize) -> Self {
        Self {
            data,
            classifier: Some(classifier),
        }
    }

    pub fn dim(&self) -> usize {
        self.data.len()
    }
}

fn check_dims(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(KMeansError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(())
}

pub fn squared_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_dims(a, b)?;
    Ok(a.iter().zip(b).map(|(&x, &y)| (x - y).powi(2)).sum())
}

/// Euclidean distance between two vectors of equal length
pub fn distance(a: &[f64], b: &[f64]) -> Result<f64> {
    Ok(squared_distance(a, b)?.sqrt())
}

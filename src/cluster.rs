use crate::error::{KMeansError, Result};
use crate::point::{squared_distance, Point};

pub type Centroid = Vec<f64>;

/// A center plus the indices of the points currently assigned to it.
///
/// `members` is a cache of the engine's assignment array and is rebuilt on
/// every assignment pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub centroid: Centroid,
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn new(centroid: Centroid) -> Self {
        Self {
            centroid,
            members: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Mean of the member points, per dimension.
    pub fn recompute_center(&self, points: &[Point]) -> Result<Centroid> {
        let Some(&first) = self.members.first() else {
            return Err(KMeansError::EmptyCluster);
        };
        let dim = points[first].dim();
        let mut new_centroid = vec![0.0; dim];

        for &idx in &self.members {
            let point = &points[idx];
            if point.dim() != dim {
                return Err(KMeansError::DimensionMismatch {
                    expected: dim,
                    found: point.dim(),
                });
            }
            for (i, &coord) in point.data.iter().enumerate() {
                new_centroid[i] += coord;
            }
        }

        for coord in &mut new_centroid {
            *coord /= self.members.len() as f64;
        }

        Ok(new_centroid)
    }

    pub fn update_centroid(&mut self, points: &[Point]) -> Result<()> {
        self.centroid = self.recompute_center(points)?;
        Ok(())
    }

    /// Within-cluster sum of squared distances to the centroid
    pub fn scatter(&self, points: &[Point]) -> Result<f64> {
        self.members.iter().try_fold(0.0, |acc, &idx| {
            Ok(acc + squared_distance(&points[idx].data, &self.centroid)?)
        })
    }
}

use serde::Serialize;
use std::io::Write;

use crate::config::KMeansConfig;
use crate::dataset::Dataset;
use crate::error::{KMeansError, Result};
use crate::kmeans::KMeans;

#[derive(Debug, Serialize)]
pub struct ClusterSummary {
    pub size: usize,
    pub center: Vec<f64>,
    pub scatter: f64,
}

/// Outcome of one clustering run, written as a single JSON line
#[derive(Debug, Serialize)]
pub struct Report {
    pub k: usize,
    pub n_points: usize,
    pub n_classes: usize,
    pub iterations: usize,
    pub restarts: usize,
    pub scatter: f64,
    /// None when the partition or labeling is degenerate
    pub nmi: Option<f64>,
    pub clusters: Vec<ClusterSummary>,
    pub config: KMeansConfig,
}

impl Report {
    pub fn new<R: rand::Rng>(engine: &KMeans<R>, dataset: &Dataset) -> Result<Self> {
        let points = &dataset.points;
        let mut clusters = Vec::with_capacity(engine.k());
        let mut scatter = 0.0;
        for cluster in engine.clusters() {
            let c_scatter = cluster.scatter(points)?;
            scatter += c_scatter;
            clusters.push(ClusterSummary {
                size: cluster.len(),
                center: cluster.centroid.clone(),
                scatter: c_scatter,
            });
        }

        let nmi = match engine.nmi(points) {
            Ok(v) => Some(v),
            Err(KMeansError::DegenerateDistribution) => {
                warn!("NMI is undefined for a single cluster or a single class");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Report {
            k: engine.k(),
            n_points: points.len(),
            n_classes: dataset.num_classes(),
            iterations: engine.iterations(),
            restarts: engine.restarts(),
            scatter,
            nmi,
            clusters,
            config: engine.config().clone(),
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        serde_json::to_writer(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

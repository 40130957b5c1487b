//! Lloyd's k-means clustering with cluster scatter and normalized mutual
//! information (NMI) against ground-truth labels.

#[macro_use]
extern crate log;

pub mod cluster;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod kmeans;
pub mod point;
pub mod report;

pub use crate::cluster::Cluster;
pub use crate::config::KMeansConfig;
pub use crate::dataset::Dataset;
pub use crate::error::{KMeansError, Result};
pub use crate::evaluate::{build_contingency_table, nmi, ContingencyTable};
pub use crate::kmeans::{KMeans, State};
pub use crate::point::{distance, squared_distance, Point};
pub use crate::report::Report;

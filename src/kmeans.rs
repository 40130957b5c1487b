use crossbeam_channel::{unbounded, Receiver, Sender};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use std::thread;

use crate::cluster::Cluster;
use crate::config::KMeansConfig;
use crate::error::{KMeansError, Result};
use crate::evaluate::{self, ContingencyTable};
use crate::point::{distance, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Initialized,
    Assigned,
    Converged,
}

/// Lloyd's k-means over a borrowed point slice.
///
/// The engine never mutates the points. Cluster ids live in `assignments`,
/// indexed like the slice passed to `initialize`, so several engines can run
/// over the same data at once.
pub struct KMeans<R = StdRng> {
    k: usize,
    num_classes: usize,
    config: KMeansConfig,
    clusters: Vec<Cluster>,
    assignments: Vec<Option<usize>>,
    convergent: bool,
    state: State,
    iterations: usize,
    restarts: usize,
    rng: R,
}

impl KMeans<StdRng> {
    pub fn new(k: usize, num_classes: usize, config: KMeansConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(k, num_classes, config, rng)
    }
}

impl<R: Rng> KMeans<R> {
    pub fn with_rng(k: usize, num_classes: usize, config: KMeansConfig, rng: R) -> Self {
        Self {
            k,
            num_classes,
            config,
            clusters: Vec::new(),
            assignments: Vec::new(),
            convergent: false,
            state: State::Uninitialized,
            iterations: 0,
            restarts: 0,
            rng,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn assignments(&self) -> &[Option<usize>] {
        &self.assignments
    }

    pub fn is_convergent(&self) -> bool {
        self.convergent
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Update passes since the last `initialize`
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Reinitializations caused by empty clusters since the last `initialize`
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.clusters.iter().map(Cluster::len).collect()
    }

    /// Start a fresh run: k randomly chosen points become the centers.
    pub fn initialize(&mut self, points: &[Point]) -> Result<()> {
        self.iterations = 0;
        self.restarts = 0;
        self.choose_centroids(points)
    }

    /// Cluster ids are indexed like the slice given to `initialize`
    fn check_point_count(&self, points: &[Point]) -> Result<()> {
        if points.len() != self.assignments.len() {
            return Err(KMeansError::PointCountMismatch {
                expected: self.assignments.len(),
                found: points.len(),
            });
        }
        Ok(())
    }

    fn choose_centroids(&mut self, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Err(KMeansError::EmptyInput);
        }
        if self.k == 0 || self.k > points.len() {
            return Err(KMeansError::InvalidClusterCount {
                k: self.k,
                n: points.len(),
            });
        }
        let dim = points[0].dim();
        if let Some(bad) = points.iter().find(|p| p.dim() != dim) {
            return Err(KMeansError::DimensionMismatch {
                expected: dim,
                found: bad.dim(),
            });
        }

        let mut order: Vec<usize> = (0..points.len()).collect();
        order.shuffle(&mut self.rng);
        debug!("initial centers at points {:?}", &order[..self.k]);

        self.clusters = order[..self.k]
            .iter()
            .map(|&idx| Cluster::new(points[idx].data.clone()))
            .collect();
        self.assignments = vec![None; points.len()];
        self.convergent = false;
        self.state = State::Initialized;
        Ok(())
    }

    /// Move every point to its nearest center and rebuild the member lists.
    ///
    /// Returns how many points changed cluster. The run is convergent exactly
    /// when this pass moved nothing.
    pub fn assign(&mut self, points: &[Point]) -> Result<usize> {
        if self.state == State::Uninitialized {
            return Err(KMeansError::NotInitialized);
        }
        self.check_point_count(points)?;

        let nearest = nearest_clusters(points, &self.clusters, self.config.threads)?;

        for cluster in &mut self.clusters {
            cluster.clear();
        }
        let mut moved = 0;
        for (idx, &cluster) in nearest.iter().enumerate() {
            if self.assignments[idx] != Some(cluster) {
                moved += 1;
            }
            self.assignments[idx] = Some(cluster);
            self.clusters[cluster].members.push(idx);
        }

        self.convergent = moved == 0;
        self.state = if self.convergent {
            State::Converged
        } else {
            State::Assigned
        };
        Ok(moved)
    }

    /// One Lloyd step: recenter every cluster on its members, then reassign.
    ///
    /// An empty cluster means the initial centers were unlucky. The run is
    /// reinitialized and reassigned until all k clusters have members, at most
    /// `max_restarts` times.
    pub fn update(&mut self, points: &[Point]) -> Result<()> {
        match self.state {
            State::Uninitialized => return Err(KMeansError::NotInitialized),
            State::Initialized => {
                self.assign(points)?;
            }
            State::Assigned | State::Converged => {}
        }
        self.check_point_count(points)?;

        let mut attempts = 0;
        while let Some(empty) = self.clusters.iter().position(Cluster::is_empty) {
            if attempts == self.config.max_restarts {
                return Err(KMeansError::UnsatisfiableClusterCount {
                    k: self.k,
                    attempts,
                });
            }
            attempts += 1;
            self.restarts += 1;
            warn!(
                "cluster {} is empty, reinitializing ({}/{})",
                empty, attempts, self.config.max_restarts
            );
            self.choose_centroids(points)?;
            self.assign(points)?;
        }

        for cluster in &mut self.clusters {
            cluster.update_centroid(points)?;
            cluster.clear();
        }

        let moved = self.assign(points)?;
        self.iterations += 1;
        debug!("iteration {}: {} points moved", self.iterations, moved);
        Ok(())
    }

    /// Update until an assignment pass moves nothing.
    ///
    /// Returns the number of update passes this call made.
    pub fn run_to_convergence(&mut self, points: &[Point]) -> Result<usize> {
        match self.state {
            State::Uninitialized => return Err(KMeansError::NotInitialized),
            State::Initialized => {
                self.assign(points)?;
            }
            State::Assigned | State::Converged => {}
        }

        let mut passes = 0;
        while !self.convergent {
            if passes == self.config.max_iterations {
                return Err(KMeansError::ConvergenceTimeout(passes));
            }
            self.update(points)?;
            passes += 1;
        }
        info!(
            "converged after {} iterations ({} restarts), cluster sizes {:?}",
            self.iterations,
            self.restarts,
            self.cluster_sizes()
        );
        Ok(passes)
    }

    pub fn fit(&mut self, points: &[Point]) -> Result<usize> {
        self.initialize(points)?;
        self.assign(points)?;
        self.run_to_convergence(points)
    }

    /// Total within-cluster sum of squared distances
    pub fn cluster_scatter(&self, points: &[Point]) -> Result<f64> {
        if self.state == State::Uninitialized {
            return Err(KMeansError::NotInitialized);
        }
        self.check_point_count(points)?;
        self.clusters
            .iter()
            .try_fold(0.0, |acc, cluster| Ok(acc + cluster.scatter(points)?))
    }

    pub fn contingency_table(&self, points: &[Point]) -> Result<ContingencyTable> {
        if self.state == State::Uninitialized {
            return Err(KMeansError::NotInitialized);
        }
        evaluate::build_contingency_table(points, &self.assignments, self.k, self.num_classes)
    }

    pub fn nmi(&self, points: &[Point]) -> Result<f64> {
        evaluate::nmi(&self.contingency_table(points)?)
    }
}

/// Index of the closest centroid. Ties go to the lowest index.
pub fn nearest_cluster(point: &[f64], clusters: &[Cluster]) -> Result<usize> {
    let mut distances = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        distances.push(distance(point, &cluster.centroid)?);
    }
    distances
        .into_iter()
        .enumerate()
        .min_by_key(|&(_, d)| OrderedFloat(d))
        .map(|(idx, _)| idx)
        .ok_or(KMeansError::NotInitialized)
}

fn nearest_clusters(points: &[Point], clusters: &[Cluster], threads: usize) -> Result<Vec<usize>> {
    if threads <= 1 || points.len() / 2 < threads {
        return points
            .iter()
            .map(|p| nearest_cluster(&p.data, clusters))
            .collect();
    }

    let chunk = points.len().div_ceil(threads);
    let workers = threads.min(points.len().div_ceil(chunk));
    let (sender, receiver): (Sender<Range<usize>>, Receiver<Range<usize>>) = unbounded();
    let (result_sender, result_receiver): (
        Sender<(usize, Result<Vec<usize>>)>,
        Receiver<(usize, Result<Vec<usize>>)>,
    ) = unbounded();

    let jobs = thread::scope(|s| -> Result<usize> {
        for _ in 0..workers {
            let receiver = receiver.clone();
            let result_sender = result_sender.clone();
            s.spawn(move || {
                for range in receiver {
                    let start = range.start;
                    let nearest: Result<Vec<usize>> = points[range]
                        .iter()
                        .map(|p| nearest_cluster(&p.data, clusters))
                        .collect();
                    if result_sender.send((start, nearest)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_sender);

        let mut jobs = 0;
        for start in (0..points.len()).step_by(chunk) {
            let end = (start + chunk).min(points.len());
            sender
                .send(start..end)
                .map_err(|_| KMeansError::WorkerDisconnected)?;
            jobs += 1;
        }
        // Workers exit once the queue drains
        drop(sender);
        Ok(jobs)
    })?;

    let mut nearest = vec![0; points.len()];
    let mut received = 0;
    for (start, result) in result_receiver.iter() {
        let ids = result?;
        nearest[start..start + ids.len()].copy_from_slice(&ids);
        received += 1;
    }
    if received != jobs {
        return Err(KMeansError::WorkerDisconnected);
    }
    Ok(nearest)
}

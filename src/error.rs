use thiserror::Error;

#[derive(Debug, Error)]
pub enum KMeansError {
    #[error("vector dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("cannot recompute the center of a cluster with no members")]
    EmptyCluster,

    #[error("could not form {k} non-empty clusters after {attempts} reinitializations")]
    UnsatisfiableClusterCount { k: usize, attempts: usize },

    #[error("cluster and class entropies are both zero, NMI is undefined")]
    DegenerateDistribution,

    #[error("no convergence after {0} iterations")]
    ConvergenceTimeout(usize),

    #[error("cannot form {k} clusters from {n} points")]
    InvalidClusterCount { k: usize, n: usize },

    #[error("no points to cluster")]
    EmptyInput,

    #[error("clusters have not been initialized")]
    NotInitialized,

    #[error("engine was initialized with {expected} points, got {found}")]
    PointCountMismatch { expected: usize, found: usize },

    #[error("point {0} has no cluster assignment")]
    Unassigned(usize),

    #[error("cluster id {cluster} is outside [0, {k})")]
    ClusterOutOfRange { cluster: usize, k: usize },

    #[error("class id {label} is outside [0, {num_classes})")]
    LabelOutOfRange { label: usize, num_classes: usize },

    #[error("contingency table rows have differing lengths")]
    RaggedTable,

    #[error("assignment worker disconnected")]
    WorkerDisconnected,

    #[error("line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KMeansError>;

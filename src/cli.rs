use clap::Parser;

use kmeval::KMeansConfig;

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Lloyd's k-means with scatter and NMI evaluation")]
pub struct ArgParser {
    /// ARFF or comma separated data, class label in the last column
    #[arg(short, long)]
    pub input: std::path::PathBuf,

    /// Number of clusters
    #[arg(short, long)]
    pub k: usize,

    /// JSON engine configuration; flags below override it
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Seed for choosing the initial centers
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum update passes before giving up
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Maximum reinitializations on an empty cluster
    #[arg(long)]
    pub max_restarts: Option<usize>,

    /// Number of threads for the assignment step
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output json, stdout when unset
    #[arg(short, long)]
    pub out: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl ArgParser {
    /// Validate command line arguments
    pub fn validate(&self) -> bool {
        let mut is_ok = true;

        if !self.input.exists() {
            error!("--input does not exist");
            is_ok = false;
        } else if !self.input.is_file() {
            error!("--input is not a file");
            is_ok = false;
        }

        if let Some(config) = &self.config {
            if !config.is_file() {
                error!("--config is not a file");
                is_ok = false;
            }
        }

        if self.k == 0 {
            error!("-k must be at least 1");
            is_ok = false;
        }

        if self.threads == Some(0) {
            error!("--threads must be at least 1");
            is_ok = false;
        }

        is_ok
    }

    /// Config file (or defaults) with the command line flags applied on top
    pub fn engine_config(&self) -> kmeval::Result<KMeansConfig> {
        let mut config = match &self.config {
            Some(path) => KMeansConfig::from_path(path)?,
            None => KMeansConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(max_iter) = self.max_iter {
            config = config.with_max_iterations(max_iter);
        }
        if let Some(max_restarts) = self.max_restarts {
            config = config.with_max_restarts(max_restarts);
        }
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        Ok(config)
    }
}

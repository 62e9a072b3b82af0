use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::error::PredictError;
use crate::predict::{PredictionResponse, Predictor};

/// Configuration for the request-serving worker pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Number of workers synthesis calls run on (default: 4)
    pub num_threads: usize,
    /// Deadline for one whole synthesis call in seconds (default: 300)
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            num_threads: 4,
            timeout_seconds: 300,
        }
    }
}

/// Runs predictions on a bounded worker pool so long synthesis calls do not
/// block unrelated lightweight requests.
///
/// The predictor behind the service is immutable and shared across workers;
/// every request keeps its buffers local, so no locking is involved.
pub struct PredictionService {
    pool: rayon::ThreadPool,
    predictor: Arc<Predictor>,
    timeout: Duration,
}

impl PredictionService {
    pub fn new(predictor: Predictor, config: &ServiceConfig) -> Result<Self, PredictError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .build()
            .map_err(|e| {
                PredictError::Computation(format!("worker pool construction failed: {}", e))
            })?;

        Ok(PredictionService {
            pool,
            predictor: Arc::new(predictor),
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    /// Dispatches one prediction onto the pool and waits out the deadline.
    ///
    /// A deadline overrun surfaces as the retryable `Timeout` error; the
    /// worker's late result is discarded.
    pub fn predict(&self, smiles: &str) -> Result<PredictionResponse, PredictError> {
        let (sender, receiver) = mpsc::channel();
        let predictor = Arc::clone(&self.predictor);
        let smiles = smiles.to_string();

        self.pool.spawn(move || {
            // the receiver may already be gone after a timeout
            let _ = sender.send(predictor.predict(&smiles));
        });

        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(PredictError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(PredictError::Computation(
                "synthesis worker dropped its result channel".to_string(),
            )),
        }
    }
}

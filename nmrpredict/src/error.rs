use thiserror::Error;

/// Failure taxonomy of the prediction request boundary.
///
/// The engine prefers defined fallbacks for known-ambiguous numeric input
/// (degenerate requests, pattern mismatches); only the cases below surface as
/// errors to the caller.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The inference collaborator could not produce association records.
    #[error("model inference failed: {0}")]
    Model(String),
    /// The synthesis configuration was rejected before any computation ran.
    #[error("invalid synthesis parameters: {0}")]
    InvalidParams(String),
    /// Unexpected failure inside merge/expand/synthesize/compress, caught at
    /// the request boundary. No partial spectrum is returned.
    #[error("spectrum synthesis failed: {0}")]
    Computation(String),
    /// The pooled synthesis call exceeded its deadline.
    #[error("spectrum synthesis timed out after {seconds} s")]
    Timeout { seconds: u64 },
}

impl PredictError {
    /// Whether the caller may retry the identical request. Only timeouts
    /// qualify: the synthesis chain is deterministic, so every other failure
    /// repeats on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PredictError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeouts_are_retryable() {
        assert!(PredictError::Timeout { seconds: 300 }.is_retryable());
        assert!(!PredictError::Model("no model".to_string()).is_retryable());
        assert!(!PredictError::InvalidParams("bad fwhm".to_string()).is_retryable());
        assert!(!PredictError::Computation("panic".to_string()).is_retryable());
    }

    #[test]
    fn test_display_carries_context() {
        let error = PredictError::Timeout { seconds: 300 };
        assert_eq!(
            error.to_string(),
            "spectrum synthesis timed out after 300 s"
        );
    }
}

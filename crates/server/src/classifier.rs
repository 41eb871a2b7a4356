use anyhow::{anyhow, Result};

use crate::preprocess::ImageTensor;

/// Produces the probability that an input image is cancerous.
pub trait Classifier: Send + Sync {
    fn is_ready(&self) -> bool {
        true
    }

    fn score(&self, input: &ImageTensor) -> Result<f32>;
}

/// Stands in when no model backend is available; the service still answers
/// its contract but reports the model as not loaded.
pub struct MissingClassifier;

impl Classifier for MissingClassifier {
    fn is_ready(&self) -> bool {
        false
    }

    fn score(&self, _input: &ImageTensor) -> Result<f32> {
        Err(anyhow!("no classifier backend is configured"))
    }
}

//! Hybrid predictor façade.
//!
//! Owns all loaded model artifacts, decides degraded mode at construction,
//! and exposes the two typed predict entry points. Artifacts are immutable
//! after load, so `predict_*` methods take `&self` and may run
//! concurrently. [`LazyPredictor`] adds the one-shot shared-instance
//! lifecycle for hosting applications.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use crate::config::PredictorConfig;
use crate::ensemble::{argmax_labels, combine};
use crate::labels::Sentiment;
use crate::lexical::LexicalClassifier;
use crate::neural::{select_device, NeuralClassifier};
use crate::tokenizer::SentimentTokenizer;
use crate::SentraError;

/// Whether the lexical path participates in predictions for an instance.
///
/// Decided once at construction and never revisited: a predictor that
/// degrades stays neural-only for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsembleMode {
    /// Both classifiers contribute to every prediction.
    Hybrid,
    /// Lexical artifacts were unavailable; the neural distribution is used
    /// alone.
    NeuralOnly,
}

/// Hybrid sentiment predictor owning all loaded artifacts.
pub struct HybridPredictor {
    tokenizer: SentimentTokenizer,
    neural: NeuralClassifier,
    lexical: Option<LexicalClassifier>,
    config: PredictorConfig,
}

impl HybridPredictor {
    /// Load all artifacts per the resolved configuration.
    ///
    /// Neural artifacts are required; their absence fails construction.
    /// Lexical artifacts are optional: when unconfigured, missing, or
    /// unreadable the instance runs neural-only, logged here once.
    pub fn new(config: PredictorConfig) -> Result<Self, SentraError> {
        let device = select_device(config.device);

        let tokenizer =
            SentimentTokenizer::load(&config.model_dir.join("tokenizer.json"), config.max_length)?;
        let neural = NeuralClassifier::load(&config.model_dir, device)?;
        info!(
            "Neural classifier loaded from {} (max length {})",
            config.model_dir.display(),
            config.max_length
        );

        let lexical = match (&config.vectorizer_path, &config.classifier_path) {
            (Some(vectorizer), Some(classifier)) => {
                match LexicalClassifier::load(vectorizer, classifier) {
                    Ok(lexical) => {
                        info!("Lexical classifier loaded ({} features)", lexical.num_features());
                        Some(lexical)
                    }
                    Err(e) => {
                        warn!("Failed to load lexical classifier: {}. Running neural-only.", e);
                        None
                    }
                }
            }
            _ => {
                warn!("Lexical artifacts not configured. Running neural-only.");
                None
            }
        };

        Ok(Self {
            tokenizer,
            neural,
            lexical,
            config,
        })
    }

    /// Ensemble mode decided at construction.
    pub fn mode(&self) -> EnsembleMode {
        if self.lexical.is_some() {
            EnsembleMode::Hybrid
        } else {
            EnsembleMode::NeuralOnly
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Classify a single passage.
    pub fn predict_one(&self, text: &str) -> Result<Sentiment, SentraError> {
        let labels = self.predict_batch(&[text.to_string()])?;
        labels
            .into_iter()
            .next()
            .ok_or_else(|| SentraError::Classification("Empty prediction result".to_string()))
    }

    /// Classify a batch, returning one label per input text in input
    /// order.
    ///
    /// An empty batch, or one whose entries are all blank after trimming,
    /// short-circuits to a same-length neutral fill without invoking any
    /// classifier. Any pipeline failure propagates; no partial output is
    /// returned.
    pub fn predict_batch(&self, texts: &[String]) -> Result<Vec<Sentiment>, SentraError> {
        if texts.iter().all(|t| t.trim().is_empty()) {
            debug!(
                "All-blank input of length {}; returning neutral fill",
                texts.len()
            );
            return Ok(vec![Sentiment::Neutral; texts.len()]);
        }

        let neural_probs = self
            .neural
            .run(&self.tokenizer, texts, self.config.batch_size)?;

        let lexical_probs = match &self.lexical {
            Some(lexical) => {
                let probs = lexical.predict_probs(texts);
                if probs.dim() != neural_probs.dim() {
                    return Err(SentraError::Classification(format!(
                        "Lexical distribution shape {:?} does not match neural shape {:?}",
                        probs.dim(),
                        neural_probs.dim()
                    )));
                }
                Some(probs)
            }
            None => None,
        };

        let combined = combine(&neural_probs, lexical_probs.as_ref());
        Ok(argmax_labels(&combined))
    }
}

/// One-shot lazy initialization guard for a shared predictor.
///
/// The first `get` performs the expensive artifact load; concurrent first
/// calls are serialized so the load happens exactly once. The outcome is
/// terminal either way: a successful load is shared by every later call,
/// and a failed load is surfaced to every later call without a retry. A
/// fresh attempt requires a fresh guard.
pub struct LazyPredictor {
    config: PredictorConfig,
    cell: OnceLock<Result<Arc<HybridPredictor>, SentraError>>,
}

impl LazyPredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self {
            config,
            cell: OnceLock::new(),
        }
    }

    /// The shared predictor, loading it on first use.
    pub fn get(&self) -> Result<Arc<HybridPredictor>, SentraError> {
        self.cell
            .get_or_init(|| HybridPredictor::new(self.config.clone()).map(Arc::new))
            .clone()
    }
}

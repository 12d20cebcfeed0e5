//! Candle-based BERT sequence-classifier runner.
//!
//! Loads a BERT encoder together with its pooler and classification head
//! from a HuggingFace-style model directory (`config.json`,
//! `model.safetensors`) and turns raw per-class scores into row-normalized
//! probability vectors via softmax. Inference-only: no parameter updates,
//! no gradient tracking.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use ndarray::Array2;

use crate::batching::{batch_texts, effective_batch_size};
use crate::config::DevicePreference;
use crate::labels::Sentiment;
use crate::tokenizer::{SentimentTokenizer, TokenBatch};
use crate::SentraError;

/// Select the compute device once at construction.
///
/// `Cpu` forces CPU execution. `Auto` tries Metal (macOS) or CUDA when the
/// corresponding feature is enabled, probing layer-norm support since BERT
/// requires it, and falls back to CPU otherwise. Numeric results are
/// identical across devices up to floating-point precision.
pub fn select_device(preference: DevicePreference) -> Device {
    if preference == DevicePreference::Cpu {
        tracing::info!("Using CPU for inference");
        return Device::Cpu;
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(device) = Device::new_metal(0) {
            if probe_layer_norm(&device) {
                tracing::info!("Using Metal GPU for inference");
                return device;
            }
            tracing::warn!("Metal GPU available but layer-norm not supported, falling back to CPU");
        }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            if probe_layer_norm(&device) {
                tracing::info!("Using CUDA GPU for inference");
                return device;
            }
            tracing::warn!("CUDA GPU available but layer-norm not supported, falling back to CPU");
        }
    }
    tracing::info!("Using CPU for inference");
    Device::Cpu
}

/// Probe whether a device supports layer-norm (required by BERT).
#[cfg(any(target_os = "macos", feature = "cuda"))]
fn probe_layer_norm(device: &Device) -> bool {
    (|| -> candle_core::Result<()> {
        let weight = Tensor::ones(4, DType::F32, device)?;
        let bias = Tensor::zeros(4, DType::F32, device)?;
        let ln = candle_nn::LayerNorm::new(weight, bias, 1e-5);
        let input = Tensor::randn(0f32, 1.0, (1, 4), device)?;
        let _ = ln.forward(&input)?;
        Ok(())
    })()
    .is_ok()
}

/// BERT sequence classifier with pooler and linear head.
pub struct NeuralClassifier {
    model: BertModel,
    pooler: Linear,
    classifier: Linear,
    device: Device,
}

impl NeuralClassifier {
    /// Load the classifier from a model directory.
    ///
    /// Head weights (`bert.pooler.dense`, `classifier`) are read before
    /// the base model consumes the builder under the `bert.*` prefix.
    /// Missing or corrupt files fail construction.
    pub fn load(model_dir: &Path, device: Device) -> Result<Self, SentraError> {
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");

        let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
            SentraError::Configuration(format!(
                "Failed to read {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| SentraError::Configuration(format!("Failed to parse BERT config: {}", e)))?;

        // SAFETY: mmap'd safetensors file, not modified while the model is
        // in use.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, &device).map_err(
                |e| {
                    SentraError::Configuration(format!(
                        "Failed to load model weights from {}: {}",
                        weights_path.display(),
                        e
                    ))
                },
            )?
        };

        let pooler_weight = vb
            .pp("bert.pooler.dense")
            .get((config.hidden_size, config.hidden_size), "weight")
            .map_err(|e| SentraError::Configuration(format!("Failed to load pooler.weight: {}", e)))?;
        let pooler_bias = vb
            .pp("bert.pooler.dense")
            .get(config.hidden_size, "bias")
            .map_err(|e| SentraError::Configuration(format!("Failed to load pooler.bias: {}", e)))?;
        let classifier_weight = vb
            .pp("classifier")
            .get((Sentiment::COUNT, config.hidden_size), "weight")
            .map_err(|e| {
                SentraError::Configuration(format!("Failed to load classifier.weight: {}", e))
            })?;
        let classifier_bias = vb
            .pp("classifier")
            .get(Sentiment::COUNT, "bias")
            .map_err(|e| {
                SentraError::Configuration(format!("Failed to load classifier.bias: {}", e))
            })?;

        let model = BertModel::load(vb.pp("bert"), &config)
            .map_err(|e| SentraError::Configuration(format!("Failed to construct BERT model: {}", e)))?;

        Ok(Self {
            model,
            pooler: Linear::new(pooler_weight, Some(pooler_bias)),
            classifier: Linear::new(classifier_weight, Some(classifier_bias)),
            device,
        })
    }

    /// Run one tokenized batch, returning row-normalized class
    /// probabilities, one row per input in batch order.
    pub fn predict_probs(&self, batch: &TokenBatch) -> Result<Vec<Vec<f32>>, SentraError> {
        self.forward_probs(batch)
            .map_err(|e| SentraError::Classification(format!("Forward pass failed: {}", e)))
    }

    fn forward_probs(&self, batch: &TokenBatch) -> candle_core::Result<Vec<Vec<f32>>> {
        let shape = (batch.rows, batch.seq_len);
        let input_ids = Tensor::from_vec(batch.input_ids.clone(), shape, &self.device)?;
        let attention_mask = Tensor::from_vec(batch.attention_mask.clone(), shape, &self.device)?;
        let token_type_ids = Tensor::from_vec(batch.token_type_ids.clone(), shape, &self.device)?;

        // Forward pass -> [batch, seq_len, hidden_size]
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Pooled [CLS] representation -> dense + tanh -> head logits
        let cls = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;

        let probs = candle_nn::ops::softmax(&logits, 1)?;
        probs.to_vec2::<f32>()
    }

    /// Consume all batches in order and concatenate the per-batch outputs
    /// into one N×3 probability matrix in original input order.
    ///
    /// Any tokenization or forward-pass failure fails the whole call; no
    /// partial matrix is returned.
    pub fn run(
        &self,
        tokenizer: &SentimentTokenizer,
        texts: &[String],
        batch_size: usize,
    ) -> Result<Array2<f32>, SentraError> {
        let mut rows: Vec<f32> = Vec::with_capacity(texts.len() * Sentiment::COUNT);
        for chunk in batch_texts(texts, effective_batch_size(batch_size, texts.len())) {
            let refs: Vec<&str> = chunk.iter().map(|s| s.as_str()).collect();
            let batch = tokenizer.encode_batch(&refs)?;
            for row in self.predict_probs(&batch)? {
                rows.extend(row);
            }
        }
        Array2::from_shape_vec((texts.len(), Sentiment::COUNT), rows).map_err(|e| {
            SentraError::Classification(format!("Probability matrix shape error: {}", e))
        })
    }
}

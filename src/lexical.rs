//! Optional lexical classification path.
//!
//! A pre-fitted TF-IDF vectorizer turns text into sparse-ish feature rows
//! and a linear margin classifier scores them per class. Margins are not
//! probabilities; they are normalized with a max-shifted exponential so
//! each row sums to 1 before fusion with the neural distribution. Fitting
//! and training live outside this crate; both artifacts are
//! load-and-transform only.

use std::collections::HashMap;
use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use serde::Deserialize;

use crate::SentraError;

/// TF-IDF vectorizer with a fixed, pre-fitted vocabulary (JSON artifact).
///
/// Tokens are lowercased whitespace words longer than two characters.
/// Term frequencies are count-normalized, IDF-weighted, then
/// L2-normalized.
#[derive(Debug, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Load and validate a vectorizer artifact.
    pub fn load(path: &Path) -> Result<Self, SentraError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SentraError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let vectorizer: Self = serde_json::from_str(&json).map_err(|e| {
            SentraError::Configuration(format!(
                "Failed to parse vectorizer {}: {}",
                path.display(),
                e
            ))
        })?;
        if vectorizer.idf.len() != vectorizer.vocabulary.len() {
            return Err(SentraError::Configuration(format!(
                "Vectorizer {} has {} IDF weights for {} vocabulary entries",
                path.display(),
                vectorizer.idf.len(),
                vectorizer.vocabulary.len()
            )));
        }
        for &idx in vectorizer.vocabulary.values() {
            if idx >= vectorizer.idf.len() {
                return Err(SentraError::Configuration(format!(
                    "Vectorizer {} maps a term to feature {} beyond {} features",
                    path.display(),
                    idx,
                    vectorizer.idf.len()
                )));
            }
        }
        Ok(vectorizer)
    }

    /// Number of features in the fitted vocabulary.
    pub fn num_features(&self) -> usize {
        self.idf.len()
    }

    /// Transform one document into an L2-normalized TF-IDF row.
    ///
    /// Documents with no in-vocabulary terms transform to the zero vector.
    pub fn transform(&self, document: &str) -> Array1<f32> {
        let mut tf = Array1::<f32>::zeros(self.num_features());
        for word in document
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.len() > 2)
        {
            if let Some(&idx) = self.vocabulary.get(word) {
                tf[idx] += 1.0;
            }
        }

        let total = tf.sum();
        if total > 0.0 {
            tf /= total;
        }

        let mut tfidf: Array1<f32> = tf
            .iter()
            .zip(self.idf.iter())
            .map(|(&t, &i)| t * i)
            .collect();
        let norm = tfidf.dot(&tfidf).sqrt();
        if norm > 0.0 {
            tfidf /= norm;
        }
        tfidf
    }

    /// Transform a batch of documents into an N×F feature matrix, rows in
    /// input order.
    pub fn transform_batch(&self, texts: &[String]) -> Array2<f32> {
        let mut features = Array2::zeros((texts.len(), self.num_features()));
        for (i, text) in texts.iter().enumerate() {
            features.row_mut(i).assign(&self.transform(text));
        }
        features
    }
}

#[derive(Debug, Deserialize)]
struct MarginClassifierFile {
    coefficients: Vec<Vec<f32>>,
    intercepts: Vec<f32>,
}

/// Raw margin output prior to normalization.
#[derive(Debug, Clone)]
pub enum Margins {
    /// One margin per class per sample (N×C).
    PerClass(Array2<f32>),
    /// Binary-classifier edge case: one margin per sample.
    Binary(Array1<f32>),
}

/// Linear classifier emitting per-class decision margins (JSON artifact).
///
/// One coefficient row per class; a single-row artifact is the binary
/// margin case.
#[derive(Debug)]
pub struct MarginClassifier {
    weights: Array2<f32>,
    intercepts: Array1<f32>,
}

impl MarginClassifier {
    /// Load and validate a classifier artifact.
    pub fn load(path: &Path) -> Result<Self, SentraError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SentraError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file: MarginClassifierFile = serde_json::from_str(&json).map_err(|e| {
            SentraError::Configuration(format!(
                "Failed to parse classifier {}: {}",
                path.display(),
                e
            ))
        })?;

        let classes = file.coefficients.len();
        if classes == 0 {
            return Err(SentraError::Configuration(format!(
                "Classifier {} has no coefficient rows",
                path.display()
            )));
        }
        let features = file.coefficients[0].len();
        if file.coefficients.iter().any(|row| row.len() != features) {
            return Err(SentraError::Configuration(format!(
                "Classifier {} has ragged coefficient rows",
                path.display()
            )));
        }
        if file.intercepts.len() != classes {
            return Err(SentraError::Configuration(format!(
                "Classifier {} has {} intercepts for {} classes",
                path.display(),
                file.intercepts.len(),
                classes
            )));
        }

        let flat: Vec<f32> = file.coefficients.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((classes, features), flat).map_err(|e| {
            SentraError::Configuration(format!("Classifier {} coefficients: {}", path.display(), e))
        })?;

        Ok(Self {
            weights,
            intercepts: Array1::from(file.intercepts),
        })
    }

    /// Number of features each coefficient row covers.
    pub fn num_features(&self) -> usize {
        self.weights.ncols()
    }

    /// Decision margins `X·Wᵀ + b` for a feature matrix.
    pub fn decision_function(&self, features: &Array2<f32>) -> Margins {
        if self.weights.nrows() == 1 {
            let margins = features.dot(&self.weights.row(0)) + self.intercepts[0];
            Margins::Binary(margins)
        } else {
            Margins::PerClass(features.dot(&self.weights.t()) + &self.intercepts)
        }
    }
}

/// Convert decision margins into a probability matrix.
///
/// A 1-D margin vector is reshaped to a single row first. Each row is
/// shifted by its maximum before exponentiation and normalized to sum
/// to 1.
pub fn margins_to_probs(margins: Margins) -> Array2<f32> {
    let mut rows = match margins {
        Margins::PerClass(m) => m,
        Margins::Binary(v) => v.insert_axis(Axis(0)),
    };
    for mut row in rows.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        if sum > 0.0 {
            row.mapv_inplace(|v| v / sum);
        }
    }
    rows
}

/// The optional lexical path: vectorizer plus margin classifier.
///
/// Constructed only when both artifacts load; the predictor otherwise
/// runs neural-only for its lifetime.
pub struct LexicalClassifier {
    vectorizer: TfidfVectorizer,
    classifier: MarginClassifier,
}

impl LexicalClassifier {
    /// Load both artifacts and check they agree on feature count.
    pub fn load(vectorizer_path: &Path, classifier_path: &Path) -> Result<Self, SentraError> {
        let vectorizer = TfidfVectorizer::load(vectorizer_path)?;
        let classifier = MarginClassifier::load(classifier_path)?;
        if classifier.num_features() != vectorizer.num_features() {
            return Err(SentraError::Configuration(format!(
                "Classifier covers {} features but vectorizer produces {}",
                classifier.num_features(),
                vectorizer.num_features()
            )));
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Number of features shared by vectorizer and classifier.
    pub fn num_features(&self) -> usize {
        self.vectorizer.num_features()
    }

    /// Probability distribution rows for a batch of texts, in input order.
    pub fn predict_probs(&self, texts: &[String]) -> Array2<f32> {
        let features = self.vectorizer.transform_batch(texts);
        margins_to_probs(self.classifier.decision_function(&features))
    }
}

//! Convex fusion of classifier distributions and arg-max label decoding.

use ndarray::Array2;

use crate::labels::Sentiment;

/// Fixed convex weight: the neural classifier's share of the blend when
/// both classifiers contribute. Process-wide constant, not
/// request-configurable.
pub const ENSEMBLE_WEIGHT: f32 = 0.7;

/// Blend the two distributions, or pass the neural one through when the
/// lexical path is unavailable.
pub fn combine(neural: &Array2<f32>, lexical: Option<&Array2<f32>>) -> Array2<f32> {
    match lexical {
        Some(lexical) => neural * ENSEMBLE_WEIGHT + lexical * (1.0 - ENSEMBLE_WEIGHT),
        None => neural.clone(),
    }
}

/// Arg-max decode each row into a label.
///
/// Ties break toward the lowest class index. Rows wider than the label
/// set never win past index 2, so the closed label table is exhaustive.
pub fn argmax_labels(probs: &Array2<f32>) -> Vec<Sentiment> {
    probs
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0usize;
            let mut best_value = f32::NEG_INFINITY;
            for (idx, &value) in row.iter().enumerate() {
                if value > best_value {
                    best = idx;
                    best_value = value;
                }
            }
            Sentiment::from_index(best).unwrap_or(Sentiment::Neutral)
        })
        .collect()
}

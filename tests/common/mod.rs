//! Shared fixtures: synthetic model artifacts small enough to load and run
//! inside tests.
//!
//! The neural fixture is a one-layer BERT with deterministic patterned
//! weights; the tokenizer is word-level over a tiny vocabulary. Lexical
//! fixtures are JSON artifacts wired so "great"/"love" push the positive
//! margin, "terrible" the negative one and "okay" the neutral one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use tempfile::TempDir;

pub const HIDDEN: usize = 16;
const INTERMEDIATE: usize = 32;
const MAX_POSITIONS: usize = 64;

const SPECIAL_TOKENS: [&str; 4] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]"];
const WORDS: [&str; 12] = [
    "great", "terrible", "fine", "love", "hate", "okay", "the", "service", "was", "product",
    "movie", "plot",
];

pub struct TestArtifacts {
    // Held for its Drop: the directory lives as long as the artifacts.
    _dir: TempDir,
    pub model_dir: PathBuf,
    pub vectorizer_path: PathBuf,
    pub classifier_path: PathBuf,
}

/// Build a full set of synthetic artifacts under a temp directory.
pub fn build_artifacts() -> TestArtifacts {
    let dir = tempfile::tempdir().expect("tempdir");
    let model_dir = dir.path().join("finbert");
    std::fs::create_dir_all(&model_dir).expect("model dir");

    write_bert_config(&model_dir);
    write_tokenizer(&model_dir);
    write_weights(&model_dir);

    let vectorizer_path = dir.path().join("vectorizer.json");
    let classifier_path = dir.path().join("classifier.json");
    write_vectorizer(&vectorizer_path);
    write_classifier(&classifier_path);

    TestArtifacts {
        _dir: dir,
        model_dir,
        vectorizer_path,
        classifier_path,
    }
}

fn vocab_size() -> usize {
    SPECIAL_TOKENS.len() + WORDS.len()
}

fn write_bert_config(model_dir: &Path) {
    let config = serde_json::json!({
        "architectures": ["BertForSequenceClassification"],
        "model_type": "bert",
        "vocab_size": vocab_size(),
        "hidden_size": HIDDEN,
        "num_hidden_layers": 1,
        "num_attention_heads": 2,
        "intermediate_size": INTERMEDIATE,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "attention_probs_dropout_prob": 0.1,
        "max_position_embeddings": MAX_POSITIONS,
        "type_vocab_size": 2,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": 0,
        "position_embedding_type": "absolute",
        "use_cache": true,
        "classifier_dropout": null
    });
    std::fs::write(
        model_dir.join("config.json"),
        serde_json::to_string_pretty(&config).expect("config json"),
    )
    .expect("write config.json");
}

fn write_tokenizer(model_dir: &Path) {
    let mut vocab = serde_json::Map::new();
    for (id, token) in SPECIAL_TOKENS.iter().chain(WORDS.iter()).enumerate() {
        vocab.insert((*token).to_string(), serde_json::json!(id));
    }

    let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
        .iter()
        .enumerate()
        .map(|(id, token)| {
            serde_json::json!({
                "id": id,
                "content": token,
                "single_word": false,
                "lstrip": false,
                "rstrip": false,
                "normalized": false,
                "special": true
            })
        })
        .collect();

    let tokenizer = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": {
            "type": "TemplateProcessing",
            "single": [
                { "SpecialToken": { "id": "[CLS]", "type_id": 0 } },
                { "Sequence": { "id": "A", "type_id": 0 } },
                { "SpecialToken": { "id": "[SEP]", "type_id": 0 } }
            ],
            "pair": [
                { "SpecialToken": { "id": "[CLS]", "type_id": 0 } },
                { "Sequence": { "id": "A", "type_id": 0 } },
                { "SpecialToken": { "id": "[SEP]", "type_id": 0 } },
                { "Sequence": { "id": "B", "type_id": 1 } },
                { "SpecialToken": { "id": "[SEP]", "type_id": 1 } }
            ],
            "special_tokens": {
                "[CLS]": { "id": "[CLS]", "ids": [2], "tokens": ["[CLS]"] },
                "[SEP]": { "id": "[SEP]", "ids": [3], "tokens": ["[SEP]"] }
            }
        },
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });
    std::fs::write(
        model_dir.join("tokenizer.json"),
        serde_json::to_string_pretty(&tokenizer).expect("tokenizer json"),
    )
    .expect("write tokenizer.json");
}

/// Deterministic patterned tensor; values depend only on shape and seed so
/// repeated fixture builds produce identical weights.
fn patterned(dims: &[usize], seed: u32) -> Tensor {
    let len: usize = dims.iter().product();
    let data: Vec<f32> = (0..len as u32)
        .map(|i| {
            let h = i.wrapping_mul(2_654_435_761).wrapping_add(seed * 40_503) % 97;
            (h as f32) * 0.01 - 0.48
        })
        .collect();
    Tensor::from_vec(data, dims, &Device::Cpu).expect("patterned tensor")
}

fn ones(dims: &[usize]) -> Tensor {
    Tensor::ones(dims, DType::F32, &Device::Cpu).expect("ones tensor")
}

fn zeros(dims: &[usize]) -> Tensor {
    Tensor::zeros(dims, DType::F32, &Device::Cpu).expect("zeros tensor")
}

fn write_weights(model_dir: &Path) {
    let vocab = vocab_size();
    let mut tensors: HashMap<String, Tensor> = HashMap::new();
    let mut seed = 1u32;
    let mut put = |tensors: &mut HashMap<String, Tensor>, name: String, dims: &[usize]| {
        tensors.insert(name, patterned(dims, seed));
        seed += 3;
    };

    put(
        &mut tensors,
        "bert.embeddings.word_embeddings.weight".to_string(),
        &[vocab, HIDDEN],
    );
    put(
        &mut tensors,
        "bert.embeddings.position_embeddings.weight".to_string(),
        &[MAX_POSITIONS, HIDDEN],
    );
    put(
        &mut tensors,
        "bert.embeddings.token_type_embeddings.weight".to_string(),
        &[2, HIDDEN],
    );
    tensors.insert(
        "bert.embeddings.LayerNorm.weight".to_string(),
        ones(&[HIDDEN]),
    );
    tensors.insert(
        "bert.embeddings.LayerNorm.bias".to_string(),
        zeros(&[HIDDEN]),
    );

    let layer = "bert.encoder.layer.0";
    for proj in ["query", "key", "value"] {
        put(
            &mut tensors,
            format!("{layer}.attention.self.{proj}.weight"),
            &[HIDDEN, HIDDEN],
        );
        put(
            &mut tensors,
            format!("{layer}.attention.self.{proj}.bias"),
            &[HIDDEN],
        );
    }
    put(
        &mut tensors,
        format!("{layer}.attention.output.dense.weight"),
        &[HIDDEN, HIDDEN],
    );
    put(
        &mut tensors,
        format!("{layer}.attention.output.dense.bias"),
        &[HIDDEN],
    );
    tensors.insert(
        format!("{layer}.attention.output.LayerNorm.weight"),
        ones(&[HIDDEN]),
    );
    tensors.insert(
        format!("{layer}.attention.output.LayerNorm.bias"),
        zeros(&[HIDDEN]),
    );
    put(
        &mut tensors,
        format!("{layer}.intermediate.dense.weight"),
        &[INTERMEDIATE, HIDDEN],
    );
    put(
        &mut tensors,
        format!("{layer}.intermediate.dense.bias"),
        &[INTERMEDIATE],
    );
    put(
        &mut tensors,
        format!("{layer}.output.dense.weight"),
        &[HIDDEN, INTERMEDIATE],
    );
    put(
        &mut tensors,
        format!("{layer}.output.dense.bias"),
        &[HIDDEN],
    );
    tensors.insert(
        format!("{layer}.output.LayerNorm.weight"),
        ones(&[HIDDEN]),
    );
    tensors.insert(format!("{layer}.output.LayerNorm.bias"), zeros(&[HIDDEN]));

    put(
        &mut tensors,
        "bert.pooler.dense.weight".to_string(),
        &[HIDDEN, HIDDEN],
    );
    put(&mut tensors, "bert.pooler.dense.bias".to_string(), &[HIDDEN]);
    put(&mut tensors, "classifier.weight".to_string(), &[3, HIDDEN]);
    put(&mut tensors, "classifier.bias".to_string(), &[3]);

    candle_core::safetensors::save(&tensors, model_dir.join("model.safetensors"))
        .expect("write model.safetensors");
}

/// Vectorizer over four features: great, terrible, okay, love.
pub fn write_vectorizer(path: &Path) {
    let vectorizer = serde_json::json!({
        "vocabulary": { "great": 0, "terrible": 1, "okay": 2, "love": 3 },
        "idf": [1.0, 1.0, 1.0, 1.0]
    });
    std::fs::write(path, serde_json::to_string_pretty(&vectorizer).unwrap())
        .expect("write vectorizer");
}

/// Three-class margin classifier aligned with [`write_vectorizer`].
pub fn write_classifier(path: &Path) {
    let classifier = serde_json::json!({
        "coefficients": [
            [6.0, 0.0, 0.0, 4.0],
            [0.0, 6.0, 0.0, 0.0],
            [0.0, 0.0, 6.0, 0.0]
        ],
        "intercepts": [0.0, 0.0, 0.0]
    });
    std::fs::write(path, serde_json::to_string_pretty(&classifier).unwrap())
        .expect("write classifier");
}

/// Single-coefficient-row classifier for the binary margin edge case.
pub fn write_binary_classifier(path: &Path) {
    let classifier = serde_json::json!({
        "coefficients": [[1.0, -1.0, 0.0, 0.5]],
        "intercepts": [0.2]
    });
    std::fs::write(path, serde_json::to_string_pretty(&classifier).unwrap())
        .expect("write binary classifier");
}

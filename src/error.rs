//! Error types for each stage of the prediction pipeline.
//!
//! Every error carries enough context to be rendered to the user: the loader
//! reports the artifact path, the encoder the offending record, the predictor
//! the encoded row.

use std::path::PathBuf;
use thiserror::Error;

use crate::encoding::EncodedRecord;
use crate::record::{CustomerRecord, Field};

/// The model artifact could not be turned into a usable context.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("model artifact not found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: rmp_serde::decode::Error,
    },

    #[error("model artifact {} is incompatible: {reason}", path.display())]
    Incompatible { path: PathBuf, reason: String },
}

/// Writing a model artifact failed.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode model artifact: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

/// A categorical value is outside its fixed vocabulary.
#[derive(Debug, Clone, Error)]
#[error("{field} value {value:?} is not one of {vocabulary:?}")]
pub struct EncodingError {
    pub field: Field,
    pub value: String,
    pub vocabulary: Vec<String>,
    /// The record that was being encoded.
    pub record: CustomerRecord,
    /// Columns encoded before the failure, in model order.
    pub partial: Vec<(Field, f64)>,
}

/// A model capability could not produce a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model expects {expected} input columns, got {found}")]
    Shape { expected: usize, found: usize },

    #[error("model cannot read a {0}-column row")]
    InputWidth(usize),
    #[error("model returned no output")]
    Empty,

    #[error("model predicted unknown class {0}")]
    UnknownClass(usize),

    #[error("model produced a distribution over {0} classes, only binary churn models are supported")]
    NotBinary(usize),

    #[error("model produced an invalid probability distribution {0:?}")]
    InvalidDistribution(Vec<f64>),

    #[error("model produced unusable feature importances: {0}")]
    InvalidImportances(String),
}

/// Classification of an encoded row failed.
#[derive(Debug, Clone, Error)]
#[error("classification failed: {source}")]
pub struct PredictionError {
    #[source]
    pub source: ModelError,
    /// The encoded row handed to the model.
    pub record: EncodedRecord,
}

/// Anything that aborts a single prediction cycle.
#[derive(Debug, Clone, Error)]
pub enum CycleError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

/// A control change was rejected; the form keeps its previous state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("{field}: expected {expected}, got {value:?}")]
    InvalidValue {
        field: Field,
        value: String,
        expected: &'static str,
    },

    #[error("{field}: {value:?} is not one of {options:?}")]
    UnknownOption {
        field: Field,
        value: String,
        options: Vec<&'static str>,
    },

    #[error("unrecognised command `{0}`")]
    UnknownCommand(String),
}

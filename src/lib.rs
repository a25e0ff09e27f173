//! # churnscope 🏦📉
//!
//! Interactive churn prediction for bank customers.
//!
//! A pre-trained binary classifier is loaded once from a MessagePack artifact.
//! Ten customer attributes are edited through form controls, and every change
//! re-runs the same linear cycle: rebuild the record, encode it in the model's
//! column order, classify it and report how confident the model is.
//!
//! ## Features
//! - Fixed-vocabulary encoders for `Gender` and `Geography`
//! - Gaussian Naive Bayes ([`linfa-bayes`](https://crates.io/crates/linfa-bayes)),
//!   decision tree ([`linfa-trees`](https://crates.io/crates/linfa-trees)) and
//!   coefficient-based logistic models behind one capability trait
//! - Label + confidence of the predicted class, when the model can estimate it
//! - Ranked feature importances, when the model has them
//! - Model persistence with `rmp-serde` (MessagePack)
//! - Benchmarkable with [Criterion](https://crates.io/crates/criterion)
//!
//! ## Example
//! ```rust,no_run
//! use churnscope::{ArtifactLoader, InputForm, run_cycle};
//! use churnscope::record::Field;
//!
//! let loader = ArtifactLoader::new("model.msgpack");
//! let context = loader.context()?;
//!
//! let mut form = InputForm::default();
//! form.set(Field::Age, "58")?;
//! let prediction = run_cycle(context, &form.record())?;
//!
//! println!("{} ({:?})", prediction.label, prediction.confidence.percent());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod artifact;
pub mod collector;
pub mod config;
pub mod encoding;
pub mod error;
pub mod model;
pub mod predictor;
pub mod record;
pub mod render;
pub mod sample;
pub mod session;

pub use artifact::{ArtifactLoader, ChurnContext, ModelArtifact};
pub use collector::InputForm;
pub use encoding::{CategoricalEncoder, EncodedRecord, Encoders, encode};
pub use error::{CycleError, EncodingError, LoadError, PredictionError};
pub use model::{Capability, Churn, ChurnClassifier, ChurnModel, Support};
pub use predictor::{Confidence, Prediction, predict, run_cycle};
pub use record::CustomerRecord;
pub use session::{Interaction, Session, Stage};

//! One prediction cycle: encode the record, classify it, attach confidence and
//! (when the model has them) ranked feature importances.

use log::debug;
use std::cmp::Ordering;

use crate::artifact::ChurnContext;
use crate::encoding::{EncodedRecord, encode};
use crate::error::{CycleError, PredictionError};
use crate::model::{Churn, ChurnClassifier, Support};
use crate::record::{CustomerRecord, FEATURE_COUNT, Field};

/// How sure the model is about the predicted label.
#[derive(Debug, Clone, PartialEq)]
pub enum Confidence {
    /// Probability of the predicted class.
    Estimated(f64),
    /// The model cannot estimate probabilities.
    Unsupported,
    /// The model can, but this estimate failed.
    Failed(String),
}

impl Confidence {
    pub fn value(&self) -> Option<f64> {
        match self {
            Confidence::Estimated(p) => Some(*p),
            _ => None,
        }
    }

    pub fn percent(&self) -> Option<f64> {
        self.value().map(|p| p * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedImportance {
    pub field: Field,
    pub score: f64,
}

/// Output of a successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Churn,
    pub confidence: Confidence,
    /// Highest score first; `None` when the model offers no importances.
    pub importances: Option<Vec<RankedImportance>>,
    pub model_type: &'static str,
    pub encoded: EncodedRecord,
}

/// Classify an encoded row.
///
/// Only a classification failure is an error. Probability estimation and
/// importances degrade to [`Confidence::Unsupported`]/[`Confidence::Failed`]
/// and `None` respectively.
pub fn predict<M>(model: &M, encoded: &EncodedRecord) -> Result<Prediction, PredictionError>
where
    M: ChurnClassifier + ?Sized,
{
    let label = model.classify(encoded).map_err(|source| PredictionError {
        source,
        record: *encoded,
    })?;

    let confidence = match model.class_distribution(encoded) {
        Support::Available(dist) => Confidence::Estimated(dist.probability(label)),
        Support::Unsupported => Confidence::Unsupported,
        Support::Failed(err) => {
            debug!("probability estimate failed: {err}");
            Confidence::Failed(err.to_string())
        }
    };

    Ok(Prediction {
        label,
        confidence,
        importances: ranked_importances(model),
        model_type: model.type_name(),
        encoded: *encoded,
    })
}

/// Feature importances sorted by score, if the model can produce them.
pub fn ranked_importances<M>(model: &M) -> Option<Vec<RankedImportance>>
where
    M: ChurnClassifier + ?Sized,
{
    let scores = match model.feature_importances() {
        Support::Available(scores) => scores,
        Support::Unsupported => return None,
        Support::Failed(err) => {
            debug!("ignoring feature importances: {err}");
            return None;
        }
    };
    if scores.len() != FEATURE_COUNT {
        debug!(
            "ignoring feature importances: {} scores for {FEATURE_COUNT} columns",
            scores.len()
        );
        return None;
    }

    let mut ranked: Vec<RankedImportance> = Field::MODEL_ORDER
        .iter()
        .zip(scores)
        .map(|(&field, score)| RankedImportance { field, score })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.field.cmp(&b.field))
    });
    Some(ranked)
}

/// Encode and predict one record against a loaded context.
pub fn run_cycle(context: &ChurnContext, record: &CustomerRecord) -> Result<Prediction, CycleError> {
    let encoded = encode(record, context.encoders())?;
    Ok(predict(context.model(), &encoded)?)
}

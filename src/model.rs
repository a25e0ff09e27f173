//! The churn classifier and the capabilities it may or may not offer.
//!
//! A loaded model always classifies. Probability estimation and feature
//! importances are optional: callers ask [`ChurnClassifier::supports`] or look
//! at the returned [`Support`], which tells "not offered by this model" apart
//! from "offered but failed".

use linfa::prelude::*;
use linfa_bayes::{GaussianNb, NaiveBayes};
use linfa_trees::DecisionTree;
use log::debug;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::encoding::EncodedRecord;
use crate::error::ModelError;
use crate::record::FEATURE_COUNT;

/// Binary outcome the model predicts. Class `0` stays, class `1` exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Churn {
    Stays,
    Exits,
}

impl Churn {
    pub fn from_class(class: usize) -> Result<Self, ModelError> {
        match class {
            0 => Ok(Churn::Stays),
            1 => Ok(Churn::Exits),
            other => Err(ModelError::UnknownClass(other)),
        }
    }

    pub fn class(self) -> usize {
        match self {
            Churn::Stays => 0,
            Churn::Exits => 1,
        }
    }
}

impl fmt::Display for Churn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Churn::Stays => f.write_str("No churn"),
            Churn::Exits => f.write_str("Churn"),
        }
    }
}

/// Optional operations a model can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Classify,
    Probability,
    FeatureImportance,
}

/// Outcome of an optional capability.
#[derive(Debug, Clone, PartialEq)]
pub enum Support<T> {
    Available(T),
    Unsupported,
    Failed(ModelError),
}

impl<T> Support<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Support::Available(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Support<U> {
        match self {
            Support::Available(value) => Support::Available(f(value)),
            Support::Unsupported => Support::Unsupported,
            Support::Failed(err) => Support::Failed(err),
        }
    }

    fn from_result(result: Result<T, ModelError>) -> Self {
        match result {
            Ok(value) => Support::Available(value),
            Err(err) => Support::Failed(err),
        }
    }
}

/// Probability mass over the two churn classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDistribution {
    stays: f64,
    exits: f64,
}

const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

impl ClassDistribution {
    pub fn binary(stays: f64, exits: f64) -> Result<Self, ModelError> {
        let valid = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        if !valid(stays) || !valid(exits) || ((stays + exits) - 1.0).abs() > DISTRIBUTION_TOLERANCE
        {
            return Err(ModelError::InvalidDistribution(vec![stays, exits]));
        }
        Ok(Self { stays, exits })
    }

    /// Build from a probability row and the class label of each column.
    pub fn from_classes(probabilities: &[f64], classes: &[usize]) -> Result<Self, ModelError> {
        if classes.len() != 2 || probabilities.len() != classes.len() {
            return Err(ModelError::NotBinary(classes.len().max(probabilities.len())));
        }
        let mut stays = None;
        let mut exits = None;
        for (&class, &p) in classes.iter().zip(probabilities) {
            match Churn::from_class(class)? {
                Churn::Stays => stays = Some(p),
                Churn::Exits => exits = Some(p),
            }
        }
        match (stays, exits) {
            (Some(stays), Some(exits)) => Self::binary(stays, exits),
            _ => Err(ModelError::InvalidDistribution(probabilities.to_vec())),
        }
    }

    pub fn probability(&self, label: Churn) -> f64 {
        match label {
            Churn::Stays => self.stays,
            Churn::Exits => self.exits,
        }
    }
}

/// Capability set of a loaded churn model.
pub trait ChurnClassifier {
    /// Short name of the model family, shown next to the prediction.
    fn type_name(&self) -> &'static str;

    fn supports(&self, capability: Capability) -> bool;

    fn classify(&self, row: &EncodedRecord) -> Result<Churn, ModelError>;

    fn class_distribution(&self, _row: &EncodedRecord) -> Support<ClassDistribution> {
        Support::Unsupported
    }

    /// One score per column, in model order.
    fn feature_importances(&self) -> Support<Vec<f64>> {
        Support::Unsupported
    }
}

/// Standardised logistic regression stored as plain coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub threshold: f64,
}

impl LogisticModel {
    /// Unscaled model with the usual 0.5 decision threshold.
    pub fn new(weights: Vec<f64>, intercept: f64) -> Self {
        let width = weights.len();
        Self {
            means: vec![0.0; width],
            scales: vec![1.0; width],
            weights,
            intercept,
            threshold: 0.5,
        }
    }

    pub fn with_scaler(mut self, means: Vec<f64>, scales: Vec<f64>) -> Self {
        self.means = means;
        self.scales = scales;
        self
    }

    fn check_width(&self) -> Result<(), ModelError> {
        for width in [self.weights.len(), self.means.len(), self.scales.len()] {
            if width != FEATURE_COUNT {
                return Err(ModelError::Shape {
                    expected: width,
                    found: FEATURE_COUNT,
                });
            }
        }
        Ok(())
    }

    /// Probability that the customer exits.
    pub fn churn_probability(&self, row: &EncodedRecord) -> Result<f64, ModelError> {
        self.check_width()?;
        let z = row
            .values()
            .iter()
            .zip(&self.means)
            .zip(&self.scales)
            .zip(&self.weights)
            .map(|(((x, mean), scale), w)| {
                // zero-variance columns are left unscaled
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                w * (x - mean) / scale
            })
            .sum::<f64>()
            + self.intercept;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl ChurnClassifier for LogisticModel {
    fn type_name(&self) -> &'static str {
        "LogisticRegression"
    }

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn classify(&self, row: &EncodedRecord) -> Result<Churn, ModelError> {
        let p = self.churn_probability(row)?;
        Ok(if p >= self.threshold {
            Churn::Exits
        } else {
            Churn::Stays
        })
    }

    fn class_distribution(&self, row: &EncodedRecord) -> Support<ClassDistribution> {
        Support::from_result(
            self.churn_probability(row)
                .and_then(|p| ClassDistribution::binary(1.0 - p, p)),
        )
    }

    fn feature_importances(&self) -> Support<Vec<f64>> {
        if let Err(err) = self.check_width() {
            return Support::Failed(err);
        }
        let total: f64 = self.weights.iter().map(|w| w.abs()).sum();
        if !total.is_finite() || total == 0.0 {
            return Support::Failed(ModelError::InvalidImportances(
                "all weights are zero".to_string(),
            ));
        }
        Support::Available(self.weights.iter().map(|w| w.abs() / total).collect())
    }
}

/// Every model family a churn artifact may contain.
#[derive(Serialize, Deserialize)]
pub enum ChurnModel {
    NaiveBayes(GaussianNb<f64, usize>),
    DecisionTree(DecisionTree<f64, usize>),
    Logistic(LogisticModel),
}

impl fmt::Debug for ChurnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChurnModel::Logistic(model) => f.debug_tuple("Logistic").field(model).finish(),
            other => f.debug_tuple(other.type_name()).finish_non_exhaustive(),
        }
    }
}

impl ChurnModel {
    /// Fails unless the fitted model reads exactly [`FEATURE_COUNT`] columns.
    pub fn check_input_width(&self) -> Result<(), ModelError> {
        match self {
            ChurnModel::NaiveBayes(model) => match naive_bayes_width(model) {
                Some(width) if width == FEATURE_COUNT => Ok(()),
                Some(width) => Err(ModelError::Shape {
                    expected: width,
                    found: FEATURE_COUNT,
                }),
                None => naive_bayes_dry_run(model),
            },
            ChurnModel::DecisionTree(model) => {
                let width = model.feature_importance().len();
                if width == FEATURE_COUNT {
                    Ok(())
                } else {
                    Err(ModelError::Shape {
                        expected: width,
                        found: FEATURE_COUNT,
                    })
                }
            }
            ChurnModel::Logistic(model) => model.check_width(),
        }
    }
}

/// Per-class means of a fitted Gaussian NB, read back from its serialized form.
#[derive(Deserialize)]
struct FittedGaussianNb {
    class_info: HashMap<usize, FittedClass>,
}

#[derive(Deserialize)]
struct FittedClass {
    theta: Array1<f64>,
}

fn naive_bayes_width(model: &GaussianNb<f64, usize>) -> Option<usize> {
    let bytes = rmp_serde::to_vec_named(model).ok()?;
    let fitted: FittedGaussianNb = rmp_serde::from_slice(&bytes).ok()?;
    let mut widths = fitted.class_info.values().map(|class| class.theta.len());
    let first = widths.next()?;
    widths.all(|width| width == first).then_some(first)
}

/// Classify a zero row, turning a shape panic inside linfa into an error.
fn naive_bayes_dry_run(model: &GaussianNb<f64, usize>) -> Result<(), ModelError> {
    debug!("naive Bayes width unreadable, classifying a zero row instead");
    let row = Array2::<f64>::zeros((1, FEATURE_COUNT));
    match panic::catch_unwind(AssertUnwindSafe(|| model.predict(&row))) {
        Ok(labels) if labels.len() == 1 => Ok(()),
        Ok(_) => Err(ModelError::Empty),
        Err(_) => Err(ModelError::InputWidth(FEATURE_COUNT)),
    }
}

fn first_class(labels: Array1<usize>) -> Result<Churn, ModelError> {
    let class = labels.first().copied().ok_or(ModelError::Empty)?;
    Churn::from_class(class)
}

fn naive_bayes_distribution(
    model: &GaussianNb<f64, usize>,
    row: &EncodedRecord,
) -> Result<ClassDistribution, ModelError> {
    let input = row.to_row();
    let (proba, classes) = model.predict_proba(input.view());
    if proba.nrows() == 0 {
        return Err(ModelError::Empty);
    }
    let probabilities = proba.row(0).to_vec();
    let classes: Vec<usize> = classes.into_iter().copied().collect();
    ClassDistribution::from_classes(&probabilities, &classes)
}

fn tree_importances(model: &DecisionTree<f64, usize>) -> Result<Vec<f64>, ModelError> {
    let scores = model.feature_importance();
    if scores.len() != FEATURE_COUNT {
        return Err(ModelError::Shape {
            expected: scores.len(),
            found: FEATURE_COUNT,
        });
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ModelError::InvalidImportances(format!("{scores:?}")));
    }
    Ok(scores)
}

impl ChurnClassifier for ChurnModel {
    fn type_name(&self) -> &'static str {
        match self {
            ChurnModel::NaiveBayes(_) => "GaussianNb",
            ChurnModel::DecisionTree(_) => "DecisionTree",
            ChurnModel::Logistic(model) => model.type_name(),
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        match (self, capability) {
            (_, Capability::Classify) => true,
            (ChurnModel::NaiveBayes(_), Capability::Probability) => true,
            (ChurnModel::NaiveBayes(_), Capability::FeatureImportance) => false,
            (ChurnModel::DecisionTree(_), Capability::Probability) => false,
            (ChurnModel::DecisionTree(_), Capability::FeatureImportance) => true,
            (ChurnModel::Logistic(model), capability) => model.supports(capability),
        }
    }

    fn classify(&self, row: &EncodedRecord) -> Result<Churn, ModelError> {
        match self {
            ChurnModel::NaiveBayes(model) => first_class(model.predict(&row.to_row())),
            ChurnModel::DecisionTree(model) => first_class(model.predict(&row.to_row())),
            ChurnModel::Logistic(model) => model.classify(row),
        }
    }

    fn class_distribution(&self, row: &EncodedRecord) -> Support<ClassDistribution> {
        match self {
            ChurnModel::NaiveBayes(model) => {
                Support::from_result(naive_bayes_distribution(model, row))
            }
            ChurnModel::DecisionTree(_) => Support::Unsupported,
            ChurnModel::Logistic(model) => model.class_distribution(row),
        }
    }

    fn feature_importances(&self) -> Support<Vec<f64>> {
        match self {
            ChurnModel::NaiveBayes(_) => Support::Unsupported,
            ChurnModel::DecisionTree(model) => Support::from_result(tree_importances(model)),
            ChurnModel::Logistic(model) => model.feature_importances(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: [f64; FEATURE_COUNT]) -> EncodedRecord {
        EncodedRecord::from_values(values)
    }

    #[test]
    fn churn_classes() {
        assert_eq!(Churn::from_class(0), Ok(Churn::Stays));
        assert_eq!(Churn::from_class(1), Ok(Churn::Exits));
        assert_eq!(Churn::from_class(2), Err(ModelError::UnknownClass(2)));
        assert_eq!(Churn::Exits.class(), 1);
    }

    #[test]
    fn distribution_must_sum_to_one() {
        assert!(ClassDistribution::binary(0.25, 0.75).is_ok());
        assert!(ClassDistribution::binary(0.5, 0.6).is_err());
        assert!(ClassDistribution::binary(f64::NAN, 1.0).is_err());
        assert!(ClassDistribution::binary(-0.1, 1.1).is_err());
    }

    #[test]
    fn distribution_maps_columns_by_class() {
        let dist = ClassDistribution::from_classes(&[0.9, 0.1], &[1, 0]).unwrap();
        assert_eq!(dist.probability(Churn::Exits), 0.9);
        assert_eq!(dist.probability(Churn::Stays), 0.1);
    }

    #[test]
    fn multiclass_distribution_is_rejected() {
        assert_eq!(
            ClassDistribution::from_classes(&[0.2, 0.3, 0.5], &[0, 1, 2]),
            Err(ModelError::NotBinary(3))
        );
        assert_eq!(
            ClassDistribution::from_classes(&[0.5, 0.5], &[0, 0]),
            Err(ModelError::InvalidDistribution(vec![0.5, 0.5]))
        );
    }

    #[test]
    fn logistic_uses_threshold() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[3] = 1.0;
        let model = LogisticModel::new(weights, -40.0);

        let mut young = [0.0; FEATURE_COUNT];
        young[3] = 25.0;
        let mut old = [0.0; FEATURE_COUNT];
        old[3] = 60.0;

        assert_eq!(model.classify(&row(young)), Ok(Churn::Stays));
        assert_eq!(model.classify(&row(old)), Ok(Churn::Exits));

        let p = model.churn_probability(&row(old)).unwrap();
        let dist = model.class_distribution(&row(old)).ok().unwrap();
        assert!((dist.probability(Churn::Exits) - p).abs() < 1e-12);
    }

    #[test]
    fn logistic_scaler_centres_inputs() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[0] = 2.0;
        let mut means = vec![0.0; FEATURE_COUNT];
        means[0] = 650.0;
        let mut scales = vec![0.0; FEATURE_COUNT];
        scales[0] = 100.0;
        let model = LogisticModel::new(weights, 0.0).with_scaler(means, scales);

        let mut at_mean = [0.0; FEATURE_COUNT];
        at_mean[0] = 650.0;
        let p = model.churn_probability(&row(at_mean)).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn logistic_importances_are_normalised() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[1] = -3.0;
        weights[4] = 1.0;
        let model = LogisticModel::new(weights, 0.0);

        let scores = model.feature_importances().ok().unwrap();
        assert_eq!(scores[1], 0.75);
        assert_eq!(scores[4], 0.25);
        assert_eq!(scores.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn logistic_with_wrong_width_fails_every_capability() {
        let model = LogisticModel::new(vec![1.0; 3], 0.0);
        let input = row([0.0; FEATURE_COUNT]);

        assert!(matches!(model.classify(&input), Err(ModelError::Shape { .. })));
        assert!(matches!(
            model.class_distribution(&input),
            Support::Failed(ModelError::Shape { .. })
        ));
        assert!(matches!(
            model.feature_importances(),
            Support::Failed(ModelError::Shape { .. })
        ));
    }

    #[test]
    fn logistic_input_width_is_checked() {
        let fitted = ChurnModel::Logistic(LogisticModel::new(vec![0.5; FEATURE_COUNT], 0.0));
        assert_eq!(fitted.check_input_width(), Ok(()));

        let narrow = ChurnModel::Logistic(LogisticModel::new(vec![0.5; 3], 0.0));
        assert_eq!(
            narrow.check_input_width(),
            Err(ModelError::Shape {
                expected: 3,
                found: FEATURE_COUNT
            })
        );
    }

    #[test]
    fn support_map_keeps_variant() {
        let failed: Support<u8> = Support::Failed(ModelError::Empty);
        assert_eq!(failed.map(|v| v + 1), Support::Failed(ModelError::Empty));
        assert_eq!(Support::Available(1u8).map(|v| v + 1), Support::Available(2));
        assert_eq!(Support::<u8>::Unsupported.ok(), None);
    }
}

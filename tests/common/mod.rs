//! Shared fixtures: generated customers and small models fitted in-process.
#![allow(dead_code)]

use churnscope::model::LogisticModel;
use churnscope::record::FEATURE_COUNT;
use churnscope::{ChurnModel, CustomerRecord, Encoders, encode};
use linfa::prelude::*;
use linfa_bayes::GaussianNb;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Ix1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn random_customer(rng: &mut StdRng) -> CustomerRecord {
    CustomerRecord {
        credit_score: rng.random_range(300..=850),
        geography: ["France", "Germany", "Spain"][rng.random_range(0..3)].to_string(),
        gender: ["Female", "Male"][rng.random_range(0..2)].to_string(),
        age: rng.random_range(18..=100),
        tenure: rng.random_range(0..=10),
        balance: rng.random_range(0.0..=250_000.0),
        num_of_products: rng.random_range(1..=4),
        has_cr_card: rng.random_bool(0.7),
        is_active_member: rng.random_bool(0.5),
        estimated_salary: rng.random_range(0.0..=200_000.0),
    }
}

/// Older customers who stopped using the bank leave.
fn churn_rule(customer: &CustomerRecord) -> usize {
    usize::from(customer.age >= 50 && !customer.is_active_member)
}

/// Young, middle-aged and senior customers as three classes.
fn age_band(customer: &CustomerRecord) -> usize {
    match customer.age {
        0..40 => 0,
        40..70 => 1,
        _ => 2,
    }
}

pub fn synthetic_dataset(n: usize, seed: u64) -> Dataset<f64, usize, Ix1> {
    labelled_dataset(n, seed, churn_rule)
}

pub fn labelled_dataset(
    n: usize,
    seed: u64,
    label: impl Fn(&CustomerRecord) -> usize,
) -> Dataset<f64, usize, Ix1> {
    let mut rng = StdRng::seed_from_u64(seed);
    let encoders = Encoders::default();
    let mut values = Vec::with_capacity(n * FEATURE_COUNT);
    let mut labels = Vec::with_capacity(n);

    for _ in 0..n {
        let customer = random_customer(&mut rng);
        let encoded = encode(&customer, &encoders).expect("generated customers are encodable");
        values.extend_from_slice(encoded.values());
        labels.push(label(&customer));
    }

    let x = Array2::from_shape_vec((n, FEATURE_COUNT), values).expect("Failed to build matrix");
    Dataset::new(x, Array1::from_vec(labels))
}

pub fn naive_bayes() -> ChurnModel {
    let model = GaussianNb::params()
        .fit(&synthetic_dataset(400, 7))
        .expect("Training failed");
    ChurnModel::NaiveBayes(model)
}

pub fn decision_tree() -> ChurnModel {
    let model = DecisionTree::params()
        .max_depth(Some(4))
        .fit(&synthetic_dataset(400, 11))
        .expect("Training failed");
    ChurnModel::DecisionTree(model)
}

/// Gaussian NB fitted on three classes instead of stays/exits.
pub fn three_class_naive_bayes() -> ChurnModel {
    let model = GaussianNb::params()
        .fit(&labelled_dataset(600, 5, age_band))
        .expect("Training failed");
    ChurnModel::NaiveBayes(model)
}

/// Binary data with `width` feature columns, unrelated to customers.
pub fn narrow_dataset(width: usize) -> Dataset<f64, usize, Ix1> {
    let rows = 40;
    let x = Array2::from_shape_fn((rows, width), |(i, j)| ((i * (j + 3)) % 11) as f64 + i as f64);
    let y = Array1::from_shape_fn(rows, |i| usize::from(i >= rows / 2));
    Dataset::new(x, y)
}

pub fn naive_bayes_with_width(width: usize) -> ChurnModel {
    let model = GaussianNb::params()
        .fit(&narrow_dataset(width))
        .expect("Training failed");
    ChurnModel::NaiveBayes(model)
}

pub fn decision_tree_with_width(width: usize) -> ChurnModel {
    let model = DecisionTree::params()
        .max_depth(Some(3))
        .fit(&narrow_dataset(width))
        .expect("Training failed");
    ChurnModel::DecisionTree(model)
}

/// Hand-set coefficients: age raises churn, being active lowers it.
pub fn logistic() -> ChurnModel {
    let mut weights = vec![0.0; FEATURE_COUNT];
    weights[3] = 1.2; // Age
    weights[8] = -0.9; // IsActiveMember
    weights[5] = 0.3; // Balance
    let means = vec![650.0, 1.0, 0.5, 40.0, 5.0, 75_000.0, 1.5, 0.7, 0.5, 100_000.0];
    let scales = vec![95.0, 0.8, 0.5, 10.0, 2.9, 62_000.0, 0.6, 0.45, 0.5, 57_000.0];
    ChurnModel::Logistic(LogisticModel::new(weights, -1.0).with_scaler(means, scales))
}

//! Categorical encoders and the fixed-order model input row.

use ndarray::Array2;

use crate::error::EncodingError;
use crate::record::{CustomerRecord, FEATURE_COUNT, Field, Gender, Geography};

/// Fixed mapping between a small vocabulary and integer codes.
///
/// Classes are kept sorted, so the code of a value is its rank in the
/// vocabulary: the same convention the model was fitted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalEncoder {
    field: Field,
    classes: Vec<String>,
}

impl CategoricalEncoder {
    pub fn new(field: Field, vocabulary: &[&str]) -> Self {
        let mut classes: Vec<String> = vocabulary.iter().map(|v| v.to_string()).collect();
        classes.sort();
        classes.dedup();
        Self { field, classes }
    }

    /// `Female -> 0`, `Male -> 1`.
    pub fn gender() -> Self {
        Self::new(Field::Gender, &Gender::NAMES)
    }

    /// `France -> 0`, `Germany -> 1`, `Spain -> 2`.
    pub fn geography() -> Self {
        Self::new(Field::Geography, &Geography::NAMES)
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, value: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .ok()
            .map(|idx| idx as u32)
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

/// The two encoders the model input needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoders {
    pub gender: CategoricalEncoder,
    pub geography: CategoricalEncoder,
}

impl Default for Encoders {
    fn default() -> Self {
        Self {
            gender: CategoricalEncoder::gender(),
            geography: CategoricalEncoder::geography(),
        }
    }
}

impl Encoders {
    pub fn for_field(&self, field: Field) -> Option<&CategoricalEncoder> {
        match field {
            Field::Gender => Some(&self.gender),
            Field::Geography => Some(&self.geography),
            _ => None,
        }
    }
}

/// A customer row in the exact column order of [`Field::MODEL_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedRecord {
    values: [f64; FEATURE_COUNT],
}

impl EncodedRecord {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, field: Field) -> f64 {
        self.values[field.position()]
    }

    /// Integer code of a categorical column, `None` for numeric columns.
    pub fn code(&self, field: Field) -> Option<u32> {
        field.is_categorical().then(|| self.get(field) as u32)
    }

    pub fn columns(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::MODEL_ORDER
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// `1 x FEATURE_COUNT` matrix for the model.
    pub fn to_row(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, col)| self.values[col])
    }
}

/// Replace categorical fields by their codes and lay the row out in model order.
pub fn encode(
    record: &CustomerRecord,
    encoders: &Encoders,
) -> Result<EncodedRecord, EncodingError> {
    let mut values = [0.0; FEATURE_COUNT];
    let mut partial = Vec::with_capacity(FEATURE_COUNT);

    for field in Field::MODEL_ORDER {
        let value = match field {
            Field::CreditScore => f64::from(record.credit_score),
            Field::Geography => {
                lookup(&encoders.geography, &record.geography, record, &partial)?
            }
            Field::Gender => lookup(&encoders.gender, &record.gender, record, &partial)?,
            Field::Age => f64::from(record.age),
            Field::Tenure => f64::from(record.tenure),
            Field::Balance => record.balance,
            Field::NumOfProducts => f64::from(record.num_of_products),
            Field::HasCrCard => bit(record.has_cr_card),
            Field::IsActiveMember => bit(record.is_active_member),
            Field::EstimatedSalary => record.estimated_salary,
        };
        values[field.position()] = value;
        partial.push((field, value));
    }

    Ok(EncodedRecord { values })
}

fn lookup(
    encoder: &CategoricalEncoder,
    value: &str,
    record: &CustomerRecord,
    partial: &[(Field, f64)],
) -> Result<f64, EncodingError> {
    encoder
        .encode(value)
        .map(f64::from)
        .ok_or_else(|| EncodingError {
            field: encoder.field(),
            value: value.to_string(),
            vocabulary: encoder.classes().to_vec(),
            record: record.clone(),
            partial: partial.to_vec(),
        })
}

fn bit(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

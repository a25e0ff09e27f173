//! Customer attributes as collected from the form (or read from a CSV row).

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of input columns the churn model consumes.
pub const FEATURE_COUNT: usize = 10;

/// One of the ten customer attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    CreditScore,
    Geography,
    Gender,
    Age,
    Tenure,
    Balance,
    NumOfProducts,
    HasCrCard,
    IsActiveMember,
    EstimatedSalary,
}

impl Field {
    /// Column order the model was trained on.
    pub const MODEL_ORDER: [Field; FEATURE_COUNT] = [
        Field::CreditScore,
        Field::Geography,
        Field::Gender,
        Field::Age,
        Field::Tenure,
        Field::Balance,
        Field::NumOfProducts,
        Field::HasCrCard,
        Field::IsActiveMember,
        Field::EstimatedSalary,
    ];

    /// Column name as it appears in the dataset header.
    pub fn name(self) -> &'static str {
        match self {
            Field::CreditScore => "CreditScore",
            Field::Geography => "Geography",
            Field::Gender => "Gender",
            Field::Age => "Age",
            Field::Tenure => "Tenure",
            Field::Balance => "Balance",
            Field::NumOfProducts => "NumOfProducts",
            Field::HasCrCard => "HasCrCard",
            Field::IsActiveMember => "IsActiveMember",
            Field::EstimatedSalary => "EstimatedSalary",
        }
    }

    /// Index of this field inside [`Field::MODEL_ORDER`].
    pub fn position(self) -> usize {
        self as usize
    }

    pub fn is_categorical(self) -> bool {
        matches!(self, Field::Geography | Field::Gender)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    /// Accepts `CreditScore`, `credit_score`, `credit-score`, `creditscore`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();

        Field::MODEL_ORDER
            .into_iter()
            .find(|field| field.name().to_lowercase() == key)
            .ok_or_else(|| format!("unknown field `{s}`"))
    }
}

/// Selector options for the `Geography` control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Geography {
    #[default]
    France,
    Germany,
    Spain,
}

impl Geography {
    pub const ALL: [Geography; 3] = [Geography::France, Geography::Germany, Geography::Spain];

    /// Option labels, in the order of [`Geography::ALL`].
    pub const NAMES: [&'static str; 3] = [
        Self::ALL[0].as_str(),
        Self::ALL[1].as_str(),
        Self::ALL[2].as_str(),
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Geography::France => "France",
            Geography::Germany => "Germany",
            Geography::Spain => "Spain",
        }
    }
}

/// Selector options for the `Gender` control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    Female,
    Male,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Female, Gender::Male];

    pub const NAMES: [&'static str; 2] = [Self::ALL[0].as_str(), Self::ALL[1].as_str()];

    pub const fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }
}

/// A single customer row.
///
/// The categorical fields keep the raw category text so that records coming
/// from outside the form (CSV rows, other callers) go through the same
/// vocabulary check in the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerRecord {
    pub credit_score: u32,
    pub geography: String,
    pub gender: String,
    pub age: u32,
    pub tenure: u32,
    pub balance: f64,
    pub num_of_products: u32,
    #[serde(deserialize_with = "flag")]
    pub has_cr_card: bool,
    #[serde(deserialize_with = "flag")]
    pub is_active_member: bool,
    pub estimated_salary: f64,
}

impl CustomerRecord {
    /// Human readable value of one field, as shown in the input table.
    pub fn display_value(&self, field: Field) -> String {
        match field {
            Field::CreditScore => self.credit_score.to_string(),
            Field::Geography => self.geography.clone(),
            Field::Gender => self.gender.clone(),
            Field::Age => self.age.to_string(),
            Field::Tenure => self.tenure.to_string(),
            Field::Balance => format!("{:.2}", self.balance),
            Field::NumOfProducts => self.num_of_products.to_string(),
            Field::HasCrCard => yes_no(self.has_cr_card).to_string(),
            Field::IsActiveMember => yes_no(self.is_active_member).to_string(),
            Field::EstimatedSalary => format!("{:.2}", self.estimated_salary),
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Dataset files store booleans as `0`/`1`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean, 0 or 1")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(de::Unexpected::Unsigned(other), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(de::Unexpected::Signed(other), &self)),
            }
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
            if v == 0.0 {
                Ok(false)
            } else if v == 1.0 {
                Ok(true)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_lowercase().as_str() {
                "1" | "true" => Ok(true),
                "0" | "false" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

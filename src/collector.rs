//! Form controls for the ten customer attributes.
//!
//! The form always holds a complete, in-range customer; every accepted change
//! rebuilds the whole [`CustomerRecord`].

use crate::error::InputError;
use crate::record::{CustomerRecord, Field, Gender, Geography};

/// Widget behind one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    /// Numeric slider. `step` of `None` means continuous.
    Slider {
        min: f64,
        max: f64,
        step: Option<f64>,
        default: f64,
    },
    Checkbox {
        default: bool,
    },
    Select {
        options: &'static [&'static str],
        default: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSpec {
    pub field: Field,
    pub label: &'static str,
    pub control: Control,
}


const fn int_slider(min: f64, max: f64, default: f64) -> Control {
    Control::Slider {
        min,
        max,
        step: Some(1.0),
        default,
    }
}

const fn slider(min: f64, max: f64, default: f64) -> Control {
    Control::Slider {
        min,
        max,
        step: None,
        default,
    }
}

/// Controls in display order.
pub static CONTROLS: [ControlSpec; 10] = [
    ControlSpec {
        field: Field::CreditScore,
        label: "Credit Score",
        control: int_slider(300.0, 850.0, 650.0),
    },
    ControlSpec {
        field: Field::Geography,
        label: "Geography",
        control: Control::Select {
            options: &Geography::NAMES,
            default: 0,
        },
    },
    ControlSpec {
        field: Field::Gender,
        label: "Gender",
        control: Control::Select {
            options: &Gender::NAMES,
            default: 0,
        },
    },
    ControlSpec {
        field: Field::Age,
        label: "Age",
        control: int_slider(18.0, 100.0, 40.0),
    },
    ControlSpec {
        field: Field::Tenure,
        label: "Tenure (years)",
        control: int_slider(0.0, 10.0, 5.0),
    },
    ControlSpec {
        field: Field::Balance,
        label: "Balance",
        control: slider(0.0, 250_000.0, 50_000.0),
    },
    ControlSpec {
        field: Field::NumOfProducts,
        label: "Number of Products",
        control: int_slider(1.0, 4.0, 2.0),
    },
    ControlSpec {
        field: Field::HasCrCard,
        label: "Has Credit Card",
        control: Control::Checkbox { default: true },
    },
    ControlSpec {
        field: Field::IsActiveMember,
        label: "Is Active Member",
        control: Control::Checkbox { default: true },
    },
    ControlSpec {
        field: Field::EstimatedSalary,
        label: "Estimated Salary",
        control: slider(0.0, 200_000.0, 100_000.0),
    },
];

pub fn control_for(field: Field) -> &'static ControlSpec {
    // every field has exactly one control
    CONTROLS
        .iter()
        .find(|spec| spec.field == field)
        .unwrap_or(&CONTROLS[0])
}

/// Result of an accepted control change.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    pub field: Field,
    /// Value after clamping, as displayed.
    pub value: String,
    pub clamped: bool,
}

/// Current control state.
#[derive(Debug, Clone, PartialEq)]
pub struct InputForm {
    credit_score: u32,
    geography: Geography,
    gender: Gender,
    age: u32,
    tenure: u32,
    balance: f64,
    num_of_products: u32,
    has_cr_card: bool,
    is_active_member: bool,
    estimated_salary: f64,
}

impl Default for InputForm {
    /// The "typical" customer the form opens with: every control at the
    /// default listed in [`CONTROLS`].
    fn default() -> Self {
        let mut form = Self {
            credit_score: 0,
            geography: Geography::default(),
            gender: Gender::default(),
            age: 0,
            tenure: 0,
            balance: 0.0,
            num_of_products: 0,
            has_cr_card: false,
            is_active_member: false,
            estimated_salary: 0.0,
        };
        for spec in &CONTROLS {
            match spec.control {
                Control::Slider { default, .. } => form.store_number(spec.field, default),
                Control::Checkbox { default } => form.store_flag(spec.field, default),
                Control::Select { default, .. } => form.store_choice(spec.field, default),
            }
        }
        form
    }
}

impl InputForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rebuild the full record from the current controls.
    pub fn record(&self) -> CustomerRecord {
        CustomerRecord {
            credit_score: self.credit_score,
            geography: self.geography.as_str().to_string(),
            gender: self.gender.as_str().to_string(),
            age: self.age,
            tenure: self.tenure,
            balance: self.balance,
            num_of_products: self.num_of_products,
            has_cr_card: self.has_cr_card,
            is_active_member: self.is_active_member,
            estimated_salary: self.estimated_salary,
        }
    }

    /// Apply one control change. Rejected input leaves the form untouched.
    pub fn set(&mut self, field: Field, raw: &str) -> Result<Adjustment, InputError> {
        let raw = raw.trim();
        let spec = control_for(field);

        let clamped = match spec.control {
            Control::Slider { min, max, step, .. } => {
                let requested = parse_number(field, raw)?;
                self.store_number(field, snap(requested, min, max, step));
                // rounding to the step alone is not a clamp
                !(min..=max).contains(&requested)
            }
            Control::Checkbox { .. } => {
                let value = parse_flag(field, raw)?;
                self.store_flag(field, value);
                false
            }
            Control::Select { options, .. } => {
                let index = parse_option(field, raw, options)?;
                self.store_choice(field, index);
                false
            }
        };

        Ok(Adjustment {
            field,
            value: self.record().display_value(field),
            clamped,
        })
    }

    fn store_number(&mut self, field: Field, value: f64) {
        match field {
            Field::CreditScore => self.credit_score = value as u32,
            Field::Age => self.age = value as u32,
            Field::Tenure => self.tenure = value as u32,
            Field::NumOfProducts => self.num_of_products = value as u32,
            Field::Balance => self.balance = value,
            Field::EstimatedSalary => self.estimated_salary = value,
            _ => {}
        }
    }

    fn store_flag(&mut self, field: Field, value: bool) {
        match field {
            Field::HasCrCard => self.has_cr_card = value,
            Field::IsActiveMember => self.is_active_member = value,
            _ => {}
        }
    }

    fn store_choice(&mut self, field: Field, index: usize) {
        match field {
            Field::Geography => {
                if let Some(&geography) = Geography::ALL.get(index) {
                    self.geography = geography;
                }
            }
            Field::Gender => {
                if let Some(&gender) = Gender::ALL.get(index) {
                    self.gender = gender;
                }
            }
            _ => {}
        }
    }
}

fn snap(value: f64, min: f64, max: f64, step: Option<f64>) -> f64 {
    let value = match step {
        Some(step) => min + ((value - min) / step).round() * step,
        None => value,
    };
    value.clamp(min, max)
}

fn parse_number(field: Field, raw: &str) -> Result<f64, InputError> {
    raw.replace('_', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::InvalidValue {
            field,
            value: raw.to_string(),
            expected: "a number",
        })
}

fn parse_flag(field: Field, raw: &str) -> Result<bool, InputError> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Ok(true),
        "false" | "no" | "n" | "off" | "0" => Ok(false),
        _ => Err(InputError::InvalidValue {
            field,
            value: raw.to_string(),
            expected: "yes or no",
        }),
    }
}

fn parse_option(field: Field, raw: &str, options: &[&'static str]) -> Result<usize, InputError> {
    if let Ok(index) = raw.parse::<usize>() {
        if index < options.len() {
            return Ok(index);
        }
    }
    options
        .iter()
        .position(|option| option.eq_ignore_ascii_case(raw))
        .ok_or_else(|| InputError::UnknownOption {
            field,
            value: raw.to_string(),
            options: options.to_vec(),
        })
}

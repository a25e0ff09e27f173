//! Interactive session: owns the form, borrows the loaded context and runs a
//! prediction cycle for every accepted interaction.

use log::debug;

use crate::artifact::{ArtifactLoader, ChurnContext};
use crate::collector::{Adjustment, InputForm};
use crate::error::{CycleError, InputError, LoadError};
use crate::predictor::{Prediction, run_cycle};
use crate::record::{CustomerRecord, Field};

/// Lifecycle of the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Loading,
    Ready,
    Predicting,
}

/// A single user action on the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Set { field: Field, value: String },
    Reset,
    /// Re-run the cycle without changing anything.
    Refresh,
}

impl Interaction {
    /// Parse `set <field> <value>`, `<field>=<value>`, `reset` or `refresh`.
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let line = line.trim();

        if let Some((field, value)) = line.split_once('=') {
            return Self::set(field, value);
        }

        let mut words = line.split_whitespace();
        match words.next().map(str::to_lowercase).as_deref() {
            Some("set") => {
                let field = words.next().unwrap_or_default();
                let value = words.collect::<Vec<_>>().join(" ");
                Self::set(field, &value)
            }
            Some("reset") => Ok(Interaction::Reset),
            Some("refresh") | Some("predict") => Ok(Interaction::Refresh),
            _ => Err(InputError::UnknownCommand(line.to_string())),
        }
    }

    fn set(field: &str, value: &str) -> Result<Self, InputError> {
        let field = field
            .trim()
            .parse::<Field>()
            .map_err(|_| InputError::UnknownField(field.trim().to_string()))?;
        Ok(Interaction::Set {
            field,
            value: value.trim().to_string(),
        })
    }
}

/// What one interaction produced.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub record: CustomerRecord,
    pub adjustment: Option<Adjustment>,
    pub outcome: Result<Prediction, CycleError>,
}

pub struct Session<'ctx> {
    context: &'ctx ChurnContext,
    form: InputForm,
    stage: Stage,
}

impl<'ctx> Session<'ctx> {
    /// Load the model (once) and enter the ready state.
    ///
    /// A load failure is final: no session, no prediction UI.
    pub fn open(loader: &'ctx ArtifactLoader) -> Result<Self, LoadError> {
        let mut stage = Stage::Idle;
        if !loader.is_loaded() {
            transition(&mut stage, Stage::Loading);
        }
        let context = loader.context()?;
        transition(&mut stage, Stage::Ready);
        Ok(Self {
            context,
            form: InputForm::default(),
            stage,
        })
    }

    /// Start a session on an already built context.
    pub fn with_context(context: &'ctx ChurnContext) -> Self {
        Self {
            context,
            form: InputForm::default(),
            stage: Stage::Ready,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn form(&self) -> &InputForm {
        &self.form
    }

    pub fn context(&self) -> &'ctx ChurnContext {
        self.context
    }

    /// Apply an interaction and run a full cycle on the rebuilt record.
    ///
    /// Returns `Err` only when the interaction itself is rejected, in which
    /// case the form is unchanged and no cycle runs.
    pub fn interact(&mut self, interaction: Interaction) -> Result<CycleReport, InputError> {
        let adjustment = match interaction {
            Interaction::Set { field, value } => Some(self.form.set(field, &value)?),
            Interaction::Reset => {
                self.form.reset();
                None
            }
            Interaction::Refresh => None,
        };

        let record = self.form.record();
        transition(&mut self.stage, Stage::Predicting);
        let outcome = run_cycle(self.context, &record);
        transition(&mut self.stage, Stage::Ready);

        if let Err(err) = &outcome {
            debug!("cycle aborted: {err}");
        }

        Ok(CycleReport {
            record,
            adjustment,
            outcome,
        })
    }
}

fn transition(stage: &mut Stage, next: Stage) {
    debug!("{stage:?} -> {next:?}");
    *stage = next;
}

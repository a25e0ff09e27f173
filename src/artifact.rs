//! Loading the model artifact and building the prediction context.

use log::{debug, info};
use rmp_serde::{decode::from_read, encode::write_named};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::encoding::Encoders;
use crate::error::{LoadError, SaveError};
use crate::model::{ChurnClassifier, ChurnModel};
use crate::record::Field;

/// Version written into every artifact produced by this crate.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// On-disk envelope around a fitted churn model.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Column names the model was fitted on, in order.
    pub columns: Vec<String>,
    pub model: ChurnModel,
}

impl ModelArtifact {
    pub fn new(model: ChurnModel) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            columns: Field::MODEL_ORDER
                .iter()
                .map(|f| f.name().to_string())
                .collect(),
            model,
        }
    }

    /// Saves the artifact to a binary `.msgpack` file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), SaveError> {
        let io_err = |source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        write_named(&mut writer, self)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }

    /// Loads an artifact from a binary `.msgpack` file.
    pub fn load_from_file(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::Missing {
                path: path.to_path_buf(),
            },
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let artifact: ModelArtifact =
            from_read(BufReader::new(file)).map_err(|source| LoadError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        artifact.check_compatible(path)?;
        Ok(artifact)
    }

    fn check_compatible(&self, path: &Path) -> Result<(), LoadError> {
        let incompatible = |reason: String| LoadError::Incompatible {
            path: path.to_path_buf(),
            reason,
        };

        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(incompatible(format!(
                "format version {}, expected {}",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        let expected: Vec<&str> = Field::MODEL_ORDER.iter().map(|f| f.name()).collect();
        if self.columns != expected {
            return Err(incompatible(format!(
                "fitted on columns {:?}, expected {:?}",
                self.columns, expected
            )));
        }

        self.model
            .check_input_width()
            .map_err(|err| incompatible(err.to_string()))
    }
}

/// Everything a prediction cycle needs, built once and then only borrowed.
#[derive(Debug)]
pub struct ChurnContext {
    model: ChurnModel,
    encoders: Encoders,
}

impl ChurnContext {
    /// Wrap an in-memory model with the standard encoders.
    pub fn from_model(model: ChurnModel) -> Self {
        Self {
            model,
            encoders: Encoders::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let artifact = ModelArtifact::load_from_file(path)?;
        info!(
            "loaded {} model from {}",
            artifact.model.type_name(),
            path.display()
        );
        Ok(Self::from_model(artifact.model))
    }

    pub fn model(&self) -> &ChurnModel {
        &self.model
    }

    pub fn encoders(&self) -> &Encoders {
        &self.encoders
    }
}

/// Loads the context on first use and hands out the same instance afterwards.
#[derive(Debug)]
pub struct ArtifactLoader {
    path: PathBuf,
    cached: OnceCell<ChurnContext>,
}

impl ArtifactLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.get().is_some()
    }

    pub fn context(&self) -> Result<&ChurnContext, LoadError> {
        if let Some(context) = self.cached.get() {
            debug!("reusing cached model context");
            return Ok(context);
        }
        let context = ChurnContext::load(&self.path)?;
        Ok(self.cached.get_or_init(|| context))
    }
}

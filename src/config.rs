//! Fixed settings of the demo. Nothing here is read from flags or the
//! environment.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Serialized model, relative to the working directory.
    pub artifact_path: PathBuf,
    /// Optional CSV shown as illustration.
    pub sample_path: PathBuf,
    pub sample_rows: usize,
    /// Length of the longest bar in the importance chart.
    pub chart_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("model.msgpack"),
            sample_path: PathBuf::from("data/Churn_Modelling.csv"),
            sample_rows: 5,
            chart_width: 30,
        }
    }
}

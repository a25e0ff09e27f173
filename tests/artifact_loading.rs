//! Loading model artifacts from disk.

mod common;

use std::fs;
use std::path::Path;

use churnscope::artifact::ARTIFACT_FORMAT_VERSION;
use churnscope::session::{Session, Stage};
use churnscope::{
    ArtifactLoader, ChurnClassifier, ChurnContext, InputForm, LoadError, ModelArtifact, run_cycle,
};

fn write_artifact(dir: &Path, artifact: &ModelArtifact) -> std::path::PathBuf {
    let path = dir.join("model.msgpack");
    artifact.save_to_file(&path).unwrap();
    path
}

#[test]
fn missing_artifact_halts_before_any_session() {
    let dir = tempfile::tempdir().unwrap();
    let loader = ArtifactLoader::new(dir.path().join("model.msgpack"));

    match Session::open(&loader) {
        Err(LoadError::Missing { path }) => assert!(path.ends_with("model.msgpack")),
        Err(other) => panic!("expected missing artifact, got {other}"),
        Ok(_) => panic!("session opened without a model"),
    }
    assert!(!loader.is_loaded());
}

#[test]
fn garbage_bytes_are_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.msgpack");
    fs::write(&path, b"definitely not messagepack").unwrap();

    let err = ChurnContext::load(&path).unwrap_err();
    assert!(matches!(err, LoadError::Corrupt { .. }), "{err}");
}

#[test]
fn directory_instead_of_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ChurnContext::load(dir.path()).unwrap_err();
    assert!(
        matches!(err, LoadError::Io { .. } | LoadError::Corrupt { .. }),
        "{err}"
    );
}

#[test]
fn artifact_with_other_columns_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut artifact = ModelArtifact::new(common::logistic());
    artifact.columns.reverse();
    let path = write_artifact(dir.path(), &artifact);

    let err = ChurnContext::load(&path).unwrap_err();
    assert!(matches!(err, LoadError::Incompatible { .. }), "{err}");
    assert!(err.to_string().contains("fitted on columns"));
}

#[test]
fn artifact_from_another_format_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut artifact = ModelArtifact::new(common::logistic());
    artifact.format_version = ARTIFACT_FORMAT_VERSION + 1;
    let path = write_artifact(dir.path(), &artifact);

    assert!(matches!(
        ChurnContext::load(&path),
        Err(LoadError::Incompatible { .. })
    ));
}

#[test]
fn models_fitted_on_other_widths_are_rejected() {
    for model in [
        common::naive_bayes_with_width(3),
        common::decision_tree_with_width(3),
        common::naive_bayes_with_width(12),
        common::decision_tree_with_width(12),
    ] {
        let dir = tempfile::tempdir().unwrap();
        let name = model.type_name();
        let path = write_artifact(dir.path(), &ModelArtifact::new(model));

        match ChurnContext::load(&path) {
            Err(LoadError::Incompatible { .. }) => {}
            Err(other) => panic!("{name}: expected incompatible artifact, got {other}"),
            Ok(_) => panic!("{name}: loaded a model of the wrong width"),
        }
    }
}

#[test]
fn session_refuses_a_narrow_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_artifact(
        dir.path(),
        &ModelArtifact::new(common::naive_bayes_with_width(3)),
    );
    let loader = ArtifactLoader::new(path);

    assert!(matches!(
        Session::open(&loader),
        Err(LoadError::Incompatible { .. })
    ));
    assert!(!loader.is_loaded());
}

#[test]
fn saved_naive_bayes_predicts_like_the_in_memory_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_artifact(dir.path(), &ModelArtifact::new(common::naive_bayes()));

    let loaded = ChurnContext::load(&path).unwrap();
    let fresh = ChurnContext::from_model(common::naive_bayes());
    assert_eq!(loaded.model().type_name(), "GaussianNb");

    let record = InputForm::default().record();
    let a = run_cycle(&loaded, &record).unwrap();
    let b = run_cycle(&fresh, &record).unwrap();
    assert_eq!(a.label, b.label);
    let (pa, pb) = (a.confidence.value().unwrap(), b.confidence.value().unwrap());
    assert!((pa - pb).abs() < 1e-9, "{pa} vs {pb}");
}

#[test]
fn saved_decision_tree_keeps_its_importances() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_artifact(dir.path(), &ModelArtifact::new(common::decision_tree()));

    let loaded = ChurnContext::load(&path).unwrap();
    let fresh = ChurnContext::from_model(common::decision_tree());
    assert_eq!(
        loaded.model().feature_importances(),
        fresh.model().feature_importances()
    );
}

#[test]
fn loader_reads_storage_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_artifact(dir.path(), &ModelArtifact::new(common::logistic()));
    let loader = ArtifactLoader::new(&path);

    let first = loader.context().unwrap() as *const ChurnContext;
    fs::remove_file(&path).unwrap();
    let second = loader.context().unwrap() as *const ChurnContext;

    assert!(loader.is_loaded());
    assert_eq!(first, second);
}

#[test]
fn session_opens_ready_on_a_valid_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_artifact(dir.path(), &ModelArtifact::new(common::decision_tree()));
    let loader = ArtifactLoader::new(path);

    let session = Session::open(&loader).unwrap();
    assert_eq!(session.stage(), Stage::Ready);
    assert_eq!(session.context().model().type_name(), "DecisionTree");
    assert!(loader.is_loaded());
}

//! Model artifact persistence.
//!
//! The classifier and scaler are saved and loaded as a unit: a partial
//! pair must never be loadable, since scoring with a scaler from a
//! different training run silently corrupts predictions.

use crate::error::StoreError;
use crate::models::forest::RandomForest;
use crate::models::scaler::StandardScaler;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CLASSIFIER_ARTIFACT: &str = "fraud_model.json";
pub const SCALER_ARTIFACT: &str = "scaler.json";

/// Serializes and deserializes the trained classifier + scaler pair.
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn classifier_path(&self) -> PathBuf {
        self.dir.join(CLASSIFIER_ARTIFACT)
    }

    fn scaler_path(&self) -> PathBuf {
        self.dir.join(SCALER_ARTIFACT)
    }

    /// Persist both artifacts as a unit.
    ///
    /// Each artifact is written to a temp file and renamed into place. If
    /// the second artifact fails, the first is removed again so the store
    /// cannot hold a loadable-but-mismatched pair.
    pub fn save(
        &self,
        classifier: &RandomForest,
        scaler: &StandardScaler,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        let classifier_bytes = serde_json::to_vec(classifier)?;
        let scaler_bytes = serde_json::to_vec(scaler)?;

        write_atomic(&self.classifier_path(), &classifier_bytes)?;
        if let Err(e) = write_atomic(&self.scaler_path(), &scaler_bytes) {
            let _ = fs::remove_file(self.classifier_path());
            return Err(e);
        }

        info!(
            dir = %self.dir.display(),
            trees = classifier.params().trees,
            "Model artifacts saved"
        );
        Ok(())
    }

    /// Load the pair if both artifacts exist and deserialize into usable
    /// models.
    pub fn load(&self) -> Result<(RandomForest, StandardScaler), StoreError> {
        for path in [self.classifier_path(), self.scaler_path()] {
            if !path.exists() {
                return Err(StoreError::ArtifactMissing(path));
            }
        }

        let classifier: RandomForest = read_artifact(&self.classifier_path())?;
        let scaler: StandardScaler = read_artifact(&self.scaler_path())?;

        if !classifier.is_trained() {
            return Err(StoreError::ArtifactCorrupt {
                path: self.classifier_path(),
                reason: "classifier deserialized with no trees".to_string(),
            });
        }
        if !scaler.is_fitted() {
            return Err(StoreError::ArtifactCorrupt {
                path: self.scaler_path(),
                reason: "scaler deserialized without fitted statistics".to_string(),
            });
        }

        info!(
            dir = %self.dir.display(),
            trees = classifier.params().trees,
            "Model artifacts loaded"
        );
        Ok((classifier, scaler))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::ArtifactCorrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forest::ForestParams;
    use tempfile::TempDir;

    fn trained_pair() -> (RandomForest, StandardScaler) {
        let rows = vec![
            vec![0.0, 1.0],
            vec![0.2, 1.1],
            vec![0.1, 0.9],
            vec![4.0, 9.0],
            vec![4.2, 9.1],
            vec![4.1, 8.9],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&rows).unwrap();

        let mut forest = RandomForest::new(ForestParams {
            trees: 10,
            max_depth: 4,
            min_samples_split: 2,
            seed: 42,
        });
        forest.fit(&scaled, &labels);

        (forest, scaler)
    }

    #[test]
    fn test_round_trip_preserves_predictions() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        let (forest, scaler) = trained_pair();

        store.save(&forest, &scaler).unwrap();
        let (loaded_forest, loaded_scaler) = store.load().unwrap();

        for probe in [vec![0.1, 1.0], vec![4.0, 9.0], vec![2.0, 5.0]] {
            let before = forest.predict_proba(&scaler.transform(&probe).unwrap()).unwrap();
            let after = loaded_forest
                .predict_proba(&loaded_scaler.transform(&probe).unwrap())
                .unwrap();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_load_without_artifacts_is_missing() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());

        assert!(matches!(store.load(), Err(StoreError::ArtifactMissing(_))));
    }

    #[test]
    fn test_partial_pair_is_missing() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        let (forest, scaler) = trained_pair();
        store.save(&forest, &scaler).unwrap();

        fs::remove_file(dir.path().join(SCALER_ARTIFACT)).unwrap();

        assert!(matches!(store.load(), Err(StoreError::ArtifactMissing(_))));
    }

    #[test]
    fn test_garbage_artifact_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        let (forest, scaler) = trained_pair();
        store.save(&forest, &scaler).unwrap();

        fs::write(dir.path().join(CLASSIFIER_ARTIFACT), b"not json").unwrap();

        assert!(matches!(
            store.load(),
            Err(StoreError::ArtifactCorrupt { .. })
        ));
    }

    #[test]
    fn test_untrained_classifier_artifact_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        let (_, scaler) = trained_pair();
        let untrained = RandomForest::new(ForestParams::default());

        // Bypass save's contract by writing artifacts directly.
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(
            dir.path().join(CLASSIFIER_ARTIFACT),
            serde_json::to_vec(&untrained).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.path().join(SCALER_ARTIFACT),
            serde_json::to_vec(&scaler).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            store.load(),
            Err(StoreError::ArtifactCorrupt { .. })
        ));
    }
}

//! Artifact adapter: Loads the trained scaler and classifier from disk.
//!
//! The training pipeline exports a single `artifacts.json`:
//!
//! ```json
//! {
//!   "feature_names": ["Pregnancies", "Glucose", ...],
//!   "scaler": { "mean": [...], "scale": [...] },
//!   "model": { "kind": "logistic_regression", "coefficients": [...], "intercept": -0.3 }
//! }
//! ```
//!
//! # Integrity
//!
//! - `manifest.json` records the SHA-256 of `artifacts.json`
//! - `artifacts.sig` is an Ed25519 signature over the raw manifest bytes
//! - Unsigned artifacts are refused unless explicitly allowed
//!   (`GLUCORISK_ALLOW_UNSIGNED_ARTIFACTS=true`)
//!
//! Create the manifest and signature with `cargo run --bin sign_artifacts`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::LogisticRegression;
use crate::domain::{NormalizationParameters, ScoringError};
use crate::ports::{ArtifactSource, TrainedArtifacts};

pub const ARTIFACTS_FILE: &str = "artifacts.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "artifacts.sig";

/// Current manifest layout.
pub const MANIFEST_VERSION: u32 = 1;

const ALLOW_UNSIGNED_ENV: &str = "GLUCORISK_ALLOW_UNSIGNED_ARTIFACTS";
const PUBKEY_FILE_ENV: &str = "GLUCORISK_ARTIFACT_PUBKEY_B64_FILE";

/// Errors raised while loading trained artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact format: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Signature verification failed: {0}")]
    Signature(String),

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Artifacts do not match the attribute schema: {0}")]
    Schema(#[from] ScoringError),
}

/// On-disk layout of `artifacts.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedArtifacts {
    pub feature_names: Vec<String>,
    pub scaler: ExportedScaler,
    pub model: ExportedModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Supported model families.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportedModel {
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

impl ExportedArtifacts {
    /// Convert into checked, immutable artifacts.
    ///
    /// # Errors
    /// Returns `ArtifactError::Schema` if the scaler or model disagree with the
    /// attribute schema or with each other.
    pub fn into_trained(self) -> Result<TrainedArtifacts, ArtifactError> {
        let scaler = NormalizationParameters {
            feature_names: self.feature_names,
            mean: self.scaler.mean,
            scale: self.scaler.scale,
        };
        scaler.check()?;

        let classifier = match self.model {
            ExportedModel::LogisticRegression {
                coefficients,
                intercept,
            } => LogisticRegression::new(coefficients, intercept)?,
        };

        if classifier.coefficients().len() != scaler.dim() {
            return Err(ScoringError::Configuration(format!(
                "Model has {} coefficients but scaler covers {} attributes",
                classifier.coefficients().len(),
                scaler.dim()
            ))
            .into());
        }

        Ok(TrainedArtifacts { scaler, classifier })
    }
}

/// Signed list of artifact file hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    /// Monotonic serial (e.g. CI build number)
    pub serial: u64,
    /// Unix timestamp (seconds) of signing
    pub created_at: i64,
    /// File name -> lowercase hex SHA-256
    pub files: BTreeMap<String, String>,
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{b:02x}")).collect()
}

// Constant-time compare for ASCII strings (hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn parse_bool_env(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

fn read(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a base64 Ed25519 verifying key.
///
/// # Errors
/// Returns `ArtifactError::Signature` if the key is malformed.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ArtifactError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| ArtifactError::Signature("Invalid public key base64".into()))?;
    let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        ArtifactError::Signature("Invalid public key length (expected 32 bytes)".into())
    })?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|_| ArtifactError::Signature("Invalid verifying key".into()))
}

/// Loads `artifacts.json` from a directory, verifying its signature.
#[derive(Debug, Clone)]
pub struct FileArtifactSource {
    dir: PathBuf,
    verifying_key: Option<VerifyingKey>,
    allow_unsigned: bool,
}

impl FileArtifactSource {
    /// Source for `dir`; unsigned loading follows `GLUCORISK_ALLOW_UNSIGNED_ARTIFACTS`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            verifying_key: None,
            allow_unsigned: parse_bool_env(ALLOW_UNSIGNED_ENV),
        }
    }

    /// Source configured from the environment (verifying key file included).
    ///
    /// # Errors
    /// Returns error if `GLUCORISK_ARTIFACT_PUBKEY_B64_FILE` is set but unreadable or invalid.
    pub fn from_env(dir: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let mut source = Self::new(dir);
        if let Ok(path) = std::env::var(PUBKEY_FILE_ENV) {
            let path = PathBuf::from(path.trim());
            let b64 = read(&path)?;
            source.verifying_key = Some(verifying_key_from_b64(&String::from_utf8_lossy(&b64))?);
        }
        Ok(source)
    }

    #[must_use]
    pub fn with_verifying_key(mut self, key: VerifyingKey) -> Self {
        self.verifying_key = Some(key);
        self
    }

    #[must_use]
    pub fn allow_unsigned(mut self, allow: bool) -> Self {
        self.allow_unsigned = allow;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read `artifacts.json`, checking it against the signed manifest.
    fn read_verified(&self) -> Result<Vec<u8>, ArtifactError> {
        let artifacts_path = self.dir.join(ARTIFACTS_FILE);
        let manifest_path = self.dir.join(MANIFEST_FILE);
        let sig_path = self.dir.join(SIGNATURE_FILE);

        match (manifest_path.exists(), sig_path.exists()) {
            (false, false) => {
                if !self.allow_unsigned {
                    tracing::error!(
                        "No signature found in {:?}. Set {ALLOW_UNSIGNED_ENV}=true to load unsigned artifacts.",
                        self.dir
                    );
                    return Err(ArtifactError::Signature(format!(
                        "Artifacts are unsigned. Set {ALLOW_UNSIGNED_ENV}=true to allow."
                    )));
                }
                tracing::warn!("Loading UNSIGNED artifacts from {:?}", self.dir);
                return read(&artifacts_path);
            }
            (true, false) | (false, true) => {
                return Err(ArtifactError::Signature(format!(
                    "{MANIFEST_FILE} and {SIGNATURE_FILE} must be present together"
                )));
            }
            (true, true) => {}
        }

        let key = self.verifying_key.as_ref().ok_or_else(|| {
            ArtifactError::Signature(format!(
                "Artifacts are signed but no verifying key is configured ({PUBKEY_FILE_ENV})"
            ))
        })?;

        let sig_bytes = read(&sig_path)?;
        let sig_bytes: [u8; 64] = sig_bytes.as_slice().try_into().map_err(|_| {
            ArtifactError::Signature("Invalid signature length (expected 64 bytes)".into())
        })?;
        let signature = Signature::from_bytes(&sig_bytes);

        let manifest_bytes = read(&manifest_path)?;
        key.verify(&manifest_bytes, &signature)
            .map_err(|_| ArtifactError::Signature("Invalid artifact signature".into()))?;

        let manifest: ArtifactManifest = serde_json::from_slice(&manifest_bytes)?;
        if manifest.version != MANIFEST_VERSION {
            return Err(ArtifactError::Integrity(format!(
                "Unsupported manifest version: {}",
                manifest.version
            )));
        }

        let expected = manifest.files.get(ARTIFACTS_FILE).ok_or_else(|| {
            ArtifactError::Integrity(format!("{MANIFEST_FILE} does not bind {ARTIFACTS_FILE}"))
        })?;

        let bytes = read(&artifacts_path)?;
        if !constant_time_eq_str(&sha256_hex(&bytes), &expected.to_ascii_lowercase()) {
            return Err(ArtifactError::Integrity(format!(
                "SHA-256 of {ARTIFACTS_FILE} does not match the manifest"
            )));
        }

        tracing::info!(
            "Artifact signature verified (serial={}, created_at={})",
            manifest.serial,
            manifest.created_at
        );
        Ok(bytes)
    }
}

impl ArtifactSource for FileArtifactSource {
    fn load(&self) -> Result<TrainedArtifacts, ArtifactError> {
        let bytes = self.read_verified()?;
        let exported: ExportedArtifacts = serde_json::from_slice(&bytes)?;
        let trained = exported.into_trained()?;

        tracing::info!(
            "Loaded artifacts from {:?} (n_features={})",
            self.dir,
            trained.scaler.dim()
        );
        Ok(trained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FEATURE_NAMES;
    use ed25519_dalek::{Signer, SigningKey};
    use tempfile::tempdir;

    fn exported(intercept: f64) -> ExportedArtifacts {
        ExportedArtifacts {
            feature_names: FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect(),
            scaler: ExportedScaler {
                mean: vec![3.8, 120.9, 69.1, 20.5, 79.8, 32.0, 0.47, 33.2],
                scale: vec![3.4, 32.0, 19.4, 16.0, 115.2, 7.9, 0.33, 11.8],
            },
            model: ExportedModel::LogisticRegression {
                coefficients: vec![0.4, 1.1, -0.25, 0.03, -0.14, 0.7, 0.3, 0.17],
                intercept,
            },
        }
    }

    fn write_artifacts(dir: &Path, artifacts: &ExportedArtifacts) -> Vec<u8> {
        let bytes = serde_json::to_vec_pretty(artifacts).expect("serialize artifacts");
        std::fs::write(dir.join(ARTIFACTS_FILE), &bytes).expect("write artifacts");
        bytes
    }

    fn write_signed_manifest(dir: &Path, signing_key: &SigningKey, artifacts: &[u8]) {
        let mut files = BTreeMap::new();
        files.insert(ARTIFACTS_FILE.to_string(), sha256_hex(artifacts));
        let manifest = ArtifactManifest {
            version: MANIFEST_VERSION,
            serial: 7,
            created_at: 1_760_000_000,
            files,
        };
        let manifest_bytes = serde_json::to_vec(&manifest).expect("serialize manifest");
        std::fs::write(dir.join(MANIFEST_FILE), &manifest_bytes).expect("write manifest");

        let signature: Signature = signing_key.sign(&manifest_bytes);
        std::fs::write(dir.join(SIGNATURE_FILE), signature.to_bytes()).expect("write signature");
    }

    fn signing_key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    #[test]
    fn test_unsigned_artifacts_refused_by_default() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), &exported(-0.3));

        let err = FileArtifactSource::new(temp.path())
            .allow_unsigned(false)
            .load()
            .expect_err("must fail closed");
        assert!(matches!(err, ArtifactError::Signature(_)));
    }

    #[test]
    fn test_unsigned_artifacts_load_when_allowed() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), &exported(-0.3));

        let trained = FileArtifactSource::new(temp.path())
            .allow_unsigned(true)
            .load()
            .expect("load unsigned");
        assert_eq!(trained.scaler.dim(), 8);
        assert!((trained.classifier.intercept() + 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_signed_artifacts_verify() {
        let temp = tempdir().expect("tempdir");
        let key = signing_key(11);
        let bytes = write_artifacts(temp.path(), &exported(-0.5));
        write_signed_manifest(temp.path(), &key, &bytes);

        let trained = FileArtifactSource::new(temp.path())
            .allow_unsigned(false)
            .with_verifying_key(key.verifying_key())
            .load()
            .expect("load signed");
        assert!((trained.classifier.intercept() + 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tampered_artifacts_fail_integrity() {
        let temp = tempdir().expect("tempdir");
        let key = signing_key(11);
        let bytes = write_artifacts(temp.path(), &exported(-0.5));
        write_signed_manifest(temp.path(), &key, &bytes);

        // Replace the model after signing.
        write_artifacts(temp.path(), &exported(4.0));

        let err = FileArtifactSource::new(temp.path())
            .with_verifying_key(key.verifying_key())
            .load()
            .expect_err("must detect tampering");
        assert!(matches!(err, ArtifactError::Integrity(_)));
    }

    #[test]
    fn test_wrong_key_fails_signature() {
        let temp = tempdir().expect("tempdir");
        let bytes = write_artifacts(temp.path(), &exported(-0.5));
        write_signed_manifest(temp.path(), &signing_key(11), &bytes);

        let err = FileArtifactSource::new(temp.path())
            .with_verifying_key(signing_key(12).verifying_key())
            .load()
            .expect_err("must reject foreign signature");
        assert!(matches!(err, ArtifactError::Signature(_)));
    }

    #[test]
    fn test_signed_artifacts_without_key_fail() {
        let temp = tempdir().expect("tempdir");
        let bytes = write_artifacts(temp.path(), &exported(-0.5));
        write_signed_manifest(temp.path(), &signing_key(11), &bytes);

        let err = FileArtifactSource::new(temp.path())
            .allow_unsigned(true)
            .load()
            .expect_err("signed artifacts need a key");
        assert!(matches!(err, ArtifactError::Signature(_)));
    }

    #[test]
    fn test_manifest_without_signature_fails() {
        let temp = tempdir().expect("tempdir");
        let bytes = write_artifacts(temp.path(), &exported(-0.5));
        write_signed_manifest(temp.path(), &signing_key(11), &bytes);
        std::fs::remove_file(temp.path().join(SIGNATURE_FILE)).expect("remove sig");

        let err = FileArtifactSource::new(temp.path())
            .allow_unsigned(true)
            .load()
            .expect_err("partial signing must fail");
        assert!(matches!(err, ArtifactError::Signature(_)));
    }

    #[test]
    fn test_zero_scale_is_schema_error() {
        let temp = tempdir().expect("tempdir");
        let mut artifacts = exported(-0.3);
        artifacts.scaler.scale[2] = 0.0;
        write_artifacts(temp.path(), &artifacts);

        let err = FileArtifactSource::new(temp.path())
            .allow_unsigned(true)
            .load()
            .expect_err("degenerate scale");
        assert!(matches!(
            err,
            ArtifactError::Schema(ScoringError::Configuration(_))
        ));
    }

    #[test]
    fn test_coefficient_count_must_match_scaler() {
        let mut artifacts = exported(-0.3);
        artifacts.model = ExportedModel::LogisticRegression {
            coefficients: vec![0.1; 7],
            intercept: 0.0,
        };
        assert!(matches!(
            artifacts.into_trained(),
            Err(ArtifactError::Schema(_))
        ));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = FileArtifactSource::new("/nonexistent/glucorisk-artifacts")
            .allow_unsigned(true)
            .load()
            .expect_err("no such dir");
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[test]
    fn test_bundled_artifacts_are_well_formed() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let trained = FileArtifactSource::new(dir)
            .allow_unsigned(true)
            .load()
            .expect("bundled artifacts");
        assert_eq!(trained.scaler.feature_names, FEATURE_NAMES.to_vec());
    }

    #[test]
    fn test_verifying_key_from_b64() {
        let key = signing_key(3).verifying_key();
        let b64 = base64::engine::general_purpose::STANDARD.encode(key.to_bytes());
        assert_eq!(verifying_key_from_b64(&format!("{b64}\n")).unwrap(), key);
        assert!(verifying_key_from_b64("not base64!").is_err());
        assert!(verifying_key_from_b64("AAAA").is_err());
    }
}

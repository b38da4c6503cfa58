//! Artifact signing utility.
//!
//! Writes `manifest.json` (SHA-256 of `artifacts.json`, serial, timestamp) and
//! an Ed25519 signature over it (`artifacts.sig`). The loader verifies both
//! before trusting the scaler and classifier.
//!
//! # Usage
//!
//! ```bash
//! GLUCORISK_SIGNING_KEY_B64_FILE=/path/to/seed.b64 \
//!     cargo run --bin sign_artifacts -- models [--serial <n>]
//! ```
//!
//! The seed file holds 32 random bytes, base64 encoded. It is wiped from
//! memory after use.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use clap::Parser;
use ed25519_dalek::{Signature, Signer, SigningKey};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use glucorisk::adapters::artifacts::{
    sha256_hex, ArtifactManifest, ARTIFACTS_FILE, MANIFEST_FILE, MANIFEST_VERSION,
    SIGNATURE_FILE,
};

const KEY_FILE_ENV: &str = "GLUCORISK_SIGNING_KEY_B64_FILE";

#[derive(Parser)]
#[command(name = "sign_artifacts")]
#[command(about = "Sign trained artifacts for glucorisk", long_about = None)]
struct Cli {
    /// Directory containing artifacts.json
    dir: PathBuf,

    /// Monotonic serial number (defaults to the current unix time)
    #[arg(long)]
    serial: Option<u64>,
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

fn read_signing_seed() -> Result<Seed> {
    let path = std::env::var(KEY_FILE_ENV)
        .with_context(|| format!("{KEY_FILE_ENV} must point to a base64 signing seed"))?;
    let content = Zeroizing::new(
        fs::read_to_string(path.trim()).context("failed reading signing key file")?,
    );

    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(content.trim())
            .context("invalid base64 in signing key")?,
    );
    if raw.len() != 32 {
        bail!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        );
    }

    let mut seed = Seed([0u8; 32]);
    seed.0.copy_from_slice(&raw);
    Ok(seed)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let artifacts_path = cli.dir.join(ARTIFACTS_FILE);
    let artifacts = fs::read(&artifacts_path)
        .with_context(|| format!("failed to read {}", artifacts_path.display()))?;

    let seed = read_signing_seed()?;
    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let mut files = BTreeMap::new();
    files.insert(ARTIFACTS_FILE.to_string(), sha256_hex(&artifacts));

    let created_at = unix_now();
    let manifest = ArtifactManifest {
        version: MANIFEST_VERSION,
        serial: cli.serial.unwrap_or(created_at.max(1) as u64),
        created_at,
        files,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;

    let manifest_path = cli.dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;

    let sig: Signature = signing_key.sign(&manifest_bytes);
    let sig_path = cli.dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, sig.to_bytes())
        .with_context(|| format!("failed to write {}", sig_path.display()))?;

    println!("Signed manifest: {}", manifest_path.display());
    println!("Wrote signature: {}", sig_path.display());
    println!(
        "Verifying key (base64, for GLUCORISK_ARTIFACT_PUBKEY_B64_FILE): {}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );

    Ok(())
}

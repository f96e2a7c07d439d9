//! Oracle Keystore
//!
//! File-based credential persistence with platform-aware paths. A key file holds
//! the hex-encoded 32-byte ed25519 secret of the submitting account.

use std::fs;
use std::path::{Path, PathBuf};

use oracle_crypto::SigningKeypair;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum KeystoreError {
    #[error("Failed to read key file: {0}")]
    ReadError(String),
    #[error("Failed to write key file: {0}")]
    WriteError(String),
    #[error("Invalid key format: {0}")]
    InvalidFormat(String),
    #[error("Failed to create directory: {0}")]
    CreateDirError(String),
}

pub type Result<T> = std::result::Result<T, KeystoreError>;

/// Load the keypair stored at `path`.
pub fn load_keypair(path: &Path) -> Result<SigningKeypair> {
    debug!("Loading keypair from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| KeystoreError::ReadError(e.to_string()))?;
    let bytes = hex::decode(content.trim())
        .map_err(|e| KeystoreError::InvalidFormat(e.to_string()))?;
    let secret: [u8; 32] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| KeystoreError::InvalidFormat(format!("expected 32 bytes, got {}", b.len())))?;
    Ok(SigningKeypair::from_secret_bytes(&secret))
}

/// Load the keypair at `path`, generating and saving a new one if it does not exist.
pub fn load_or_generate_keypair(path: &Path) -> Result<SigningKeypair> {
    if path.exists() {
        return load_keypair(path);
    }
    let keypair = SigningKeypair::generate();
    info!("Generated account {} at {}", keypair.address(), path.display());
    save_keypair(path, &keypair)?;
    Ok(keypair)
}

/// Save a keypair's secret, creating parent directories as needed.
pub fn save_keypair(path: &Path, keypair: &SigningKeypair) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| KeystoreError::CreateDirError(e.to_string()))?;
    }
    fs::write(path, hex::encode(keypair.secret_key_bytes()))
        .map_err(|e| KeystoreError::WriteError(e.to_string()))
}

/// Default config directory for a service.
///
/// - macOS: `~/Library/Application Support/{Service}`
/// - Linux: `$XDG_CONFIG_HOME/{service}` or `~/.config/{service}`
/// - Windows: `%APPDATA%\{Service}`
pub fn default_config_dir_for(service: &str) -> PathBuf {
    platform_dir(service, "XDG_CONFIG_HOME", &[".config"])
}

/// Default data directory for a service.
pub fn data_dir(service: &str) -> PathBuf {
    platform_dir(service, "XDG_DATA_HOME", &[".local", "share"])
}

/// Default keystore directory: `{data_dir}/keys`.
pub fn default_keystore_dir_for(service: &str) -> PathBuf {
    data_dir(service).join("keys")
}

/// Default key file: `{data_dir}/keys/account.key`.
pub fn default_key_path_for(service: &str) -> PathBuf {
    default_keystore_dir_for(service).join("account.key")
}

#[cfg(target_os = "linux")]
fn platform_dir(service: &str, xdg_var: &str, fallback: &[&str]) -> PathBuf {
    let base = std::env::var(xdg_var).map(PathBuf::from).unwrap_or_else(|_| {
        fallback
            .iter()
            .fold(home_dir(), |path, segment| path.join(segment))
    });
    base.join(service.to_lowercase())
}

#[cfg(target_os = "macos")]
fn platform_dir(service: &str, _xdg_var: &str, _fallback: &[&str]) -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join(capitalize(service))
}

#[cfg(target_os = "windows")]
fn platform_dir(service: &str, _xdg_var: &str, _fallback: &[&str]) -> PathBuf {
    let appdata = std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"));
    appdata.join(capitalize(service))
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn platform_dir(service: &str, _xdg_var: &str, _fallback: &[&str]) -> PathBuf {
    home_dir().join(format!(".{}", service.to_lowercase()))
}

fn home_dir() -> PathBuf {
    let var = if cfg!(target_os = "windows") { "USERPROFILE" } else { "HOME" };
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir())
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
    }
}

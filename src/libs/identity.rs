//! Identifier strategies for the telemetry profile.
//!
//! Two interchangeable sources exist. [`RandomIdentifier`] is what gets persisted once
//! a profile file exists. [`HostIdentifier`] is only used when no home directory is
//! available and a report needs an identifier that is stable for this machine
//! without writing anything to disk.

use sha2::{Digest, Sha256};
use std::env;
use std::fs;
use uuid::Uuid;

/// Produces a new identifier each time it is asked.
pub trait IdentifierSource {
    fn generate(&self) -> String;
}

/// 128-bit random token (UUID v4).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdentifier;

impl IdentifierSource for RandomIdentifier {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Token derived from facts about the host: hostname, home directory, OS and
/// architecture. The same machine and user always get the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostIdentifier;

impl HostIdentifier {
    fn hostname() -> Option<String> {
        ["HOSTNAME", "COMPUTERNAME"]
            .iter()
            .find_map(|var| env::var(var).ok())
            .or_else(|| fs::read_to_string("/etc/hostname").ok())
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    fn fingerprint() -> String {
        let home = dirs::home_dir()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        format!(
            "{}|{}|{}|{}",
            Self::hostname().unwrap_or_default(),
            home,
            env::consts::OS,
            env::consts::ARCH
        )
    }
}

impl IdentifierSource for HostIdentifier {
    fn generate(&self) -> String {
        let digest = Sha256::digest(Self::fingerprint().as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Uuid::from_bytes(bytes).to_string()
    }
}

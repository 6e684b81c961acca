//! Instance identifier generation
//!
//! Twelve symbols, each picked by masking one random byte with [`MASK`] and
//! indexing [`ALPHABET`]. Identifiers are probabilistically unique; a
//! collision surfaces as an ordinary duplicate-identity case for clone
//! detection to resolve.

use elemental_core::{Error, InstanceId, Result};
use ring::rand::{SecureRandom, SystemRandom};

pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const MASK: u8 = 0x3D;
pub const ID_LEN: usize = 12;

const _: () = assert!(ALPHABET.len() == MASK as usize + 1);

/// Source of random bytes for identifiers.
pub trait EntropySource: Send + Sync {
    /// Fill `dest` entirely or fail. Implementations must not degrade to a
    /// weaker generator on failure.
    fn fill(&self, dest: &mut [u8]) -> Result<()>;
}

/// Operating-system CSPRNG.
#[derive(Debug)]
pub struct SystemEntropy {
    rng: SystemRandom,
}

impl SystemEntropy {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for SystemEntropy {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for SystemEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        self.rng
            .fill(dest)
            .map_err(|_| Error::SourceUnavailable("system random source failed".into()))
    }
}

/// Draw a fresh identifier from `source`.
pub fn generate(source: &dyn EntropySource) -> Result<InstanceId> {
    let mut bytes = [0u8; ID_LEN];
    source.fill(&mut bytes)?;
    Ok(InstanceId::new(encode(&bytes)))
}

/// Map raw bytes onto the identifier alphabet.
pub fn encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| ALPHABET[(byte & MASK) as usize] as char)
        .collect()
}

pub fn is_well_formed(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| ALPHABET.contains(&b))
}

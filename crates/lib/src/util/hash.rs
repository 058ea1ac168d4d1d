//! Content hashing for resolved graphs.
//!
//! This module provides:
//! - `ObjectHash`: a truncated 20-character hash of a serialized value
//! - `Hashable`: blanket hashing of anything serializable to JSON
//!
//! Two pipeline runs over identical input must produce identical hashes; the
//! serialized form only contains ordered collections, so the JSON text is
//! stable.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::OBJ_HASH_PREFIX_LEN;

pub type HashError = serde_json::Error;

/// A content-addressed hash identifying a serialized value.
///
/// The hash is a 20-character truncated SHA-256 of the JSON-serialized value,
/// as a lowercase hexadecimal string, e.g., `"a1b2c3d4e5f6789012ab"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, HashError> {
    let serialized = serde_json::to_string(self)?;
    Ok(hash_bytes(serialized.as_bytes()))
  }
}

/// Hash arbitrary bytes into a truncated [`ObjectHash`].
pub fn hash_bytes(bytes: &[u8]) -> ObjectHash {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  let full = format!("{:x}", hasher.finalize());
  ObjectHash(full[..OBJ_HASH_PREFIX_LEN].to_string())
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;

  #[derive(Serialize)]
  struct Sample {
    entries: BTreeMap<String, Vec<String>>,
  }

  impl Hashable for Sample {}

  #[test]
  fn hash_is_truncated_hex() {
    let hash = hash_bytes(b"modgraph");
    assert_eq!(hash.0.len(), OBJ_HASH_PREFIX_LEN);
    assert!(hash.0.chars().all(|c| c.is_ascii_hexdigit()));
  }

  #[test]
  fn ordered_maps_hash_independently_of_insertion_order() {
    let mut a = BTreeMap::new();
    a.insert("x".to_string(), vec!["1".to_string()]);
    a.insert("y".to_string(), vec!["2".to_string()]);

    let mut b = BTreeMap::new();
    b.insert("y".to_string(), vec!["2".to_string()]);
    b.insert("x".to_string(), vec!["1".to_string()]);

    let ha = Sample { entries: a }.compute_hash().unwrap();
    let hb = Sample { entries: b }.compute_hash().unwrap();
    assert_eq!(ha, hb);
  }
}

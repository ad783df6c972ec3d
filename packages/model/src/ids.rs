use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generate a document ID from its name using CRC32
pub fn get_document_id(name: &str) -> String {
    let mut buff = String::from(name);
    if !name.starts_with("doc://") {
        buff = format!("doc://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stable identity of a tree node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sequential ID generator for nodes within a document
#[derive(Debug, Clone)]
pub struct NodeIdGenerator {
    seed: String, // Document ID (CRC32)
    count: u32,   // Sequential counter
}

impl NodeIdGenerator {
    pub fn new(name: &str) -> Self {
        Self {
            seed: get_document_id(name),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn next_id(&mut self) -> NodeId {
        self.count += 1;
        NodeId(format!("{}-{}", self.seed, self.count))
    }

    /// Get document ID seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_generation() {
        let id1 = get_document_id("notes");
        let id2 = get_document_id("notes");

        // Same name always generates same ID
        assert_eq!(id1, id2);

        // Different names generate different IDs
        let id3 = get_document_id("drafts");
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = NodeIdGenerator::new("notes");

        let id1 = gen.next_id();
        let id2 = gen.next_id();
        let id3 = gen.next_id();

        assert!(id1.as_str().ends_with("-1"));
        assert!(id2.as_str().ends_with("-2"));
        assert!(id3.as_str().ends_with("-3"));

        let seed = gen.seed().to_string();
        assert!(id1.as_str().starts_with(&seed));
        assert!(id3.as_str().starts_with(&seed));
    }
}

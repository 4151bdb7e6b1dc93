use super::EntityMetadata;
use serde::{Deserialize, Serialize};

/// Base aggregate with the fields every aggregate carries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseAggregate<Id> {
    /// Unique record identifier
    pub id: Id,
    /// Human-readable record name
    pub name: String,
    /// Lifecycle metadata
    pub metadata: EntityMetadata,
}

impl<Id> BaseAggregate<Id> {
    pub fn new(id: Id, name: String) -> Self {
        Self {
            id,
            name,
            metadata: EntityMetadata::new(),
        }
    }

    /// Build an aggregate with existing metadata (loading from the DB)
    pub fn with_metadata(id: Id, name: String, metadata: EntityMetadata) -> Self {
        Self { id, name, metadata }
    }

    pub fn touch(&mut self) {
        self.metadata.touch();
    }
}

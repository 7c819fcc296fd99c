//! Grouping of resource changes by resource type

use super::types::{ChangeIndex, TerraformChange};

/// Builds a [`ChangeIndex`], preserving first-seen type order
#[derive(Debug, Default)]
pub struct ChangeIndexer {
    buckets: Vec<(String, Vec<TerraformChange>)>,
}

impl ChangeIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type, creating an empty bucket on first sighting
    pub fn register(&mut self, resource_type: &str) {
        self.bucket_mut(resource_type);
    }

    /// Append a change to its type's bucket
    pub fn push(&mut self, resource_type: &str, change: TerraformChange) {
        self.bucket_mut(resource_type).push(change);
    }

    /// Drop empty buckets and hand out the index
    pub fn finish(mut self) -> ChangeIndex {
        self.buckets.retain(|(_, changes)| !changes.is_empty());
        ChangeIndex {
            buckets: self.buckets,
        }
    }

    fn bucket_mut(&mut self, resource_type: &str) -> &mut Vec<TerraformChange> {
        let position = match self.buckets.iter().position(|(ty, _)| ty == resource_type) {
            Some(position) => position,
            None => {
                self.buckets.push((resource_type.to_string(), Vec::new()));
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[position].1
    }
}

impl FromIterator<(String, TerraformChange)> for ChangeIndex {
    fn from_iter<I: IntoIterator<Item = (String, TerraformChange)>>(iter: I) -> Self {
        let mut indexer = ChangeIndexer::new();
        for (resource_type, change) in iter {
            indexer.push(&resource_type, change);
        }
        indexer.finish()
    }
}

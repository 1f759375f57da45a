//! Case-insensitive parameter-name index owned by a tree root

use crate::error::Result;
use crate::tree::model::Model;
use crate::tree::node::{NodeId, Slot};
use std::collections::HashMap;
use tracing::debug;

/// Maps lowercased parameter names to every `(owner, field)` pair in a tree.
///
/// The index lives in the data of the root it covers. Attaching a subtree
/// below the root merges the subtree's entries; detaching marks the index
/// stale so the next lookup rebuilds it.
#[derive(Debug, Clone, Default)]
pub struct GlobalIndex {
    entries: HashMap<String, Vec<(NodeId, String)>>,
    version: u64,
    stale: bool,
}

impl GlobalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `owner` carries a parameter named `field`.
    pub fn insert(&mut self, owner: NodeId, field: &str) {
        let bucket = self.entries.entry(field.to_lowercase()).or_default();
        if !bucket.iter().any(|(n, f)| *n == owner && f == field) {
            bucket.push((owner, field.to_string()));
        }
    }

    /// Every `(owner, field)` pair whose field matches `name` ignoring case.
    pub fn lookup(&self, name: &str) -> &[(NodeId, String)] {
        self.entries
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct lowercased names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of full rebuilds so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.stale = false;
        self.version += 1;
    }
}

impl Model {
    /// Rebuild the index of the tree containing `node` by a full walk.
    ///
    /// The index is stored on the root. Returns the new version.
    pub fn build_index(&mut self, node: NodeId) -> Result<u64> {
        let root = self.root(node)?;
        let mut index = self.node_mut(root)?.index.take().unwrap_or_default();
        index.reset();
        self.update_param_indices(root, &mut index)?;
        let version = index.version();
        debug!(root = ?root, names = index.len(), version, "rebuilt parameter index");
        self.node_mut(root)?.index = Some(index);
        Ok(version)
    }

    /// Mark the index of the tree containing `node` stale, if it has one.
    pub fn invalidate_index(&mut self, node: NodeId) -> Result<()> {
        let root = self.root(node)?;
        if let Some(index) = self.node_mut(root)?.index.as_mut() {
            index.mark_stale();
        }
        Ok(())
    }

    /// Remove the index of the tree containing `node`. Lookups fall back to
    /// scanning afterwards.
    pub fn drop_index(&mut self, node: NodeId) -> Result<()> {
        let root = self.root(node)?;
        self.node_mut(root)?.index = None;
        Ok(())
    }

    /// The index of the tree containing `node`, if one is built.
    pub fn index_of(&self, node: NodeId) -> Result<Option<&GlobalIndex>> {
        let root = self.root(node)?;
        Ok(self.node(root)?.index.as_ref())
    }

    /// Add every parameter and parameter-list name of the subtree at `node`
    /// to `index`. Refine sets are not indexed.
    pub fn update_param_indices(&self, node: NodeId, index: &mut GlobalIndex) -> Result<()> {
        let data = self.node(node)?;
        if data.is_refine_set() {
            return Ok(());
        }
        for (name, slot) in &data.slots {
            match slot {
                Slot::Param(_) | Slot::ParamList(_) => index.insert(node, name),
                Slot::Object(_) | Slot::ObjectList(_) => {}
            }
        }
        for child in data.children() {
            self.update_param_indices(child, index)?;
        }
        Ok(())
    }

    /// Merge a freshly attached subtree into its root's index.
    pub(crate) fn merge_into_index(&mut self, child: NodeId) -> Result<()> {
        if self.in_refine_set(child)? {
            return Ok(());
        }
        let root = self.root(child)?;
        let Some(mut index) = self.node_mut(root)?.index.take() else {
            return Ok(());
        };
        let merged = if index.is_stale() {
            Ok(())
        } else {
            self.update_param_indices(child, &mut index)
        };
        self.node_mut(root)?.index = Some(index);
        merged
    }

    /// The index of the tree containing `node`, rebuilt first if stale.
    pub(crate) fn fresh_index(&mut self, node: NodeId) -> Result<Option<&GlobalIndex>> {
        let root = self.root(node)?;
        let stale = match &self.node(root)?.index {
            None => return Ok(None),
            Some(index) => index.is_stale(),
        };
        if stale {
            self.build_index(root)?;
        }
        Ok(self.node(root)?.index.as_ref())
    }
}

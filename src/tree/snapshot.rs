//! Serializable copies of subtrees
//!
//! A snapshot records the kind, field values, children and constraint
//! settings of a subtree. Refine sets are not recorded: restoring a session
//! root gives it a fresh refine set, and restored constraints link into
//! whichever session the restored subtree ends up under.

use crate::error::{ModelError, Result};
use crate::refine::{Constraint, ConstraintState};
use crate::tree::model::Model;
use crate::tree::node::{NodeId, Slot};
use crate::tree::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

fn enabled() -> bool {
    true
}

/// The settings of one constraint in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSnapshot {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub formula: String,
    #[serde(default)]
    pub damping: f64,
    #[serde(default)]
    pub code_word: f64,
    #[serde(default = "enabled")]
    pub on: bool,
}

/// A serializable copy of a subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub param_lists: BTreeMap<String, Vec<Value>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub objects: BTreeMap<String, NodeSnapshot>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub object_lists: BTreeMap<String, Vec<NodeSnapshot>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintSnapshot>,
}

impl Model {
    /// Record the subtree at `node`.
    pub fn snapshot(&self, node: NodeId) -> Result<NodeSnapshot> {
        let data = self.node(node)?;
        let mut snapshot = NodeSnapshot {
            kind: data.schema.kind().to_string(),
            params: BTreeMap::new(),
            param_lists: BTreeMap::new(),
            objects: BTreeMap::new(),
            object_lists: BTreeMap::new(),
            constraints: Vec::new(),
        };

        for (name, slot) in &data.slots {
            match slot {
                Slot::Param(value) => {
                    snapshot.params.insert(name.clone(), value.clone());
                }
                Slot::ParamList(list) => {
                    snapshot.param_lists.insert(name.clone(), list.as_slice().to_vec());
                }
                Slot::Object(Some(child)) => {
                    if !self.node(*child)?.is_refine_set() {
                        snapshot.objects.insert(name.clone(), self.snapshot(*child)?);
                    }
                }
                Slot::Object(None) => {}
                Slot::ObjectList(list) => {
                    let children = list
                        .iter()
                        .map(|child| self.snapshot(*child))
                        .collect::<Result<Vec<_>>>()?;
                    snapshot.object_lists.insert(name.clone(), children);
                }
            }
        }

        for constraint in data.constraints.values() {
            let c = self.constraint(*constraint)?;
            if c.formula().is_empty() {
                continue;
            }
            let on = match c.state() {
                ConstraintState::Unlinked => c.enable_on_link,
                ConstraintState::Enabled => true,
                ConstraintState::Disabled => false,
            };
            snapshot.constraints.push(ConstraintSnapshot {
                field: c.parname().to_string(),
                index: c.index(),
                formula: c.formula().to_string(),
                damping: c.damping(),
                code_word: c.code_word(),
                on,
            });
        }

        Ok(snapshot)
    }

    /// Build a detached subtree from a snapshot.
    ///
    /// The constraints are linked as soon as a session is reachable, and
    /// otherwise wait until the subtree is attached under one. Nothing is
    /// left behind when restoring fails.
    pub fn restore(&mut self, snapshot: &NodeSnapshot) -> Result<NodeId> {
        let node = self.create(&snapshot.kind)?;
        if let Err(e) = self.fill_from_snapshot(node, snapshot) {
            self.destroy(node)?;
            return Err(e);
        }
        Ok(node)
    }

    fn fill_from_snapshot(&mut self, node: NodeId, snapshot: &NodeSnapshot) -> Result<()> {
        for (name, value) in &snapshot.params {
            self.set(node, name, value.clone(), None)?;
        }
        for (name, values) in &snapshot.param_lists {
            for value in values {
                self.set(node, name, value.clone(), None)?;
            }
        }
        for (name, child) in &snapshot.objects {
            let child = self.restore(child)?;
            self.attach_restored(node, name, child)?;
        }
        for (name, children) in &snapshot.object_lists {
            for child in children {
                let child = self.restore(child)?;
                self.attach_restored(node, name, child)?;
            }
        }

        let linkable = self.refine_set_of(node)?.is_some();
        for settings in &snapshot.constraints {
            let mut c = Constraint::new(node, &settings.field, settings.index);
            c.formula = settings.formula.clone();
            c.damping = settings.damping;
            c.code_word = settings.code_word;
            c.enable_on_link = settings.on;
            let constraint = self.insert_pending_constraint(node, c)?;
            if linkable {
                self.link_constraint(constraint)?;
            }
        }
        Ok(())
    }

    fn attach_restored(&mut self, node: NodeId, field: &str, child: NodeId) -> Result<()> {
        if let Err(e) = self.set(node, field, child, None) {
            self.destroy(child)?;
            return Err(e);
        }
        Ok(())
    }

    /// A deep copy of the subtree at `node` as a new detached subtree.
    ///
    /// Constraint settings are copied but only linked once the copy sits
    /// below a session.
    pub fn duplicate(&mut self, node: NodeId) -> Result<NodeId> {
        let snapshot = self.snapshot(node)?;
        let copy = self.restore(&snapshot)?;
        debug!(source = ?node, copy = ?copy, "duplicated subtree");
        Ok(copy)
    }

    /// Serialize the subtree at `node` to a JSON string
    ///
    /// # Returns
    ///
    /// The pretty-printed JSON, or an error if serialization failed
    pub fn to_json(&self, node: NodeId) -> Result<String> {
        let json = serde_json::to_string_pretty(&self.snapshot(node)?)?;
        Ok(json)
    }

    /// Build a detached subtree from a JSON string produced by [`Model::to_json`]
    pub fn from_json(&mut self, json: &str) -> Result<NodeId> {
        let snapshot: NodeSnapshot = serde_json::from_str(json)?;
        self.restore(&snapshot)
    }

    /// Save the subtree at `node` to a JSON file
    ///
    /// # Arguments
    ///
    /// * `node` - Root of the subtree to save
    /// * `path` - Path to the JSON file to create
    pub fn save_json<P: AsRef<Path>>(&self, node: NodeId, path: P) -> Result<()> {
        let snapshot = self.snapshot(node)?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &snapshot)?;
        Ok(())
    }

    /// Load a subtree from a JSON file written by [`Model::save_json`]
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON file to read
    ///
    /// # Returns
    ///
    /// The root of the new detached subtree, or an error if reading,
    /// parsing or restoring failed
    pub fn load_json<P: AsRef<Path>>(&mut self, path: P) -> Result<NodeId> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        self.from_json(&contents)
    }
}

impl NodeSnapshot {
    /// Find a direct child snapshot by field name and list position.
    pub fn child(&self, field: &str, index: Option<usize>) -> Result<&NodeSnapshot> {
        let found = match index {
            None => self.objects.get(field),
            Some(i) => self.object_lists.get(field).and_then(|list| list.get(i)),
        };
        found.ok_or_else(|| ModelError::FieldNotFound {
            kind: self.kind.clone(),
            field: field.to_string(),
        })
    }
}

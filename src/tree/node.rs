//! Node storage and the value types exchanged by node operations

use crate::arena::Handle;
use crate::refine::ConstraintId;
use crate::tree::bounded::BoundedList;
use crate::tree::global_index::GlobalIndex;
use crate::tree::schema::{FieldDescriptor, NodeSchema};
use crate::tree::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Marker for node handles.
#[derive(Debug)]
pub enum NodeTag {}

/// Handle to a node in a [`Model`](crate::tree::Model).
pub type NodeId = Handle<NodeTag>;

/// Storage of one declared field.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Param(Value),
    ParamList(BoundedList<Value>),
    Object(Option<NodeId>),
    ObjectList(BoundedList<NodeId>),
}

/// Extra bookkeeping carried by the built-in refinement kinds.
#[derive(Debug, Clone, Default)]
pub(crate) enum NodeRole {
    #[default]
    Plain,
    /// Every constraint registered with this refine set.
    RefineSet { constraints: Vec<ConstraintId> },
    /// Every constraint referencing this variable.
    Variable { constraints: Vec<ConstraintId> },
}

impl NodeRole {
    pub(crate) fn constraints(&self) -> &[ConstraintId] {
        match self {
            Self::Plain => &[],
            Self::RefineSet { constraints } | Self::Variable { constraints } => constraints,
        }
    }

    pub(crate) fn constraints_mut(&mut self) -> Option<&mut Vec<ConstraintId>> {
        match self {
            Self::Plain => None,
            Self::RefineSet { constraints } | Self::Variable { constraints } => Some(constraints),
        }
    }
}

/// Key of a constrained slot: field name plus position in a parameter list.
pub(crate) type SlotKey = (String, Option<usize>);

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub schema: Arc<NodeSchema>,
    pub slots: BTreeMap<String, Slot>,
    pub parent: Option<NodeId>,
    pub key: Option<String>,
    pub role: NodeRole,
    pub constraints: BTreeMap<SlotKey, ConstraintId>,
    /// Only ever present on a root.
    pub index: Option<GlobalIndex>,
}

impl NodeData {
    pub(crate) fn new(schema: Arc<NodeSchema>, role: NodeRole) -> Self {
        let slots = schema
            .fields()
            .map(|(name, field)| {
                let slot = match field {
                    FieldDescriptor::Param(info) => Slot::Param(info.default_value().clone()),
                    FieldDescriptor::ParamList(_, bounds) => {
                        Slot::ParamList(BoundedList::new(name, *bounds))
                    }
                    FieldDescriptor::Object(_) => Slot::Object(None),
                    FieldDescriptor::ObjectList(_, bounds) => {
                        Slot::ObjectList(BoundedList::new(name, *bounds))
                    }
                };
                (name.to_string(), slot)
            })
            .collect();

        Self {
            schema,
            slots,
            parent: None,
            key: None,
            role,
            constraints: BTreeMap::new(),
            index: None,
        }
    }

    /// Every child node held by this node, singleton fields first.
    pub(crate) fn children(&self) -> Vec<NodeId> {
        let mut children: Vec<NodeId> = self
            .slots
            .values()
            .filter_map(|slot| match slot {
                Slot::Object(child) => *child,
                _ => None,
            })
            .collect();
        for slot in self.slots.values() {
            if let Slot::ObjectList(list) = slot {
                children.extend(list.iter().copied());
            }
        }
        children
    }

    pub(crate) fn is_refine_set(&self) -> bool {
        matches!(self.role, NodeRole::RefineSet { .. })
    }
}

/// One element produced by a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Value(Value),
    Node(NodeId),
    /// An empty singleton child slot.
    Absent,
}

/// The result of [`Model::get`](crate::tree::Model::get) and
/// [`Model::get_by_path`](crate::tree::Model::get_by_path).
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    One(Entry),
    Many(Vec<Entry>),
}

impl Resolved {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::One(Entry::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::One(Entry::Node(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::One(Entry::Absent))
    }

    /// Every entry, in order.
    pub fn entries(&self) -> Vec<Entry> {
        match self {
            Self::One(e) => vec![e.clone()],
            Self::Many(es) => es.clone(),
        }
    }

    /// The value entries, in order.
    pub fn into_values(self) -> Vec<Value> {
        let entries = match self {
            Self::One(e) => vec![e],
            Self::Many(es) => es,
        };
        entries
            .into_iter()
            .filter_map(|e| match e {
                Entry::Value(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// The node entries, in order.
    pub fn into_nodes(self) -> Vec<NodeId> {
        let entries = match self {
            Self::One(e) => vec![e],
            Self::Many(es) => es,
        };
        entries
            .into_iter()
            .filter_map(|e| match e {
                Entry::Node(n) => Some(n),
                _ => None,
            })
            .collect()
    }
}

/// What to store in a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Assign {
    Value(Value),
    Node(NodeId),
}

impl From<Value> for Assign {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<NodeId> for Assign {
    fn from(n: NodeId) -> Self {
        Self::Node(n)
    }
}

impl From<f64> for Assign {
    fn from(v: f64) -> Self {
        Self::Value(v.into())
    }
}

impl From<i64> for Assign {
    fn from(v: i64) -> Self {
        Self::Value(v.into())
    }
}

impl From<i32> for Assign {
    fn from(v: i32) -> Self {
        Self::Value(v.into())
    }
}

impl From<bool> for Assign {
    fn from(v: bool) -> Self {
        Self::Value(v.into())
    }
}

impl From<&str> for Assign {
    fn from(v: &str) -> Self {
        Self::Value(v.into())
    }
}

impl From<String> for Assign {
    fn from(v: String) -> Self {
        Self::Value(v.into())
    }
}

/// The result of [`Model::locate_parameter`](crate::tree::Model::locate_parameter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// Nothing matched; carries the queried name.
    NotFound(String),
    /// Exactly one owner and its field name.
    One(NodeId, String),
    /// Parallel lists of owners and field names.
    Many(Vec<NodeId>, Vec<String>),
}

impl Located {
    pub fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }

    /// Every match as `(owner, field)` pairs.
    pub fn pairs(&self) -> Vec<(NodeId, String)> {
        match self {
            Self::NotFound(_) => Vec::new(),
            Self::One(n, f) => vec![(*n, f.clone())],
            Self::Many(ns, fs) => ns.iter().copied().zip(fs.iter().cloned()).collect(),
        }
    }
}

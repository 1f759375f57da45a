//! The owning container for nodes, schemas and constraints
//!
//! Every node lives in [`Model`]'s arena and is addressed by a [`NodeId`].
//! The container slot of a parent is the only owner of a child; the child's
//! `parent` is a plain back-reference. Detaching a node clears it and turns
//! it into a root that stays alive until [`Model::destroy`] frees it.

use crate::arena::Arena;
use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::refine::variable::field as var_field;
use crate::refine::{self, Constraint, ConstraintTag, REFINE_SET_KIND, VARIABLE_KIND};
use crate::tree::index::ListIndex;
use crate::tree::node::{Assign, Entry, Located, NodeData, NodeId, NodeRole, NodeTag, Resolved, Slot};
use crate::tree::path::{join_path, parse_path, PathSegment};
use crate::tree::schema::{FieldDescriptor, NodeSchema};
use crate::tree::value::Value;
use crate::tree::BoundedList;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Messages collected by [`Model::validation_report`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub messages: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Owns every node tree, the registered schemas and the constraint graph.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) nodes: Arena<NodeTag, NodeData>,
    pub(crate) constraints: Arena<ConstraintTag, Constraint>,
    schemas: HashMap<String, Arc<NodeSchema>>,
    config: ModelConfig,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create an empty model with the default configuration.
    ///
    /// The built-in `RefineSet` and `Variable` kinds are always registered.
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    pub fn with_config(config: ModelConfig) -> Self {
        let mut model = Self {
            nodes: Arena::new(),
            constraints: Arena::new(),
            schemas: HashMap::new(),
            config,
        };
        for schema in refine::builtin_schemas() {
            model
                .schemas
                .insert(schema.kind().to_string(), Arc::new(schema));
        }
        model
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Register a node kind. Registering a kind again replaces its schema for
    /// nodes created afterwards.
    pub fn register(&mut self, schema: NodeSchema) -> Result<()> {
        let kind = schema.kind().to_string();
        if kind == REFINE_SET_KIND || kind == VARIABLE_KIND {
            return Err(ModelError::InvalidSchema {
                kind,
                message: "the kind is built in".to_string(),
            });
        }
        debug!(kind = %kind, fields = schema.fields().count(), "registered schema");
        self.schemas.insert(kind, Arc::new(schema));
        Ok(())
    }

    pub fn schema(&self, kind: &str) -> Option<&NodeSchema> {
        self.schemas.get(kind).map(Arc::as_ref)
    }

    /// Number of live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node)
    }

    pub(crate) fn node(&self, node: NodeId) -> Result<&NodeData> {
        self.nodes.get(node).ok_or(ModelError::StaleNode)
    }

    pub(crate) fn node_mut(&mut self, node: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(node).ok_or(ModelError::StaleNode)
    }

    /// Create a detached node of a registered kind with every field at its
    /// default.
    ///
    /// A refinement-session root gets a fresh refine set in its session field
    /// and, when configured, a parameter index.
    pub fn create(&mut self, kind: &str) -> Result<NodeId> {
        let schema = self
            .schemas
            .get(kind)
            .cloned()
            .ok_or_else(|| ModelError::UnknownKind {
                kind: kind.to_string(),
            })?;
        let role = match kind {
            REFINE_SET_KIND => NodeRole::RefineSet {
                constraints: Vec::new(),
            },
            VARIABLE_KIND => NodeRole::Variable {
                constraints: Vec::new(),
            },
            _ => NodeRole::Plain,
        };
        let session = schema.session_field().map(str::to_string);
        let node = self.nodes.insert(NodeData::new(schema, role));

        if let Some(field) = session {
            let refine_set = self.create(REFINE_SET_KIND)?;
            self.set(node, &field, refine_set, None)?;
            if self.config.index_sessions {
                self.build_index(node)?;
            }
        }
        debug!(kind, node = ?node, "created node");
        Ok(node)
    }

    /// Free a detached node and its whole subtree.
    pub fn destroy(&mut self, node: NodeId) -> Result<()> {
        if self.node(node)?.parent.is_some() {
            return Err(ModelError::AlreadyAttached {
                node: self.describe(node),
            });
        }
        let subtree = self.subtree(node)?;
        for &member in &subtree {
            // variables can already be gone once their last constraint is cleared
            if !self.contains(member) {
                continue;
            }
            self.release_node_constraints(member)?;
        }
        for member in &subtree {
            self.nodes.remove(*member);
        }
        debug!(node = ?node, freed = subtree.len(), "destroyed subtree");
        Ok(())
    }

    /// The node and all of its descendants, parents before children.
    pub fn subtree(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut out = vec![node];
        let mut i = 0;
        while i < out.len() {
            let children = self.node(out[i])?.children();
            out.extend(children);
            i += 1;
        }
        Ok(out)
    }

    pub fn kind(&self, node: NodeId) -> Result<&str> {
        Ok(self.node(node)?.schema.kind())
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(node)?.parent)
    }

    /// The field name under which the node is stored in its parent.
    pub fn key(&self, node: NodeId) -> Result<Option<&str>> {
        Ok(self.node(node)?.key.as_deref())
    }

    /// The node's name relative to its parent: the key, with `[i]` appended
    /// for a member of a child list. Empty for a root.
    pub fn name(&self, node: NodeId) -> Result<String> {
        let data = self.node(node)?;
        let (Some(parent), Some(key)) = (data.parent, data.key.as_deref()) else {
            return Ok(String::new());
        };
        match self.node(parent)?.slots.get(key) {
            Some(Slot::ObjectList(list)) => match list.position_of(&node) {
                Some(i) => Ok(format!("{}[{}]", key, i)),
                None => Ok(key.to_string()),
            },
            _ => Ok(key.to_string()),
        }
    }

    /// The `.`-joined names from the root down to the node.
    ///
    /// `get_by_path(root, path(node))` resolves back to `node`.
    pub fn path(&self, node: NodeId) -> Result<String> {
        let mut names = Vec::new();
        let mut current = node;
        while let Some(parent) = self.node(current)?.parent {
            names.push(self.name(current)?);
            current = parent;
        }
        names.reverse();
        Ok(names.join("."))
    }

    pub fn root(&self, node: NodeId) -> Result<NodeId> {
        let mut current = node;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// True when `ancestor` is `node` itself or lies on its parent chain.
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> Result<bool> {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return Ok(true);
            }
            current = self.node(n)?.parent;
        }
        Ok(false)
    }

    /// True when the node is a refine set or sits below one.
    pub(crate) fn in_refine_set(&self, node: NodeId) -> Result<bool> {
        let mut current = Some(node);
        while let Some(n) = current {
            let data = self.node(n)?;
            if data.is_refine_set() {
                return Ok(true);
            }
            current = data.parent;
        }
        Ok(false)
    }

    /// A readable label for error messages.
    pub(crate) fn describe(&self, node: NodeId) -> String {
        match (self.path(node), self.kind(node)) {
            (Ok(path), _) if !path.is_empty() => path,
            (_, Ok(kind)) => kind.to_string(),
            _ => format!("{:?}", node),
        }
    }

    fn field_not_found(data: &NodeData, field: &str) -> ModelError {
        ModelError::FieldNotFound {
            kind: data.schema.kind().to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn descriptor(&self, node: NodeId, field: &str) -> Result<FieldDescriptor> {
        let data = self.node(node)?;
        data.schema
            .field(field)
            .cloned()
            .ok_or_else(|| Self::field_not_found(data, field))
    }

    /// Read a field.
    ///
    /// Scalars and singleton children come back as [`Resolved::One`]. List
    /// fields give [`Resolved::Many`] for `None` and multi-member indices,
    /// and [`Resolved::One`] for a single position or identity.
    pub fn get(&self, node: NodeId, field: &str, index: Option<ListIndex>) -> Result<Resolved> {
        let data = self.node(node)?;
        let slot = data
            .slots
            .get(field)
            .ok_or_else(|| Self::field_not_found(data, field))?;

        match slot {
            Slot::Param(value) => {
                reject_index(field, &index)?;
                Ok(Resolved::One(Entry::Value(value.clone())))
            }
            Slot::Object(child) => {
                reject_index(field, &index)?;
                Ok(Resolved::One(child.map_or(Entry::Absent, Entry::Node)))
            }
            Slot::ParamList(list) => match index {
                None => Ok(Resolved::Many(
                    list.iter().cloned().map(Entry::Value).collect(),
                )),
                Some(ListIndex::ByIdentity(_)) => Err(identity_on_values(field)),
                Some(i) if !i.is_multiple() => Ok(Resolved::One(
                    list.select(&i)?
                        .into_iter()
                        .next()
                        .map_or(Entry::Absent, Entry::Value),
                )),
                Some(i) => Ok(Resolved::Many(
                    list.select(&i)?.into_iter().map(Entry::Value).collect(),
                )),
            },
            Slot::ObjectList(list) => match index {
                None => Ok(Resolved::Many(
                    list.iter().copied().map(Entry::Node).collect(),
                )),
                Some(i) if !i.is_multiple() => Ok(Resolved::One(
                    list.select(&i)?
                        .into_iter()
                        .next()
                        .map_or(Entry::Absent, Entry::Node),
                )),
                Some(i) => Ok(Resolved::Many(
                    list.select(&i)?.into_iter().map(Entry::Node).collect(),
                )),
            },
        }
    }

    /// Write a field.
    ///
    /// Scalars are converted by their declared type. Assigning a child node
    /// detaches whatever it replaces; a list field appends when `index` is
    /// `None` and replaces the selected members otherwise. The attached
    /// subtree joins the root's parameter index and, when a refinement
    /// session is reachable, its pending constraints are linked.
    pub fn set(
        &mut self,
        node: NodeId,
        field: &str,
        value: impl Into<Assign>,
        index: Option<ListIndex>,
    ) -> Result<()> {
        let value = value.into();
        match self.descriptor(node, field)? {
            FieldDescriptor::Param(info) => {
                reject_index(field, &index)?;
                let converted = info.convert(field, &expect_value(field, value)?)?;
                if let Some(Slot::Param(slot)) = self.node_mut(node)?.slots.get_mut(field) {
                    *slot = converted;
                }
                self.after_param_set(node, field)
            }

            FieldDescriptor::ParamList(info, _) => {
                if matches!(index, Some(ListIndex::ByIdentity(_))) {
                    return Err(identity_on_values(field));
                }
                let converted = info.convert(field, &expect_value(field, value)?)?;
                self.param_list_mut(node, field)?
                    .insert(converted, index.as_ref())?;
                Ok(())
            }

            FieldDescriptor::Object(info) => {
                reject_index(field, &index)?;
                let child = expect_node(field, value)?;
                let current = match self.node(node)?.slots.get(field) {
                    Some(Slot::Object(current)) => *current,
                    _ => None,
                };
                if current == Some(child) {
                    return Ok(());
                }
                self.check_attachable(node, child)?;
                info.check(field, &self.node(child)?.schema)?;

                if let Some(old) = current {
                    self.release(old)?;
                }
                if let Some(Slot::Object(slot)) = self.node_mut(node)?.slots.get_mut(field) {
                    *slot = Some(child);
                }
                self.adopt(node, child, field)
            }

            FieldDescriptor::ObjectList(info, _) => {
                let child = expect_node(field, value)?;
                let Some(index) = index else {
                    self.check_attachable(node, child)?;
                    info.check(field, &self.node(child)?.schema)?;
                    self.object_list_mut(node, field)?.insert(child, None)?;
                    return self.adopt(node, child, field);
                };

                let positions = self.object_list(node, field)?.resolve(&index)?;
                if positions.len() > 1 {
                    return Err(ModelError::AlreadyAttached {
                        node: self.describe(child),
                    });
                }
                let Some(&position) = positions.first() else {
                    return Ok(());
                };
                if self.object_list(node, field)?.at(position) == Some(&child) {
                    return Ok(());
                }
                self.check_attachable(node, child)?;
                info.check(field, &self.node(child)?.schema)?;

                let replaced = self
                    .object_list_mut(node, field)?
                    .insert(child, Some(&ListIndex::from(position)))?;
                for old in replaced {
                    self.release(old)?;
                }
                self.adopt(node, child, field)
            }
        }
    }

    /// A scalar parameter's value.
    pub fn get_value(&self, node: NodeId, field: &str) -> Result<Value> {
        match self.get(node, field, None)? {
            Resolved::One(Entry::Value(value)) => Ok(value),
            _ => Err(ModelError::WrongIndexKind {
                field: field.to_string(),
                message: "not a scalar parameter".to_string(),
            }),
        }
    }

    /// A scalar parameter's value as a float.
    pub fn get_f64(&self, node: NodeId, field: &str) -> Result<f64> {
        let value = self.get_value(node, field)?;
        value.as_f64().ok_or_else(|| ModelError::TypeConversion {
            field: field.to_string(),
            message: format!("'{}' is not numeric", value),
        })
    }

    pub fn set_value(&mut self, node: NodeId, field: &str, value: impl Into<Value>) -> Result<()> {
        self.set(node, field, Assign::Value(value.into()), None)
    }

    /// The child in a singleton field, or the selected member of a child list.
    pub fn get_node(
        &self,
        node: NodeId,
        field: &str,
        index: Option<ListIndex>,
    ) -> Result<Option<NodeId>> {
        Ok(self.get(node, field, index)?.as_node())
    }

    /// Members of a child list, in order.
    pub fn children(&self, node: NodeId, field: &str) -> Result<Vec<NodeId>> {
        Ok(self.object_list(node, field)?.as_slice().to_vec())
    }

    /// Values of a parameter list, in order.
    pub fn param_values(&self, node: NodeId, field: &str) -> Result<Vec<Value>> {
        Ok(self.get(node, field, None)?.into_values())
    }

    /// Current length of a list field.
    pub fn list_len(&self, node: NodeId, field: &str) -> Result<usize> {
        let data = self.node(node)?;
        match data.slots.get(field) {
            Some(Slot::ParamList(list)) => Ok(list.len()),
            Some(Slot::ObjectList(list)) => Ok(list.len()),
            Some(_) => Err(not_a_list(field)),
            None => Err(Self::field_not_found(data, field)),
        }
    }

    pub(crate) fn param_list(&self, node: NodeId, field: &str) -> Result<&BoundedList<Value>> {
        let data = self.node(node)?;
        match data.slots.get(field) {
            Some(Slot::ParamList(list)) => Ok(list),
            Some(_) => Err(not_a_list(field)),
            None => Err(Self::field_not_found(data, field)),
        }
    }

    fn param_list_mut(&mut self, node: NodeId, field: &str) -> Result<&mut BoundedList<Value>> {
        let data = self.node_mut(node)?;
        let kind = data.schema.kind().to_string();
        match data.slots.get_mut(field) {
            Some(Slot::ParamList(list)) => Ok(list),
            Some(_) => Err(not_a_list(field)),
            None => Err(ModelError::FieldNotFound {
                kind,
                field: field.to_string(),
            }),
        }
    }

    pub(crate) fn object_list(&self, node: NodeId, field: &str) -> Result<&BoundedList<NodeId>> {
        let data = self.node(node)?;
        match data.slots.get(field) {
            Some(Slot::ObjectList(list)) => Ok(list),
            Some(_) => Err(not_a_list(field)),
            None => Err(Self::field_not_found(data, field)),
        }
    }

    fn object_list_mut(&mut self, node: NodeId, field: &str) -> Result<&mut BoundedList<NodeId>> {
        let data = self.node_mut(node)?;
        let kind = data.schema.kind().to_string();
        match data.slots.get_mut(field) {
            Some(Slot::ObjectList(list)) => Ok(list),
            Some(_) => Err(not_a_list(field)),
            None => Err(ModelError::FieldNotFound {
                kind,
                field: field.to_string(),
            }),
        }
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.node(child)?.parent.is_some() {
            return Err(ModelError::AlreadyAttached {
                node: self.describe(child),
            });
        }
        if self.root(parent)? == child {
            return Err(ModelError::WouldCreateCycle);
        }
        Ok(())
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId, field: &str) -> Result<()> {
        {
            let data = self.node_mut(child)?;
            data.parent = Some(parent);
            data.key = Some(field.to_string());
            data.index = None;
        }
        self.merge_into_index(child)?;
        if !self.in_refine_set(child)? && self.refine_set_of(child)?.is_some() {
            self.link_constraints(child)?;
        }
        debug!(parent = ?parent, child = ?child, field, "attached node");
        Ok(())
    }

    /// Clear a child that has just lost its slot and turn it into a root.
    pub(crate) fn release(&mut self, child: NodeId) -> Result<()> {
        if !self.in_refine_set(child)? {
            self.invalidate_index(child)?;
        }
        self.clear(child)?;
        let data = self.node_mut(child)?;
        data.parent = None;
        data.key = None;
        debug!(node = ?child, "detached node");
        Ok(())
    }

    fn after_param_set(&mut self, node: NodeId, field: &str) -> Result<()> {
        if !matches!(self.node(node)?.role, NodeRole::Variable { .. }) {
            return Ok(());
        }
        let flag = match field {
            var_field::MIN => var_field::USE_MIN,
            var_field::MAX => var_field::USE_MAX,
            _ => return Ok(()),
        };
        if let Some(Slot::Param(slot)) = self.node_mut(node)?.slots.get_mut(flag) {
            *slot = Value::Bool(true);
        }
        Ok(())
    }

    /// Empty every child slot and list and clear the node's constraints.
    ///
    /// Released children are cleared recursively and become roots. Scalar
    /// parameters keep their values.
    pub fn clear(&mut self, node: NodeId) -> Result<()> {
        self.release_node_constraints(node)?;

        let mut released = Vec::new();
        for slot in self.node_mut(node)?.slots.values_mut() {
            match slot {
                Slot::Object(child) => released.extend(child.take()),
                Slot::ObjectList(list) => released.extend(list.drain()),
                Slot::ParamList(list) => {
                    list.drain();
                }
                Slot::Param(_) => {}
            }
        }
        for child in released {
            self.release(child)?;
        }
        Ok(())
    }

    /// Remove the content of a field.
    ///
    /// A scalar returns to its default and a singleton child is detached.
    /// For lists, `index` selects the members to remove (`None` removes all).
    /// Constraints on removed parameter-list positions are removed and those
    /// on later positions follow their values.
    pub fn delete(&mut self, node: NodeId, field: &str, index: Option<ListIndex>) -> Result<()> {
        match self.descriptor(node, field)? {
            FieldDescriptor::Param(info) => {
                reject_index(field, &index)?;
                if let Some(Slot::Param(slot)) = self.node_mut(node)?.slots.get_mut(field) {
                    *slot = info.default_value().clone();
                }
                Ok(())
            }
            FieldDescriptor::Object(_) => {
                reject_index(field, &index)?;
                let old = match self.node_mut(node)?.slots.get_mut(field) {
                    Some(Slot::Object(slot)) => slot.take(),
                    _ => None,
                };
                match old {
                    Some(child) => self.release(child),
                    None => Ok(()),
                }
            }
            FieldDescriptor::ParamList(..) => {
                if matches!(index, Some(ListIndex::ByIdentity(_))) {
                    return Err(identity_on_values(field));
                }
                let removed = self
                    .param_list_mut(node, field)?
                    .remove(&index.unwrap_or(ListIndex::All))?;
                let positions: Vec<usize> = removed.into_iter().map(|(i, _)| i).collect();
                self.rekey_after_removal(node, field, &positions)
            }
            FieldDescriptor::ObjectList(..) => {
                let removed = self
                    .object_list_mut(node, field)?
                    .remove(&index.unwrap_or(ListIndex::All))?;
                for (_, child) in removed {
                    self.release(child)?;
                }
                Ok(())
            }
        }
    }

    /// Resolve a path relative to `node`.
    ///
    /// The empty path resolves to the node itself. A range segment broadcasts
    /// the rest of the path over each selected member and the results are
    /// flattened into one [`Resolved::Many`].
    pub fn get_by_path(&self, node: NodeId, path: &str) -> Result<Resolved> {
        let segments = parse_path(path)?;
        trace!(path, "resolving path");
        self.resolve_segments(node, &segments)
    }

    /// Assign through a path. Every owner selected by the leading segments
    /// receives the value.
    pub fn set_by_path(&mut self, node: NodeId, path: &str, value: impl Into<Assign>) -> Result<()> {
        let value = value.into();
        let segments = parse_path(path)?;
        let Some((last, prefix)) = segments.split_last() else {
            return Err(ModelError::EmptyPath);
        };
        let owners = self.owners_of(node, prefix)?;
        if let Assign::Node(child) = &value {
            if owners.len() > 1 {
                return Err(ModelError::AlreadyAttached {
                    node: self.describe(*child),
                });
            }
        }
        trace!(path, owners = owners.len(), "assigning through path");
        for owner in owners {
            self.set(owner, &last.name, value.clone(), last.index)?;
        }
        Ok(())
    }

    fn resolve_segments(&self, node: NodeId, segments: &[PathSegment]) -> Result<Resolved> {
        let Some((first, rest)) = segments.split_first() else {
            return Ok(Resolved::One(Entry::Node(node)));
        };
        let got = self.get(node, &first.name, first.index)?;
        if rest.is_empty() {
            return Ok(got);
        }

        match got {
            Resolved::One(Entry::Node(child)) => self.resolve_segments(child, rest),
            Resolved::One(_) => Err(self.not_descendable(node, segments)),
            Resolved::Many(entries) => {
                let mut flat = Vec::new();
                for entry in entries {
                    let Entry::Node(child) = entry else {
                        return Err(self.not_descendable(node, segments));
                    };
                    match self.resolve_segments(child, rest)? {
                        Resolved::One(e) => flat.push(e),
                        Resolved::Many(es) => flat.extend(es),
                    }
                }
                Ok(Resolved::Many(flat))
            }
        }
    }

    /// The nodes selected by the leading segments of a path.
    pub(crate) fn owners_of(&self, node: NodeId, prefix: &[PathSegment]) -> Result<Vec<NodeId>> {
        if prefix.is_empty() {
            return Ok(vec![node]);
        }
        let mut owners = Vec::new();
        for entry in self.resolve_segments(node, prefix)?.entries() {
            match entry {
                Entry::Node(owner) => owners.push(owner),
                _ => return Err(self.not_descendable(node, prefix)),
            }
        }
        Ok(owners)
    }

    fn not_descendable(&self, node: NodeId, segments: &[PathSegment]) -> ModelError {
        ModelError::FieldNotFound {
            kind: self.kind(node).unwrap_or_default().to_string(),
            field: join_path(segments),
        }
    }

    /// True when every singleton child is set and every list meets its
    /// minimum size, recursively.
    pub fn validate(&self, node: NodeId) -> Result<bool> {
        Ok(self.validation_report(node)?.is_valid())
    }

    /// Every validation failure below `node`, each also logged as a warning
    /// unless disabled in the configuration.
    pub fn validation_report(&self, node: NodeId) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();
        self.collect_validation(node, &mut report)?;
        if self.config.log_validation {
            for message in &report.messages {
                warn!("{}", message);
            }
        }
        Ok(report)
    }

    fn collect_validation(&self, node: NodeId, report: &mut ValidationReport) -> Result<()> {
        let data = self.node(node)?;
        let kind = data.schema.kind();
        for (name, slot) in &data.slots {
            match slot {
                Slot::Param(_) => {}
                Slot::Object(None) => report
                    .messages
                    .push(format!("Class {}: object {} not set-up", kind, name)),
                Slot::Object(Some(child)) => self.collect_validation(*child, report)?,
                Slot::ParamList(list) => {
                    if !list.meets_minimum() {
                        report.messages.push(short_list_message(kind, name, list.len(), list.bounds().min));
                    }
                }
                Slot::ObjectList(list) => {
                    if !list.meets_minimum() {
                        report.messages.push(short_list_message(kind, name, list.len(), list.bounds().min));
                    }
                    for child in list.iter() {
                        self.collect_validation(*child, report)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Every parameter path below `node`, each prefixed with `prefix`.
    ///
    /// Scalars come first, then parameter-list entries as `name[i]`, then the
    /// parameters of singleton children and finally those of child-list
    /// members. Refine sets are skipped.
    pub fn list_parameters(&self, node: NodeId, prefix: &str) -> Result<Vec<String>> {
        let data = self.node(node)?;
        let mut out = Vec::new();

        for (name, slot) in &data.slots {
            if let Slot::Param(_) = slot {
                out.push(format!("{}{}", prefix, name));
            }
        }
        for (name, slot) in &data.slots {
            if let Slot::ParamList(list) = slot {
                out.extend((0..list.len()).map(|i| format!("{}{}[{}]", prefix, name, i)));
            }
        }
        for (name, slot) in &data.slots {
            if let Slot::Object(Some(child)) = slot {
                if self.node(*child)?.is_refine_set() {
                    continue;
                }
                out.extend(self.list_parameters(*child, &format!("{}{}.", prefix, name))?);
            }
        }
        for (name, slot) in &data.slots {
            if let Slot::ObjectList(list) = slot {
                for (i, child) in list.iter().enumerate() {
                    out.extend(self.list_parameters(*child, &format!("{}{}[{}].", prefix, name, i))?);
                }
            }
        }
        Ok(out)
    }

    /// Find the owners of every parameter named `name` (ignoring case) in
    /// the subtree at `node`.
    ///
    /// Uses the root's index, rebuilding it first when stale, and falls back
    /// to scanning [`Model::list_parameters`] when the tree has no index.
    pub fn locate_parameter(&mut self, node: NodeId, name: &str) -> Result<Located> {
        let indexed = self
            .fresh_index(node)?
            .map(|index| index.lookup(name).to_vec());
        let Some(candidates) = indexed else {
            return self.scan_parameters(node, name);
        };

        let mut pairs = Vec::new();
        for (owner, field) in candidates {
            if self.is_descendant(owner, node)? {
                pairs.push((owner, field));
            }
        }
        Ok(located(name, pairs))
    }

    fn scan_parameters(&self, node: NodeId, name: &str) -> Result<Located> {
        let wanted = name.to_lowercase();
        let mut pairs: Vec<(NodeId, String)> = Vec::new();
        for path in self.list_parameters(node, "")? {
            let (owner_path, last) = match path.rfind('.') {
                Some(dot) => (&path[..dot], &path[dot + 1..]),
                None => ("", path.as_str()),
            };
            let field = last.split('[').next().unwrap_or(last);
            if field.to_lowercase() != wanted {
                continue;
            }
            let Some(owner) = self.get_by_path(node, owner_path)?.as_node() else {
                continue;
            };
            if !pairs.iter().any(|(n, f)| *n == owner && f == field) {
                pairs.push((owner, field.to_string()));
            }
        }
        Ok(located(name, pairs))
    }
}

fn located(name: &str, mut pairs: Vec<(NodeId, String)>) -> Located {
    if pairs.len() > 1 {
        let (owners, fields) = pairs.into_iter().unzip();
        return Located::Many(owners, fields);
    }
    match pairs.pop() {
        Some((owner, field)) => Located::One(owner, field),
        None => Located::NotFound(name.to_string()),
    }
}

fn reject_index(field: &str, index: &Option<ListIndex>) -> Result<()> {
    match index {
        None => Ok(()),
        Some(_) => Err(ModelError::WrongIndexKind {
            field: field.to_string(),
            message: "an index is only valid for list fields".to_string(),
        }),
    }
}

fn identity_on_values(field: &str) -> ModelError {
    ModelError::WrongIndexKind {
        field: field.to_string(),
        message: "an integer, slice or None is required for a parameter list".to_string(),
    }
}

fn not_a_list(field: &str) -> ModelError {
    ModelError::WrongIndexKind {
        field: field.to_string(),
        message: "not a list field".to_string(),
    }
}

fn short_list_message(kind: &str, name: &str, len: usize, min: usize) -> String {
    format!(
        "Class {}: list {} has {} members, at least {} required",
        kind, name, len, min
    )
}

fn expect_value(field: &str, value: Assign) -> Result<Value> {
    match value {
        Assign::Value(v) => Ok(v),
        Assign::Node(_) => Err(ModelError::TypeConversion {
            field: field.to_string(),
            message: "expects a value, but a node is received".to_string(),
        }),
    }
}

fn expect_node(field: &str, value: Assign) -> Result<NodeId> {
    match value {
        Assign::Node(n) => Ok(n),
        Assign::Value(v) => Err(ModelError::TypeMismatch {
            field: field.to_string(),
            expected: "node".to_string(),
            found: v.type_name().to_string(),
        }),
    }
}

//! Promoting a node to a kind that extends its own

use crate::error::{ModelError, Result};
use crate::refine::{Constraint, ConstraintState};
use crate::tree::model::Model;
use crate::tree::node::{NodeId, NodeRole, Slot};
use crate::tree::schema::{FieldDescriptor, NodeSchema};
use crate::tree::value::Value;
use crate::tree::ListIndex;
use std::collections::BTreeMap;
use std::mem::discriminant;
use std::sync::Arc;
use tracing::debug;

/// Converted content of `base`, checked against the derived kind.
#[derive(Default)]
struct Carried {
    params: BTreeMap<String, Value>,
    param_lists: BTreeMap<String, Vec<Value>>,
}

impl Model {
    /// Put `derived` in the place of `base` and move `base`'s content into it.
    ///
    /// `derived` must be a detached node whose kind extends `base`'s kind.
    /// For every field `base` declares, parameter values, parameter-list
    /// entries and children move to `derived`, children are re-parented and
    /// constraints follow their slots. `derived` then takes `base`'s slot or
    /// list position and `base` is freed. Constraints `derived` held on a
    /// field of the base kind are dropped; its others are kept and linked
    /// once a session is reachable. Children `derived` held in those fields
    /// are detached.
    ///
    /// Returns `Ok(false)` without changes when `derived`'s kind does not
    /// extend `base`'s, or when `base` is a refine set or variable.
    pub fn extend(&mut self, derived: NodeId, base: NodeId) -> Result<bool> {
        let base_schema = Arc::clone(&self.node(base)?.schema);
        let derived_schema = Arc::clone(&self.node(derived)?.schema);
        if !derived_schema.is_a(base_schema.kind())
            || !matches!(self.node(base)?.role, NodeRole::Plain)
        {
            return Ok(false);
        }
        if self.node(derived)?.parent.is_some() {
            return Err(ModelError::AlreadyAttached {
                node: self.describe(derived),
            });
        }
        if derived == base {
            return Ok(true);
        }
        if self.root(base)? == derived {
            return Err(ModelError::WouldCreateCycle);
        }

        let carried = self.check_extension(base, &base_schema, &derived_schema)?;
        self.check_parent_accepts(base, &derived_schema)?;

        // derived's own constraints are re-added once it sits in base's place
        let owned = self.node(derived)?.constraints.clone();
        let mut kept: Vec<Constraint> = Vec::new();
        for ((field, index), constraint) in owned {
            let mut c = self.constraint(constraint)?.clone();
            self.remove_constraint(derived, &field, index)?;
            if base_schema.field(&field).is_none() {
                c.enable_on_link = c.state() != ConstraintState::Disabled;
                kept.push(c);
            }
        }

        let base_data = self.nodes.remove(base).ok_or(ModelError::StaleNode)?;
        let mut displaced = Vec::new();
        let mut adopted = Vec::new();
        for (name, slot) in base_data.slots {
            let target = self.node_mut(derived)?.slots.get_mut(&name);
            match (slot, target) {
                (Slot::Param(_), Some(Slot::Param(value))) => {
                    if let Some(carried) = carried.params.get(&name) {
                        *value = carried.clone();
                    }
                }
                (Slot::ParamList(_), Some(Slot::ParamList(list))) => {
                    list.drain();
                    for value in carried.param_lists.get(&name).into_iter().flatten() {
                        list.insert(value.clone(), None)?;
                    }
                }
                (Slot::Object(child), Some(Slot::Object(current))) => {
                    displaced.extend(current.take());
                    *current = child;
                    adopted.extend(child);
                }
                (Slot::ObjectList(mut children), Some(Slot::ObjectList(list))) => {
                    displaced.extend(list.drain());
                    for child in children.drain() {
                        list.insert(child, None)?;
                        adopted.push(child);
                    }
                }
                _ => {}
            }
        }
        for child in adopted {
            self.node_mut(child)?.parent = Some(derived);
        }

        for ((field, index), constraint) in base_data.constraints {
            if let Some(c) = self.constraints.get_mut(constraint) {
                c.owner = derived;
            }
            self.node_mut(derived)?
                .constraints
                .insert((field, index), constraint);
        }

        match (base_data.parent, base_data.key) {
            (Some(parent), Some(key)) => {
                match self.node_mut(parent)?.slots.get_mut(&key) {
                    Some(Slot::Object(slot)) => *slot = Some(derived),
                    Some(Slot::ObjectList(list)) => {
                        if let Some(position) = list.position_of(&base) {
                            list.insert(derived, Some(&ListIndex::from(position)))?;
                        }
                    }
                    _ => {}
                }
                let data = self.node_mut(derived)?;
                data.parent = Some(parent);
                data.key = Some(key);
                data.index = None;
            }
            _ => {
                if base_data.index.is_some() {
                    self.node_mut(derived)?.index = base_data.index;
                }
            }
        }

        for child in displaced {
            let is_refine_set = self.node(child)?.is_refine_set();
            self.release(child)?;
            if is_refine_set {
                self.destroy(child)?;
            }
        }
        self.invalidate_index(derived)?;

        for c in kept {
            self.insert_pending_constraint(derived, c)?;
        }
        if !self.in_refine_set(derived)? && self.refine_set_of(derived)?.is_some() {
            self.link_constraints(derived)?;
        }

        debug!(
            base = ?base,
            derived = ?derived,
            kind = derived_schema.kind(),
            "extended node"
        );
        Ok(true)
    }

    /// Check that every field of the base kind is declared alike by the
    /// derived kind and that `base`'s content fits it.
    fn check_extension(
        &self,
        base: NodeId,
        base_schema: &NodeSchema,
        derived_schema: &NodeSchema,
    ) -> Result<Carried> {
        if base_schema.session_field().is_some()
            && base_schema.session_field() != derived_schema.session_field()
        {
            return Err(ModelError::InvalidSchema {
                kind: derived_schema.kind().to_string(),
                message: format!(
                    "must keep the session field of '{}'",
                    base_schema.kind()
                ),
            });
        }

        let data = self.node(base)?;
        let mut carried = Carried::default();
        for (name, field) in base_schema.fields() {
            let Some(target) = derived_schema.field(name) else {
                return Err(ModelError::FieldNotFound {
                    kind: derived_schema.kind().to_string(),
                    field: name.to_string(),
                });
            };
            if discriminant(field) != discriminant(target) {
                return Err(ModelError::TypeMismatch {
                    field: name.to_string(),
                    expected: shape(field).to_string(),
                    found: shape(target).to_string(),
                });
            }

            match (data.slots.get(name), target) {
                (Some(Slot::Param(value)), FieldDescriptor::Param(info)) => {
                    carried
                        .params
                        .insert(name.to_string(), info.convert(name, value)?);
                }
                (Some(Slot::ParamList(list)), FieldDescriptor::ParamList(info, bounds)) => {
                    check_fits(name, list.len(), bounds.max)?;
                    let values = list
                        .iter()
                        .map(|value| info.convert(name, value))
                        .collect::<Result<Vec<_>>>()?;
                    carried.param_lists.insert(name.to_string(), values);
                }
                (Some(Slot::Object(Some(child))), FieldDescriptor::Object(info)) => {
                    info.check(name, &self.node(*child)?.schema)?;
                }
                (Some(Slot::ObjectList(list)), FieldDescriptor::ObjectList(info, bounds)) => {
                    check_fits(name, list.len(), bounds.max)?;
                    for child in list.iter() {
                        info.check(name, &self.node(*child)?.schema)?;
                    }
                }
                _ => {}
            }
        }
        Ok(carried)
    }

    fn check_parent_accepts(&self, base: NodeId, derived_schema: &NodeSchema) -> Result<()> {
        let data = self.node(base)?;
        let (Some(parent), Some(key)) = (data.parent, data.key.as_deref()) else {
            return Ok(());
        };
        match self.descriptor(parent, key)? {
            FieldDescriptor::Object(info) | FieldDescriptor::ObjectList(info, _) => {
                info.check(key, derived_schema)
            }
            _ => Ok(()),
        }
    }
}

fn check_fits(field: &str, len: usize, max: Option<usize>) -> Result<()> {
    match max {
        Some(max) if len > max => Err(ModelError::SizeLimitExceeded {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

fn shape(field: &FieldDescriptor) -> &'static str {
    match field {
        FieldDescriptor::Param(_) => "parameter",
        FieldDescriptor::ParamList(..) => "parameter list",
        FieldDescriptor::Object(_) => "object",
        FieldDescriptor::ObjectList(..) => "object list",
    }
}

//! Constraint lifecycle, refine-set queries and the optimizer hand-off
//!
//! A constraint, its variable and the refine set form a three-way link:
//! a linked constraint appears exactly once in its variable's list and once
//! in the registry of the refine set holding that variable. Every operation
//! here keeps the three sides in step.

use crate::error::{ModelError, Result};
use crate::refine::formula::{parse_formula, render_engine_formula};
use crate::refine::variable::field;
use crate::refine::{
    Constraint, ConstraintId, ConstraintOptions, ConstraintState, VARIABLE_KIND,
    VARIABLE_LIST_FIELD,
};
use crate::tree::node::{NodeRole, SlotKey};
use crate::tree::{parse_path, FieldDescriptor, ListIndex, Model, NodeId};
use ndarray::Array1;
use tracing::debug;

impl Model {
    /// The refine set of the nearest refinement-session root at or above
    /// `node`.
    pub fn refine_set_of(&self, node: NodeId) -> Result<Option<NodeId>> {
        let mut current = Some(node);
        while let Some(n) = current {
            let data = self.node(n)?;
            if let Some(session) = data.schema.session_field() {
                if let Some(refine_set) = self.get_node(n, session, None)? {
                    return Ok(Some(refine_set));
                }
            }
            current = data.parent;
        }
        Ok(None)
    }

    /// `node` itself when it is a refine set, otherwise its session's.
    fn resolve_refine_set(&self, node: NodeId) -> Result<NodeId> {
        if self.node(node)?.is_refine_set() {
            return Ok(node);
        }
        self.refine_set_of(node)?
            .ok_or_else(|| ModelError::RefinementUnavailable {
                path: self.describe(node),
            })
    }

    pub fn constraint(&self, constraint: ConstraintId) -> Result<&Constraint> {
        self.constraints
            .get(constraint)
            .ok_or(ModelError::StaleConstraint)
    }

    fn constraint_mut(&mut self, constraint: ConstraintId) -> Result<&mut Constraint> {
        self.constraints
            .get_mut(constraint)
            .ok_or(ModelError::StaleConstraint)
    }

    pub fn constraint_state(&self, constraint: ConstraintId) -> Result<ConstraintState> {
        Ok(self.constraint(constraint)?.state())
    }

    /// Path of the constrained slot from its root, e.g. `Phase[0].Cell[2]`.
    pub fn constraint_path(&self, constraint: ConstraintId) -> Result<String> {
        let c = self.constraint(constraint)?;
        let owner = self.path(c.owner)?;
        if owner.is_empty() {
            Ok(c.name())
        } else {
            Ok(format!("{}.{}", owner, c.name()))
        }
    }

    /// Check that `name` (and `index`) address a parameter slot of `node`.
    fn check_slot(&self, node: NodeId, name: &str, index: Option<usize>) -> Result<()> {
        match (self.descriptor(node, name)?, index) {
            (FieldDescriptor::Param(_), None) => Ok(()),
            (FieldDescriptor::Param(_), Some(_)) => Err(ModelError::WrongIndexKind {
                field: name.to_string(),
                message: "a scalar parameter takes no index".to_string(),
            }),
            (FieldDescriptor::ParamList(..), None) => Err(ModelError::WrongIndexKind {
                field: name.to_string(),
                message: "an integer index is required for a parameter list".to_string(),
            }),
            (FieldDescriptor::ParamList(..), Some(i)) => {
                let len = self.param_list(node, name)?.len();
                if i >= len {
                    return Err(ModelError::IndexOutOfRange {
                        field: name.to_string(),
                        index: i as isize,
                        len,
                    });
                }
                Ok(())
            }
            _ => Err(ModelError::FieldNotFound {
                kind: self.kind(node)?.to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// Link a constraint into the session reachable from its owner.
    ///
    /// `formula` replaces the stored formula when given. An empty formula
    /// reserves the slot without linking. Otherwise the named variable is
    /// found in the refine set, or created and appended, and the constraint
    /// is registered with both and turned on. Applying twice is harmless.
    pub fn apply_constraint(
        &mut self,
        constraint: ConstraintId,
        formula: Option<&str>,
        value: Option<f64>,
        damping: Option<f64>,
    ) -> Result<()> {
        let owner = self.constraint(constraint)?.owner;
        let Some(refine_set) = self.refine_set_of(owner)? else {
            return Err(ModelError::RefinementUnavailable {
                path: self.describe(owner),
            });
        };

        if let Some(previous) = self.constraint(constraint)?.refine {
            if previous != refine_set {
                self.unregister(previous, constraint);
            }
        }
        {
            let c = self.constraint_mut(constraint)?;
            c.refine = Some(refine_set);
            if let Some(formula) = formula {
                c.formula = formula.to_string();
            }
            if c.formula.is_empty() {
                return Ok(());
            }
            let parsed = parse_formula(&c.formula);
            c.dev = parsed.dev;
            c.var_name = parsed.variable;
        }

        if let Some(value) = value {
            self.set_constraint_value(constraint, value)?;
        }
        if let Some(damping) = damping {
            self.constraint_mut(constraint)?.damping = damping;
        }

        let var_name = self.constraint(constraint)?.var_name.clone();
        let variable = match self.find_variable(refine_set, &var_name)? {
            Some(variable) => variable,
            None => self.create_variable(refine_set, &var_name)?,
        };

        if let Some(old) = self.constraint(constraint)?.variable {
            if old != variable && self.contains(old) {
                self.detach_from_variable(old, constraint)?;
            }
        }

        {
            let c = self.constraint_mut(constraint)?;
            c.variable = Some(variable);
            c.on = true;
        }
        if let Some(list) = self.node_mut(variable)?.role.constraints_mut() {
            if !list.contains(&constraint) {
                list.push(constraint);
            }
        }
        if let Some(list) = self.node_mut(refine_set)?.role.constraints_mut() {
            if !list.contains(&constraint) {
                list.push(constraint);
            }
        }
        Ok(())
    }

    fn create_variable(&mut self, refine_set: NodeId, name: &str) -> Result<NodeId> {
        let variable = self.create(VARIABLE_KIND)?;
        let attached = self
            .set_value(variable, field::NAME, name)
            .and_then(|_| self.set(refine_set, VARIABLE_LIST_FIELD, variable, None));
        if let Err(e) = attached {
            self.destroy(variable)?;
            return Err(e);
        }
        debug!(name, variable = ?variable, "created variable");
        Ok(variable)
    }

    fn unregister(&mut self, refine_set: NodeId, constraint: ConstraintId) {
        if let Some(data) = self.nodes.get_mut(refine_set) {
            if let NodeRole::RefineSet { constraints } = &mut data.role {
                constraints.retain(|c| *c != constraint);
            }
        }
    }

    fn detach_from_variable(&mut self, variable: NodeId, constraint: ConstraintId) -> Result<()> {
        let now_empty = match &mut self.node_mut(variable)?.role {
            NodeRole::Variable { constraints } => {
                constraints.retain(|c| *c != constraint);
                constraints.is_empty()
            }
            _ => false,
        };
        if now_empty {
            self.remove_variable(variable)?;
        }
        Ok(())
    }

    /// Unlink a constraint and reset its settings.
    ///
    /// A variable left without constraints is removed from its refine set.
    /// The constraint stays in its owner's table, unlinked.
    pub fn clear_constraint(&mut self, constraint: ConstraintId) -> Result<()> {
        let (variable, refine_set) = {
            let c = self.constraint(constraint)?;
            (c.variable, c.refine)
        };
        if let Some(variable) = variable.filter(|v| self.contains(*v)) {
            self.detach_from_variable(variable, constraint)?;
        }
        if let Some(refine_set) = refine_set {
            self.unregister(refine_set, constraint);
        }
        self.constraint_mut(constraint)?.reset();
        Ok(())
    }

    pub fn turn_refine_on(&mut self, constraint: ConstraintId) -> Result<()> {
        self.constraint_mut(constraint)?.on = true;
        Ok(())
    }

    pub fn turn_refine_off(&mut self, constraint: ConstraintId) -> Result<()> {
        self.constraint_mut(constraint)?.on = false;
        Ok(())
    }

    /// Current value of the constrained slot.
    pub fn constraint_value(&self, constraint: ConstraintId) -> Result<f64> {
        let c = self.constraint(constraint)?;
        let got = self.get(c.owner, &c.parname, c.index.map(ListIndex::from))?;
        got.as_f64().ok_or_else(|| ModelError::TypeConversion {
            field: c.name(),
            message: "the constrained value is not numeric".to_string(),
        })
    }

    pub fn set_constraint_value(&mut self, constraint: ConstraintId, value: f64) -> Result<()> {
        let (owner, parname, index) = {
            let c = self.constraint(constraint)?;
            (c.owner, c.parname.clone(), c.index)
        };
        self.set(owner, &parname, value, index.map(ListIndex::from))
    }

    /// The engine formula `<value>+<dev>*<variable>` with the configured
    /// width and precision.
    pub fn make_formula(&self, constraint: ConstraintId) -> Result<String> {
        let c = self.constraint(constraint)?;
        let Some(variable) = c.variable else {
            return Err(ModelError::Unlinked {
                constraint: c.name(),
            });
        };
        if !self.contains(variable) {
            return Err(ModelError::DanglingVariableReference {
                message: format!("the variable of '{}' no longer exists", c.name()),
            });
        }
        let value = self.constraint_value(constraint)?;
        let name = self.variable_name(variable)?;
        let config = self.config();
        Ok(render_engine_formula(
            value,
            c.dev,
            &name,
            config.formula_width,
            config.effective_precision(),
        ))
    }

    /// Check the owner slot and refine set of a constraint.
    ///
    /// Returns `Ok(false)` for an empty formula.
    pub fn validate_constraint(&self, constraint: ConstraintId) -> Result<bool> {
        let c = self.constraint(constraint)?;
        let owner = self.node(c.owner)?;
        match owner.schema.field(&c.parname) {
            Some(FieldDescriptor::Param(_)) | Some(FieldDescriptor::ParamList(..)) => {}
            _ => {
                return Err(ModelError::FieldNotFound {
                    kind: owner.schema.kind().to_string(),
                    field: c.parname.clone(),
                })
            }
        }
        match c.refine {
            None => {
                return Err(ModelError::RefinementUnavailable {
                    path: self.describe(c.owner),
                })
            }
            Some(refine_set) => {
                if !self.nodes.get(refine_set).is_some_and(|d| d.is_refine_set()) {
                    return Err(ModelError::DanglingVariableReference {
                        message: format!("the refine set of '{}' no longer exists", c.name()),
                    });
                }
            }
        }
        Ok(!c.formula.is_empty())
    }

    /// Constrain a parameter slot of `node` and link it into the session.
    ///
    /// A previous constraint on the same slot is cleared and dropped. The
    /// code word defaults to the damping value.
    ///
    /// # Errors
    ///
    /// [`ModelError::RefinementUnavailable`] when no session is reachable;
    /// slot addressing errors as for [`Model::get`].
    pub fn set_constraint(
        &mut self,
        node: NodeId,
        name: &str,
        formula: &str,
        options: ConstraintOptions,
        index: Option<usize>,
    ) -> Result<ConstraintId> {
        self.check_slot(node, name, index)?;

        let mut c = Constraint::new(node, name, index);
        c.code_word = options.code_word.or(options.damping).unwrap_or(0.0);
        c.initial_value = options.value;
        let constraint = self.constraints.insert(c);

        if let Err(e) = self.apply_constraint(constraint, Some(formula), options.value, options.damping)
        {
            self.constraints.remove(constraint);
            return Err(e);
        }
        self.store_constraint(node, (name.to_string(), index), constraint)?;
        debug!(node = ?node, slot = name, ?index, formula, "constraint set");
        Ok(constraint)
    }

    /// Record a constraint that keeps its settings but stays unlinked until
    /// the node is attached under a session.
    pub(crate) fn insert_pending_constraint(&mut self, node: NodeId, mut c: Constraint) -> Result<ConstraintId> {
        self.check_slot(node, &c.parname, c.index)?;
        let key = (c.parname.clone(), c.index);
        c.owner = node;
        c.variable = None;
        c.refine = None;
        c.on = false;
        let constraint = self.constraints.insert(c);
        self.store_constraint(node, key, constraint)?;
        Ok(constraint)
    }

    fn store_constraint(&mut self, node: NodeId, key: SlotKey, constraint: ConstraintId) -> Result<()> {
        let old = self.node_mut(node)?.constraints.insert(key, constraint);
        if let Some(old) = old.filter(|old| *old != constraint) {
            self.clear_constraint(old)?;
            self.constraints.remove(old);
        }
        Ok(())
    }

    pub fn get_constraint(&self, node: NodeId, name: &str, index: Option<usize>) -> Result<Option<ConstraintId>> {
        self.descriptor(node, name)?;
        Ok(self
            .node(node)?
            .constraints
            .get(&(name.to_string(), index))
            .copied())
    }

    /// Clear and drop the constraint on a slot, returning its final state.
    pub fn remove_constraint(&mut self, node: NodeId, name: &str, index: Option<usize>) -> Result<Option<Constraint>> {
        let Some(constraint) = self
            .node_mut(node)?
            .constraints
            .remove(&(name.to_string(), index))
        else {
            return Ok(None);
        };
        self.clear_constraint(constraint)?;
        Ok(self.constraints.remove(constraint))
    }

    /// Constrain every slot a path selects.
    ///
    /// Range segments broadcast. With `var_index`, the counter is appended to
    /// the formula of each created constraint and incremented, so `k` with
    /// `var_index = Some(1)` yields `k1`, `k2`, and so on.
    pub fn set_constraint_by_path(
        &mut self,
        node: NodeId,
        path: &str,
        formula: &str,
        options: ConstraintOptions,
        var_index: Option<usize>,
    ) -> Result<Vec<ConstraintId>> {
        let segments = parse_path(path)?;
        let Some((last, prefix)) = segments.split_last() else {
            return Err(ModelError::EmptyPath);
        };

        let mut counter = var_index;
        let mut created = Vec::new();
        for owner in self.owners_of(node, prefix)? {
            for index in self.slot_positions(owner, &last.name, last.index)? {
                let text = match counter.as_mut() {
                    Some(k) => {
                        let text = format!("{}{}", formula, k);
                        *k += 1;
                        text
                    }
                    None => formula.to_string(),
                };
                created.push(self.set_constraint(owner, &last.name, &text, options, index)?);
            }
        }
        Ok(created)
    }

    /// The constraint of every slot a path selects, `None` where unconstrained.
    pub fn get_constraint_by_path(&self, node: NodeId, path: &str) -> Result<Vec<Option<ConstraintId>>> {
        let segments = parse_path(path)?;
        let Some((last, prefix)) = segments.split_last() else {
            return Err(ModelError::EmptyPath);
        };

        let mut found = Vec::new();
        for owner in self.owners_of(node, prefix)? {
            for index in self.slot_positions(owner, &last.name, last.index)? {
                found.push(self.get_constraint(owner, &last.name, index)?);
            }
        }
        Ok(found)
    }

    fn slot_positions(&self, owner: NodeId, name: &str, index: Option<ListIndex>) -> Result<Vec<Option<usize>>> {
        match index {
            None => Ok(vec![None]),
            Some(index) => Ok(self
                .param_list(owner, name)?
                .resolve(&index)?
                .into_iter()
                .map(Some)
                .collect()),
        }
    }

    /// Apply every constraint owned in the subtree at `node`.
    ///
    /// Constraints that were disabled, or copied as disabled, stay disabled.
    pub fn link_constraints(&mut self, node: NodeId) -> Result<()> {
        if self.refine_set_of(node)?.is_none() {
            return Err(ModelError::RefinementUnavailable {
                path: self.describe(node),
            });
        }
        for member in self.subtree(node)? {
            let owned: Vec<ConstraintId> = self.node(member)?.constraints.values().copied().collect();
            for constraint in owned {
                self.link_constraint(constraint)?;
            }
        }
        Ok(())
    }

    /// Apply one constraint, keeping a disabled one disabled.
    pub(crate) fn link_constraint(&mut self, constraint: ConstraintId) -> Result<()> {
        let c = self.constraint(constraint)?;
        let disabled = c.state() == ConstraintState::Disabled || !c.enable_on_link;
        self.apply_constraint(constraint, None, None, None)?;
        let c = self.constraint_mut(constraint)?;
        if disabled {
            c.on = false;
        }
        c.enable_on_link = true;
        Ok(())
    }

    /// Constraints owned by `node`, ordered by slot.
    pub fn constraints_of(&self, node: NodeId) -> Result<Vec<ConstraintId>> {
        Ok(self.node(node)?.constraints.values().copied().collect())
    }

    /// Clear and drop the constraints owned by a node and release those
    /// attached to it as a variable or refine set.
    pub(crate) fn release_node_constraints(&mut self, node: NodeId) -> Result<()> {
        let owned = std::mem::take(&mut self.node_mut(node)?.constraints);
        for constraint in owned.into_values() {
            if self.constraints.contains(constraint) {
                self.clear_constraint(constraint)?;
                self.constraints.remove(constraint);
            }
        }

        let data = self.node_mut(node)?;
        let is_variable = matches!(data.role, NodeRole::Variable { .. });
        let attached = data.role.constraints_mut().map(std::mem::take).unwrap_or_default();
        for constraint in attached {
            if !self.constraints.contains(constraint) {
                continue;
            }
            if is_variable {
                // the variable itself is going away; only unlink the constraint
                if let Some(refine_set) = self.constraint(constraint)?.refine {
                    self.unregister(refine_set, constraint);
                }
                self.constraint_mut(constraint)?.reset();
            } else {
                self.clear_constraint(constraint)?;
            }
        }
        Ok(())
    }

    /// Follow a parameter-list removal: drop constraints on removed positions
    /// and shift those on later positions down.
    pub(crate) fn rekey_after_removal(&mut self, node: NodeId, name: &str, removed: &[usize]) -> Result<()> {
        let data = self.node_mut(node)?;
        let keys: Vec<SlotKey> = data
            .constraints
            .keys()
            .filter(|(field, index)| field == name && index.is_some())
            .cloned()
            .collect();
        let mut moved = Vec::new();
        for key in keys {
            if let (Some(constraint), (_, Some(position))) = (data.constraints.remove(&key), key) {
                moved.push((position, constraint));
            }
        }

        for (position, constraint) in moved {
            if removed.contains(&position) {
                self.clear_constraint(constraint)?;
                self.constraints.remove(constraint);
                continue;
            }
            let shift = removed.iter().filter(|r| **r < position).count();
            let position = position - shift;
            self.constraint_mut(constraint)?.index = Some(position);
            self.node_mut(node)?
                .constraints
                .insert((name.to_string(), Some(position)), constraint);
        }
        Ok(())
    }

    /// The variable named exactly `name` in the refine set reachable from
    /// `node`.
    pub fn find_variable(&self, node: NodeId, name: &str) -> Result<Option<NodeId>> {
        let refine_set = self.resolve_refine_set(node)?;
        for variable in self.children(refine_set, VARIABLE_LIST_FIELD)? {
            if self.variable_name(variable)? == name {
                return Ok(Some(variable));
            }
        }
        Ok(None)
    }

    /// Variables of the refine set reachable from `node`, in creation order.
    pub fn variables(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let refine_set = self.resolve_refine_set(node)?;
        self.children(refine_set, VARIABLE_LIST_FIELD)
    }

    /// Constraints registered with the refine set reachable from `node`.
    pub fn refine_constraints(&self, node: NodeId) -> Result<Vec<ConstraintId>> {
        let refine_set = self.resolve_refine_set(node)?;
        Ok(self.node(refine_set)?.role.constraints().to_vec())
    }

    /// The registered constraints that are turned on.
    pub fn active_constraints(&self, node: NodeId) -> Result<Vec<ConstraintId>> {
        let mut active = Vec::new();
        for constraint in self.refine_constraints(node)? {
            if self.constraint(constraint)?.is_on() {
                active.push(constraint);
            }
        }
        Ok(active)
    }

    /// Remove a variable from its refine set and free it, but only when no
    /// constraint references it. Returns whether it was removed.
    pub fn remove_variable(&mut self, variable: NodeId) -> Result<bool> {
        if !self.contains(variable) || !self.variable_constraints(variable)?.is_empty() {
            return Ok(false);
        }
        if let Some(parent) = self.parent(variable)? {
            self.delete(parent, VARIABLE_LIST_FIELD, Some(ListIndex::ByIdentity(variable)))?;
        }
        self.destroy(variable)?;
        debug!(variable = ?variable, "removed variable");
        Ok(true)
    }

    /// Verify the three-way link of every constraint and variable of a
    /// refine set.
    pub fn check_consistency(&self, node: NodeId) -> Result<()> {
        let refine_set = self.resolve_refine_set(node)?;
        let registry = self.node(refine_set)?.role.constraints().to_vec();
        let members = self.children(refine_set, VARIABLE_LIST_FIELD)?;
        let dangling = |message: String| ModelError::DanglingVariableReference { message };

        for (i, constraint) in registry.iter().enumerate() {
            if registry[..i].contains(constraint) {
                return Err(dangling(format!("{:?} is registered twice", constraint)));
            }
            let c = self
                .constraint(*constraint)
                .map_err(|_| dangling(format!("{:?} is registered but gone", constraint)))?;
            if c.refine != Some(refine_set) {
                return Err(dangling(format!("'{}' points at another refine set", c.name())));
            }
            let Some(variable) = c.variable else {
                return Err(dangling(format!("'{}' is registered without a variable", c.name())));
            };
            if !members.contains(&variable) {
                return Err(dangling(format!("the variable of '{}' is not in the refine set", c.name())));
            }
            let listed = self
                .variable_constraints(variable)?
                .iter()
                .filter(|v| *v == constraint)
                .count();
            if listed != 1 {
                return Err(dangling(format!(
                    "'{}' appears {} times in its variable",
                    c.name(),
                    listed
                )));
            }
        }

        for variable in members {
            let attached = self.variable_constraints(variable)?;
            if attached.is_empty() {
                return Err(dangling(format!(
                    "variable '{}' has no constraints",
                    self.variable_name(variable)?
                )));
            }
            for constraint in attached {
                let c = self
                    .constraint(constraint)
                    .map_err(|_| dangling(format!("{:?} is attached but gone", constraint)))?;
                if c.variable != Some(variable) || !registry.contains(&constraint) {
                    return Err(dangling(format!("'{}' is not linked back", c.name())));
                }
            }
        }
        Ok(())
    }

    /// Variables with at least one enabled constraint, in creation order.
    pub fn refined_variables(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut refined = Vec::new();
        for variable in self.variables(node)? {
            let mut enabled = false;
            for constraint in self.variable_constraints(variable)? {
                enabled |= self.constraint(constraint)?.is_on();
            }
            if enabled {
                refined.push(variable);
            }
        }
        Ok(refined)
    }

    /// Values of the refined variables as an optimizer vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use rietveld_model::refine::ConstraintOptions;
    /// use rietveld_model::tree::{Model, NodeSchema, ParamInfo};
    ///
    /// let mut model = Model::new();
    /// model
    ///     .register(
    ///         NodeSchema::builder("Fit")
    ///             .param("Scale", ParamInfo::float(1.0))
    ///             .refine_session("Refine")
    ///             .build()
    ///             .unwrap(),
    ///     )
    ///     .unwrap();
    /// let fit = model.create("Fit").unwrap();
    /// model
    ///     .set_constraint(fit, "Scale", "k", ConstraintOptions::new(), None)
    ///     .unwrap();
    ///
    /// let k = model.find_variable(fit, "k").unwrap().unwrap();
    /// model.set_value(k, "value", 2.5).unwrap();
    /// assert_eq!(model.variable_array(fit).unwrap().to_vec(), vec![2.5]);
    /// ```
    pub fn variable_array(&self, node: NodeId) -> Result<Array1<f64>> {
        let mut values = Vec::new();
        for variable in self.refined_variables(node)? {
            values.push(self.get_f64(variable, field::VALUE)?);
        }
        Ok(Array1::from_vec(values))
    }

    /// Write optimizer values back into the refined variables.
    ///
    /// Each value is clamped into the variable's enabled bounds, or wrapped
    /// for a periodic boundary.
    pub fn update_variables_from_array(&mut self, node: NodeId, values: &Array1<f64>) -> Result<()> {
        let refined = self.refined_variables(node)?;
        if refined.len() != values.len() {
            return Err(ModelError::ArrayLength {
                expected: refined.len(),
                found: values.len(),
            });
        }
        for (variable, value) in refined.into_iter().zip(values.iter()) {
            let view = self.variable_view(variable)?;
            let value = view.bounds().apply(view.boundary, *value)?;
            self.set_value(variable, field::VALUE, value)?;
        }
        Ok(())
    }
}

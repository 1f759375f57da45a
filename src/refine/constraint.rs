//! Constraints binding a parameter slot to a refinement variable

use crate::arena::Handle;
use crate::tree::NodeId;
use serde::{Deserialize, Serialize};

/// Marker for constraint handles.
#[derive(Debug)]
pub enum ConstraintTag {}

/// Handle to a constraint in a [`Model`](crate::tree::Model).
pub type ConstraintId = Handle<ConstraintTag>;

/// Lifecycle of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintState {
    /// Not attached to a variable: fresh, cleared or waiting for a session.
    Unlinked,
    /// Linked and refined.
    Enabled,
    /// Linked but held fixed.
    Disabled,
}

/// The binding of one parameter slot (`parname`, optionally at a position
/// of a parameter list) on its owner node to a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub(crate) parname: String,
    pub(crate) owner: NodeId,
    pub(crate) index: Option<usize>,
    pub(crate) formula: String,
    pub(crate) dev: f64,
    pub(crate) var_name: String,
    pub(crate) on: bool,
    pub(crate) damping: f64,
    pub(crate) sigma: f64,
    pub(crate) code_word: f64,
    pub(crate) initial_value: Option<f64>,
    pub(crate) variable: Option<NodeId>,
    pub(crate) refine: Option<NodeId>,
    /// Whether linking should leave the constraint enabled.
    pub(crate) enable_on_link: bool,
}

impl Constraint {
    pub(crate) fn new(owner: NodeId, parname: &str, index: Option<usize>) -> Self {
        Self {
            parname: parname.to_string(),
            owner,
            index,
            formula: String::new(),
            dev: 0.0,
            var_name: String::new(),
            on: false,
            damping: 0.0,
            sigma: 0.0,
            code_word: 0.0,
            initial_value: None,
            variable: None,
            refine: None,
            enable_on_link: true,
        }
    }

    /// Name of the constrained slot: `parname` or `parname[i]`.
    pub fn name(&self) -> String {
        match self.index {
            Some(i) => format!("{}[{}]", self.parname, i),
            None => self.parname.clone(),
        }
    }

    pub fn parname(&self) -> &str {
        &self.parname
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The user formula; empty when reserved or cleared.
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Multiplier of the variable.
    pub fn dev(&self) -> f64 {
        self.dev
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Uncertainty reported for the constrained value.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn code_word(&self) -> f64 {
        self.code_word
    }

    /// The value supplied when the constraint was created.
    pub fn initial_value(&self) -> Option<f64> {
        self.initial_value
    }

    pub fn variable(&self) -> Option<NodeId> {
        self.variable
    }

    pub fn refine_set(&self) -> Option<NodeId> {
        self.refine
    }

    pub fn state(&self) -> ConstraintState {
        match (self.variable, self.on) {
            (None, _) => ConstraintState::Unlinked,
            (Some(_), true) => ConstraintState::Enabled,
            (Some(_), false) => ConstraintState::Disabled,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.on = false;
        self.formula.clear();
        self.damping = 0.0;
        self.var_name.clear();
        self.dev = 0.0;
        self.sigma = 0.0;
        self.variable = None;
        self.refine = None;
    }
}

/// Optional settings for a new constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstraintOptions {
    /// Written to the constrained slot when the constraint is applied.
    pub value: Option<f64>,
    pub damping: Option<f64>,
    /// Defaults to the damping value.
    pub code_word: Option<f64>,
}

impl ConstraintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn damping(mut self, damping: f64) -> Self {
        self.damping = Some(damping);
        self
    }

    pub fn code_word(mut self, code_word: f64) -> Self {
        self.code_word = Some(code_word);
        self
    }
}

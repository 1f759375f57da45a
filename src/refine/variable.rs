//! The built-in `Variable` and `RefineSet` node kinds

use crate::error::Result;
use crate::refine::bounds::{BoundaryMode, Bounds};
use crate::refine::{ConstraintId, REFINE_SET_KIND, VARIABLE_KIND, VARIABLE_LIST_FIELD};
use crate::tree::node::NodeRole;
use crate::tree::{Model, NodeId, NodeSchema, ObjectInfo, ParamInfo, SizeBounds};

/// Field names of the `Variable` kind.
pub mod field {
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
    pub const USE_MIN: &str = "usemin";
    pub const USE_MAX: &str = "usemax";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const BOUNDARY: &str = "IBound";
    pub const STEP: &str = "Step";
}

pub(crate) fn variable_schema() -> NodeSchema {
    NodeSchema::builder(VARIABLE_KIND)
        .param(field::NAME, ParamInfo::string("").describe("variable name"))
        .param(field::VALUE, ParamInfo::float(0.0).describe("current value"))
        .param(field::USE_MIN, ParamInfo::boolean(false).describe("lower bound enabled"))
        .param(field::USE_MAX, ParamInfo::boolean(false).describe("upper bound enabled"))
        .param(field::MIN, ParamInfo::float(0.0).describe("lower bound"))
        .param(field::MAX, ParamInfo::float(0.0).describe("upper bound"))
        .param(
            field::BOUNDARY,
            ParamInfo::enumeration(0, &[(0, "hard boundary"), (1, "periodic boundary")]),
        )
        .param(field::STEP, ParamInfo::float(1.0).describe("step size"))
        .build_unchecked()
}

pub(crate) fn refine_set_schema() -> NodeSchema {
    NodeSchema::builder(REFINE_SET_KIND)
        .object_list(
            VARIABLE_LIST_FIELD,
            ObjectInfo::of(VARIABLE_KIND),
            SizeBounds::unbounded(),
        )
        .build_unchecked()
}

/// A typed copy of a variable's fields.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableView {
    pub id: NodeId,
    pub name: String,
    pub value: f64,
    pub use_min: bool,
    pub use_max: bool,
    pub min: f64,
    pub max: f64,
    pub boundary: BoundaryMode,
    pub step: f64,
    /// Every constraint referencing the variable.
    pub constraints: Vec<ConstraintId>,
}

impl VariableView {
    /// The enabled ends as bounds. An inverted pair of enabled ends collapses
    /// to the lower end.
    pub fn bounds(&self) -> Bounds {
        let min = self.use_min.then_some(self.min);
        let max = self.use_max.then_some(self.max);
        Bounds::from_limits(min, max).unwrap_or(Bounds {
            min: self.min,
            max: self.min,
        })
    }
}

impl Model {
    /// Read a variable's fields.
    pub fn variable_view(&self, variable: NodeId) -> Result<VariableView> {
        let name = self.get_value(variable, field::NAME)?;
        let use_min = self.get_value(variable, field::USE_MIN)?;
        let use_max = self.get_value(variable, field::USE_MAX)?;
        let boundary = self.get_value(variable, field::BOUNDARY)?;

        Ok(VariableView {
            id: variable,
            name: name.as_str().unwrap_or_default().to_string(),
            value: self.get_f64(variable, field::VALUE)?,
            use_min: use_min.as_bool().unwrap_or(false),
            use_max: use_max.as_bool().unwrap_or(false),
            min: self.get_f64(variable, field::MIN)?,
            max: self.get_f64(variable, field::MAX)?,
            boundary: BoundaryMode::from_code(boundary.as_i64().unwrap_or(0)),
            step: self.get_f64(variable, field::STEP)?,
            constraints: self.variable_constraints(variable)?,
        })
    }

    /// The name of a variable.
    pub fn variable_name(&self, variable: NodeId) -> Result<String> {
        Ok(self
            .get_value(variable, field::NAME)?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    /// Every constraint referencing `variable`. Empty for other kinds.
    pub fn variable_constraints(&self, variable: NodeId) -> Result<Vec<ConstraintId>> {
        match &self.node(variable)?.role {
            NodeRole::Variable { constraints } => Ok(constraints.clone()),
            _ => Ok(Vec::new()),
        }
    }
}

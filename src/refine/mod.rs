//! Refinement constraints, variables and refine sets
//!
//! A refinement-session root (a kind declared with
//! [`NodeSchemaBuilder::refine_session`](crate::tree::NodeSchemaBuilder::refine_session))
//! carries a `RefineSet` node. Constraining a parameter slot anywhere below
//! the root links the slot to a named `Variable` in that set, creating the
//! variable on first use and removing it again when its last constraint is
//! cleared.
//!
//! # Example
//!
//! ```
//! use rietveld_model::refine::{ConstraintOptions, ConstraintState};
//! use rietveld_model::tree::{Model, NodeSchema, ObjectInfo, ParamInfo, SizeBounds};
//!
//! let mut model = Model::new();
//! model
//!     .register(NodeSchema::builder("Atom").param("Biso", ParamInfo::float(0.5)).build().unwrap())
//!     .unwrap();
//! model
//!     .register(
//!         NodeSchema::builder("Fit")
//!             .object_list("Atom", ObjectInfo::of("Atom"), SizeBounds::unbounded())
//!             .refine_session("Refine")
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let fit = model.create("Fit").unwrap();
//! for _ in 0..2 {
//!     let atom = model.create("Atom").unwrap();
//!     model.set(fit, "Atom", atom, None).unwrap();
//! }
//!
//! let created = model
//!     .set_constraint_by_path(fit, "Atom[:].Biso", "2*b", ConstraintOptions::new(), None)
//!     .unwrap();
//! assert_eq!(created.len(), 2);
//! assert_eq!(model.variables(fit).unwrap().len(), 1);
//! assert_eq!(model.constraint_state(created[0]).unwrap(), ConstraintState::Enabled);
//! model.check_consistency(fit).unwrap();
//! ```

pub mod bounds;
pub mod constraint;
pub mod formula;
mod session;
pub mod variable;

pub use bounds::{BoundaryMode, Bounds, BoundsError};
pub use constraint::{Constraint, ConstraintId, ConstraintOptions, ConstraintState, ConstraintTag};
pub use formula::{parse_engine_formula, parse_formula, render_engine_formula, EngineFormula, Formula};
pub use variable::VariableView;

use crate::tree::NodeSchema;

/// Kind name of the built-in refine set.
pub const REFINE_SET_KIND: &str = "RefineSet";

/// Kind name of the built-in variable.
pub const VARIABLE_KIND: &str = "Variable";

/// The child list of a refine set holding its variables.
pub const VARIABLE_LIST_FIELD: &str = "Variable";

pub(crate) fn builtin_schemas() -> Vec<NodeSchema> {
    vec![variable::refine_set_schema(), variable::variable_schema()]
}

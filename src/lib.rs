//! # rietveld-model
//!
//! `rietveld-model` is the data model of a Rietveld refinement: a tree of
//! typed parameter containers (fits, phases, atoms, patterns) together with
//! the constraint graph that ties selected parameters to refinement
//! variables.
//!
//! The library provides:
//! - Declarative node schemas with typed, range-checked parameters, bounded
//!   parameter lists and child-object fields
//! - Path addressing with list indices and ranges (`Phase[0].Atom[1:3].Biso`)
//! - A case-insensitive parameter index per tree
//! - Constraints, variables and refine sets with automatic variable
//!   lifecycle
//! - JSON snapshots and an `ndarray` hand-off for optimizers
//!
//! ## Basic Usage
//!
//! ```
//! use rietveld_model::{ConstraintOptions, Model, NodeSchema, ParamInfo, SizeBounds};
//! use rietveld_model::tree::ObjectInfo;
//!
//! let mut model = Model::new();
//! model
//!     .register(
//!         NodeSchema::builder("Atom")
//!             .param("Biso", ParamInfo::float(0.5))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//! model
//!     .register(
//!         NodeSchema::builder("Fit")
//!             .object_list("Atom", ObjectInfo::of("Atom"), SizeBounds::at_least(1))
//!             .refine_session("Refine")
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let fit = model.create("Fit").unwrap();
//! let atom = model.create("Atom").unwrap();
//! model.set(fit, "Atom", atom, None).unwrap();
//! assert_eq!(model.path(atom).unwrap(), "Atom[0]");
//!
//! let c = model
//!     .set_constraint(atom, "Biso", "b", ConstraintOptions::new().value(0.8), None)
//!     .unwrap();
//! assert_eq!(model.get_f64(atom, "Biso").unwrap(), 0.8);
//! assert!(model.make_formula(c).unwrap().ends_with("*b"));
//! ```

pub mod config;
pub mod error;
pub mod refine;
pub mod tree;

mod arena;

pub use arena::Handle;
pub use config::ModelConfig;
pub use error::{ErrorCategory, ModelError, Result};
pub use refine::{Bounds, ConstraintId, ConstraintOptions, ConstraintState};
pub use tree::{
    Assign, Entry, ListIndex, Located, Model, NodeId, NodeSchema, ParamInfo, Resolved, SizeBounds,
    Value,
};

/// Version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

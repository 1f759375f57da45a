//! Hierarchical parameter trees
//!
//! Node kinds are declared with [`NodeSchema`] and registered with a
//! [`Model`], which owns every node. Nodes are addressed by [`NodeId`] and
//! read and written either field by field ([`Model::get`], [`Model::set`])
//! or through dotted paths with list indices ([`Model::get_by_path`],
//! [`Model::set_by_path`]).
//!
//! # Example
//!
//! ```
//! use rietveld_model::tree::{Model, NodeSchema, ObjectInfo, ParamInfo, SizeBounds};
//!
//! let mut model = Model::new();
//! model
//!     .register(
//!         NodeSchema::builder("Phase")
//!             .param("Name", ParamInfo::string(""))
//!             .param_list("Cell", ParamInfo::float(1.0), SizeBounds::exactly(3))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let phase = model.create("Phase").unwrap();
//! for a in [5.43, 5.43, 5.43] {
//!     model.set(phase, "Cell", a, None).unwrap();
//! }
//! model.set_by_path(phase, "Cell[1:3]", 6.0).unwrap();
//!
//! let cell = model.get_by_path(phase, "Cell").unwrap().into_values();
//! assert_eq!(cell.len(), 3);
//! assert_eq!(cell[2].as_f64(), Some(6.0));
//! assert_eq!(model.list_parameters(phase, "").unwrap()[0], "Name");
//! ```

mod bounded;
mod extend;
mod global_index;
mod index;
mod model;
pub(crate) mod node;
mod path;
mod schema;
mod snapshot;
mod value;

pub use bounded::{BoundedList, ListItem};
pub use global_index::GlobalIndex;
pub use index::{slice_positions, ListIndex};
pub use model::{Model, ValidationReport};
pub use node::{Assign, Entry, Located, NodeId, NodeTag, Resolved};
pub use path::{join_path, parse_path, PathSegment};
pub use schema::{
    FieldDescriptor, NodeSchema, NodeSchemaBuilder, ObjectInfo, ParamInfo, ParamType, SizeBounds,
};
pub use snapshot::{ConstraintSnapshot, NodeSnapshot};
pub use value::Value;

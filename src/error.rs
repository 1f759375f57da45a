use crate::refine::bounds::BoundsError;
use thiserror::Error;

/// Broad grouping of [`ModelError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Addressing, sizing and ownership problems in the tree.
    Structural,
    /// A value or node of the wrong type.
    Type,
    /// Problems in the constraint/variable graph.
    Graph,
    /// I/O and serialization failures.
    Io,
}

/// Error types for the rietveld-model library.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The node kind does not declare the requested field.
    #[error("Class '{kind}' does not have '{field}'")]
    FieldNotFound { kind: String, field: String },

    /// An index was supplied for a field that is not a list, or an index of
    /// the wrong form was used.
    #[error("Wrong index for '{field}': {message}")]
    WrongIndexKind { field: String, message: String },

    /// Appending to a list that is already at its maximum size.
    #[error("The size of '{field}' exceeds the limit: {max}")]
    SizeLimitExceeded { field: String, max: usize },

    /// An identity index named a node that is not in the list.
    #[error("'{field}' has no such object")]
    NotAMember { field: String },

    /// A single position outside the current list.
    #[error("Index {index} is out of range for '{field}' of length {len}")]
    IndexOutOfRange { field: String, index: isize, len: usize },

    /// The path text could not be parsed.
    #[error("Invalid format for a parameter path '{path}': {message}")]
    InvalidPathSyntax { path: String, message: String },

    /// `set_by_path` was called with an empty path.
    #[error("Path is empty")]
    EmptyPath,

    /// The node already has an owner.
    #[error("Node '{node}' is already attached to a parent")]
    AlreadyAttached { node: String },

    /// Attaching the node would make it its own ancestor.
    #[error("Attaching a node beneath itself would create a cycle")]
    WouldCreateCycle,

    /// A node handle that no longer refers to a live node.
    #[error("Node handle is stale")]
    StaleNode,

    /// A constraint handle that no longer refers to a live constraint.
    #[error("Constraint handle is stale")]
    StaleConstraint,

    /// No schema is registered for the kind.
    #[error("Unknown node kind '{kind}'")]
    UnknownKind { kind: String },

    /// The schema declaration itself is inconsistent.
    #[error("Invalid schema for '{kind}': {message}")]
    InvalidSchema { kind: String, message: String },

    /// A value failed the field's type conversion.
    #[error("Type conversion error for '{field}': {message}")]
    TypeConversion { field: String, message: String },

    /// A child node of a kind the field does not accept.
    #[error("'{field}' expects a '{expected}', but a '{found}' is received")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// No refinement session is reachable from the node.
    #[error("The refine is not available for '{path}'")]
    RefinementUnavailable { path: String },

    /// The three-way link between constraint, variable and refine set is broken.
    #[error("Dangling variable reference: {message}")]
    DanglingVariableReference { message: String },

    /// The constraint has no variable.
    #[error("Constraint '{constraint}' has no variable")]
    Unlinked { constraint: String },

    /// An array handed back from an optimizer has the wrong length.
    #[error("Expected {expected} values, got {found}")]
    ArrayLength { expected: usize, found: usize },

    /// Invalid variable bounds.
    #[error("Bounds error: {0}")]
    Bounds(#[from] BoundsError),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// The group this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FieldNotFound { .. }
            | Self::WrongIndexKind { .. }
            | Self::SizeLimitExceeded { .. }
            | Self::NotAMember { .. }
            | Self::IndexOutOfRange { .. }
            | Self::InvalidPathSyntax { .. }
            | Self::EmptyPath
            | Self::AlreadyAttached { .. }
            | Self::WouldCreateCycle
            | Self::StaleNode
            | Self::StaleConstraint
            | Self::UnknownKind { .. }
            | Self::InvalidSchema { .. } => ErrorCategory::Structural,
            Self::TypeConversion { .. } | Self::TypeMismatch { .. } | Self::Bounds(_) => {
                ErrorCategory::Type
            }
            Self::RefinementUnavailable { .. }
            | Self::DanglingVariableReference { .. }
            | Self::Unlinked { .. }
            | Self::ArrayLength { .. } => ErrorCategory::Graph,
            Self::Io(_) | Self::Json(_) => ErrorCategory::Io,
        }
    }
}

/// Result type alias for rietveld-model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

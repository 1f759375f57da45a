//! Integration tests for the constraint graph
//!
//! These tests verify the constraint, variable and refine-set links as
//! nodes are constrained, moved, copied and removed.


// Variables and refine-set consistency
mod variable_tests;

//! Integration tests for variables and refine sets
//!
//! These tests verify variable lookup, bound flags, removal rules and the
//! consistency check.

use crate::test_helpers::{atom, fit_with_atoms, model};
use rietveld_model::refine::{BoundaryMode, Bounds, REFINE_SET_KIND, VARIABLE_KIND};
use rietveld_model::{ConstraintOptions, ModelError, NodeSchema, ParamInfo, Value};

#[test]
fn test_session_root_gets_refine_set() {
    let mut model = model();
    let fit = model.create("Fit").unwrap();

    let refine_set = model.refine_set_of(fit).unwrap().unwrap();
    assert_eq!(model.kind(refine_set).unwrap(), REFINE_SET_KIND);
    assert_eq!(model.get_node(fit, "Refine", None).unwrap(), Some(refine_set));
    assert!(model.variables(fit).unwrap().is_empty());

    // Reachable from any depth
    let fit = fit_with_atoms(&mut model, 1, 1);
    let a = atom(&model, fit, 0, 0);
    assert_eq!(model.refine_set_of(a).unwrap(), model.refine_set_of(fit).unwrap());

    // And not from a detached node
    let lone = model.create("Atom").unwrap();
    assert_eq!(model.refine_set_of(lone).unwrap(), None);
    assert!(matches!(
        model.variables(lone),
        Err(ModelError::RefinementUnavailable { .. })
    ));
}

#[test]
fn test_builtin_kinds_are_reserved() {
    let mut model = model();
    for kind in [VARIABLE_KIND, REFINE_SET_KIND] {
        let schema = NodeSchema::builder(kind)
            .param("x", ParamInfo::float(0.0))
            .build()
            .unwrap();
        assert!(matches!(
            model.register(schema),
            Err(ModelError::InvalidSchema { .. })
        ));
    }
    assert!(model.schema(VARIABLE_KIND).unwrap().field("value").is_some());
}

#[test]
fn test_find_variable_is_exact() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 1);
    let a = atom(&model, fit, 0, 0);
    model
        .set_constraint(a, "Biso", "2 * k ", ConstraintOptions::new(), None)
        .unwrap();

    assert!(model.find_variable(fit, "k").unwrap().is_some());
    assert!(model.find_variable(fit, "K").unwrap().is_none());

    // The refine set itself works as the lookup root
    let refine_set = model.refine_set_of(fit).unwrap().unwrap();
    assert!(model.find_variable(refine_set, "k").unwrap().is_some());
}

#[test]
fn test_variable_fields() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 1);
    let a = atom(&model, fit, 0, 0);
    model
        .set_constraint(a, "Biso", "k", ConstraintOptions::new(), None)
        .unwrap();
    let k = model.find_variable(fit, "k").unwrap().unwrap();

    let view = model.variable_view(k).unwrap();
    assert_eq!(view.name, "k");
    assert_eq!(view.value, 0.0);
    assert!(!view.use_min && !view.use_max);
    assert_eq!(view.boundary, BoundaryMode::Hard);
    assert_eq!(view.step, 1.0);
    assert_eq!(view.bounds(), Bounds::unbounded());

    // Setting a bound turns the bound on
    model.set_value(k, "min", 0.1).unwrap();
    model.set_value(k, "max", 2.0).unwrap();
    assert_eq!(model.get_value(k, "usemin").unwrap(), Value::Bool(true));
    assert_eq!(model.get_value(k, "usemax").unwrap(), Value::Bool(true));
    assert_eq!(model.variable_view(k).unwrap().bounds(), Bounds::new(0.1, 2.0).unwrap());

    // Only the declared boundary codes are accepted
    model.set_value(k, "IBound", 1).unwrap();
    assert_eq!(model.variable_view(k).unwrap().boundary, BoundaryMode::Periodic);
    assert!(matches!(
        model.set_value(k, "IBound", 2),
        Err(ModelError::TypeConversion { .. })
    ));

    // Turning a flag off again does not touch the bound
    model.set_value(k, "usemin", false).unwrap();
    assert_eq!(model.get_f64(k, "min").unwrap(), 0.1);
    assert_eq!(model.variable_view(k).unwrap().bounds().min, f64::NEG_INFINITY);
}

#[test]
fn test_inverted_bounds_collapse() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 1);
    let a = atom(&model, fit, 0, 0);
    model
        .set_constraint(a, "Biso", "k", ConstraintOptions::new(), None)
        .unwrap();
    let k = model.find_variable(fit, "k").unwrap().unwrap();

    model.set_value(k, "min", 3.0).unwrap();
    model.set_value(k, "max", 1.0).unwrap();
    let bounds = model.variable_view(k).unwrap().bounds();
    assert_eq!(bounds.min, 3.0);
    assert_eq!(bounds.max, 3.0);
}

#[test]
fn test_remove_variable_refuses_when_referenced() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 1);
    let a = atom(&model, fit, 0, 0);
    let c = model
        .set_constraint(a, "Biso", "k", ConstraintOptions::new(), None)
        .unwrap();
    let k = model.find_variable(fit, "k").unwrap().unwrap();

    assert!(!model.remove_variable(k).unwrap());
    assert!(model.contains(k));
    assert_eq!(model.constraint(c).unwrap().variable(), Some(k));
}

#[test]
fn test_consistency_detects_orphan_variable() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 1);
    let refine_set = model.refine_set_of(fit).unwrap().unwrap();

    // A variable placed by hand has no constraints
    let orphan = model.create(VARIABLE_KIND).unwrap();
    model.set_value(orphan, "name", "orphan").unwrap();
    model.set(refine_set, "Variable", orphan, None).unwrap();

    match model.check_consistency(fit) {
        Err(ModelError::DanglingVariableReference { message }) => {
            assert!(message.contains("orphan"));
        }
        other => panic!("Expected DanglingVariableReference, got {:?}", other),
    }

    // Which remove_variable takes out
    assert!(model.remove_variable(orphan).unwrap());
    assert!(!model.contains(orphan));
    model.check_consistency(fit).unwrap();
}

#[test]
fn test_variables_keep_creation_order() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 3);
    for (i, name) in ["c", "a", "b"].iter().enumerate() {
        let a = atom(&model, fit, 0, i);
        model
            .set_constraint(a, "Biso", name, ConstraintOptions::new(), None)
            .unwrap();
    }

    let names: Vec<String> = model
        .variables(fit)
        .unwrap()
        .into_iter()
        .map(|v| model.variable_name(v).unwrap())
        .collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

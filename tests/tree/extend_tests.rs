//! Integration tests for promoting nodes to derived kinds
//!
//! These tests verify that `extend` moves content, children and constraints
//! into the derived node and puts it in the base node's place.

use crate::test_helpers::{atom, fit_with_atoms, model};
use rietveld_model::tree::ObjectInfo;
use rietveld_model::{ConstraintOptions, Located, Model, ModelError, NodeSchema, ParamInfo, SizeBounds, Value};

/// An `Atom` kind with an extra anisotropic displacement parameter.
fn register_aniso(model: &mut Model) {
    let schema = NodeSchema::builder("AtomAniso")
        .extends("Atom")
        .param("Name", ParamInfo::string(""))
        .param("Biso", ParamInfo::float(0.5))
        .param("Occ", ParamInfo::float_range(1.0, Some(0.0), Some(1.0)))
        .param_list("X", ParamInfo::float(0.0), SizeBounds::new(0, Some(3)))
        .param("B11", ParamInfo::float(0.0))
        .build()
        .unwrap();
    model.register(schema).unwrap();
}

#[test]
fn test_extend_singleton_child() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 1);
    let pattern = model.get_node(fit, "Pattern", None).unwrap().unwrap();
    model.set_value(pattern, "Scale", 2.5).unwrap();
    model
        .set_constraint(pattern, "Scale", "s", ConstraintOptions::new(), None)
        .unwrap();

    let cw = model.create("PatternCW").unwrap();
    model.set_value(cw, "Lambda", 1.2).unwrap();
    assert!(model.extend(cw, pattern).unwrap());

    assert_eq!(model.get_node(fit, "Pattern", None).unwrap(), Some(cw));
    assert_eq!(model.parent(cw).unwrap(), Some(fit));
    assert_eq!(model.path(cw).unwrap(), "Pattern");
    assert!(!model.contains(pattern));
    assert_eq!(model.get_f64(cw, "Scale").unwrap(), 2.5);
    assert_eq!(model.get_f64(cw, "Lambda").unwrap(), 1.2);

    // The constraint follows its slot
    let c = model.get_constraint(cw, "Scale", None).unwrap().unwrap();
    assert_eq!(model.constraint(c).unwrap().owner(), cw);
    assert_eq!(model.constraint_path(c).unwrap(), "Pattern.Scale");
    let s = model.find_variable(fit, "s").unwrap().unwrap();
    assert_eq!(model.variable_constraints(s).unwrap(), vec![c]);
    model.check_consistency(fit).unwrap();

    // The index picks up the new fields
    assert_eq!(
        model.locate_parameter(fit, "lambda").unwrap(),
        Located::One(cw, "Lambda".to_string())
    );
}

#[test]
fn test_extend_list_member_keeps_position() {
    let mut model = model();
    register_aniso(&mut model);
    let fit = fit_with_atoms(&mut model, 1, 3);
    let phase = model.children(fit, "Phase").unwrap()[0];
    let (a0, a1, a2) = (atom(&model, fit, 0, 0), atom(&model, fit, 0, 1), atom(&model, fit, 0, 2));
    for x in [0.1, 0.2] {
        model.set(a1, "X", x, None).unwrap();
    }
    model
        .set_constraint(a0, "Biso", "3*k", ConstraintOptions::new(), None)
        .unwrap();
    model
        .set_constraint(a1, "Biso", "2*k", ConstraintOptions::new(), None)
        .unwrap();
    model
        .set_constraint(a1, "X", "x", ConstraintOptions::new(), Some(1))
        .unwrap();

    let aniso = model.create("AtomAniso").unwrap();
    assert!(model.extend(aniso, a1).unwrap());

    assert_eq!(model.children(phase, "Atom").unwrap(), vec![a0, aniso, a2]);
    assert_eq!(model.path(aniso).unwrap(), "Phase[0].Atom[1]");
    assert_eq!(model.get_value(aniso, "Name").unwrap(), Value::from("A1"));
    assert_eq!(
        model.param_values(aniso, "X").unwrap(),
        vec![Value::Float(0.1), Value::Float(0.2)]
    );
    assert_eq!(model.get_f64(aniso, "B11").unwrap(), 0.0);

    let x = model.get_constraint(aniso, "X", Some(1)).unwrap().unwrap();
    assert_eq!(model.constraint(x).unwrap().formula(), "x");
    let k = model.find_variable(fit, "k").unwrap().unwrap();
    assert_eq!(model.variable_constraints(k).unwrap().len(), 2);
    assert_eq!(model.variables(fit).unwrap().len(), 2);
    model.check_consistency(fit).unwrap();
}

#[test]
fn test_extend_requires_derived_kind() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 1);
    let pattern = model.get_node(fit, "Pattern", None).unwrap().unwrap();
    let before = model.node_count();

    // Unrelated kinds
    let atom = model.create("Atom").unwrap();
    assert!(!model.extend(atom, pattern).unwrap());

    // A base cannot take the place of its derived kind
    let cw = model.create("PatternCW").unwrap();
    model.set(fit, "Pattern", cw, None).unwrap();
    assert!(!model.extend(pattern, cw).unwrap());
    assert_eq!(model.get_node(fit, "Pattern", None).unwrap(), Some(cw));
    assert_eq!(model.node_count(), before + 2);

    // The derived node must be detached
    let other = fit_with_atoms(&mut model, 1, 1);
    let placed = model.create("PatternCW").unwrap();
    model.set(other, "Pattern", placed, None).unwrap();
    let plain = model.create("Pattern").unwrap();
    model.set(fit, "Pattern", plain, None).unwrap();
    assert!(matches!(
        model.extend(placed, plain),
        Err(ModelError::AlreadyAttached { .. })
    ));
}

#[test]
fn test_extend_checks_fields_first() {
    let mut model = model();
    let lacking = NodeSchema::builder("PatternBare")
        .extends("Pattern")
        .param("Lambda", ParamInfo::float(1.0))
        .build()
        .unwrap();
    let reshaped = NodeSchema::builder("PatternList")
        .extends("Pattern")
        .param_list("Scale", ParamInfo::float(1.0), SizeBounds::unbounded())
        .build()
        .unwrap();
    model.register(lacking).unwrap();
    model.register(reshaped).unwrap();

    let fit = fit_with_atoms(&mut model, 1, 1);
    let pattern = model.get_node(fit, "Pattern", None).unwrap().unwrap();

    let bare = model.create("PatternBare").unwrap();
    match model.extend(bare, pattern) {
        Err(ModelError::FieldNotFound { kind, field }) => {
            assert_eq!(kind, "PatternBare");
            assert_eq!(field, "Scale");
        }
        other => panic!("Expected FieldNotFound, got {:?}", other),
    }
    let listed = model.create("PatternList").unwrap();
    assert!(matches!(
        model.extend(listed, pattern),
        Err(ModelError::TypeMismatch { .. })
    ));

    // Nothing moved
    assert!(model.contains(pattern));
    assert_eq!(model.get_node(fit, "Pattern", None).unwrap(), Some(pattern));
    assert_eq!(model.parent(bare).unwrap(), None);
}

#[test]
fn test_extend_session_root() {
    let mut model = model();
    let schema = NodeSchema::builder("FitTOF")
        .extends("Fit")
        .param("NCY", ParamInfo::int(10))
        .param("Dtt1", ParamInfo::float(0.0))
        .object_list("Phase", ObjectInfo::of("Phase"), SizeBounds::unbounded())
        .object("Pattern", ObjectInfo::of("Pattern"))
        .refine_session("Refine")
        .build()
        .unwrap();
    model.register(schema).unwrap();

    let fit = fit_with_atoms(&mut model, 1, 2);
    model.set_value(fit, "NCY", 25).unwrap();
    let a = atom(&model, fit, 0, 1);
    model
        .set_constraint(a, "Biso", "b", ConstraintOptions::new(), None)
        .unwrap();
    let refine_set = model.refine_set_of(fit).unwrap().unwrap();

    let tof = model.create("FitTOF").unwrap();
    let before = model.node_count();
    assert!(model.extend(tof, fit).unwrap());

    // The base and the derived node's own refine set are freed
    assert_eq!(model.node_count(), before - 2);
    assert_eq!(model.refine_set_of(a).unwrap(), Some(refine_set));
    assert_eq!(model.root(a).unwrap(), tof);
    assert_eq!(model.get_value(tof, "NCY").unwrap(), Value::Int(25));
    assert_eq!(model.path(a).unwrap(), "Phase[0].Atom[1]");
    assert_eq!(model.variables(tof).unwrap().len(), 1);
    model.check_consistency(tof).unwrap();

    match model.locate_parameter(tof, "biso").unwrap() {
        Located::Many(owners, _) => assert!(owners.contains(&a)),
        other => panic!("Expected Many, got {:?}", other),
    }
}

//! Integration tests for snapshots and duplication
//!
//! These tests verify that copies keep their values and constraint settings
//! and that constraints relink once a copy sits below a session.

use crate::test_helpers::{atom, fit_with_atoms, model};
use rietveld_model::refine::ConstraintState;
use rietveld_model::{ConstraintOptions, Model, NodeId, Value};
use std::collections::BTreeSet;

/// A fit with one phase of two atoms sharing `k`, and a cell constraint.
fn constrained_fit(model: &mut Model) -> NodeId {
    let fit = fit_with_atoms(model, 1, 2);
    let phase = model.children(fit, "Phase").unwrap()[0];
    for a in [5.43, 5.43, 5.43] {
        model.set(phase, "Cell", a, None).unwrap();
    }
    let (a0, a1) = (atom(model, fit, 0, 0), atom(model, fit, 0, 1));
    model
        .set_constraint(a0, "Biso", "2*k", ConstraintOptions::new().value(0.8), None)
        .unwrap();
    model
        .set_constraint(a1, "Biso", "3*k", ConstraintOptions::new(), None)
        .unwrap();
    model
        .set_constraint(phase, "Cell", "a", ConstraintOptions::new().damping(0.5), Some(0))
        .unwrap();
    fit
}

fn variable_names(model: &Model, node: NodeId) -> BTreeSet<String> {
    model
        .variables(node)
        .unwrap()
        .into_iter()
        .map(|v| model.variable_name(v).unwrap())
        .collect()
}

#[test]
fn test_snapshot_skips_refine_set() {
    let mut model = model();
    let fit = constrained_fit(&mut model);
    let snapshot = model.snapshot(fit).unwrap();

    assert_eq!(snapshot.kind, "Fit");
    assert!(!snapshot.objects.contains_key("Refine"));
    assert_eq!(snapshot.params.get("NCY"), Some(&Value::Int(10)));

    let phase = snapshot.child("Phase", Some(0)).unwrap();
    assert_eq!(phase.param_lists["Cell"].len(), 3);
    assert_eq!(phase.constraints.len(), 1);
    assert_eq!(phase.constraints[0].index, Some(0));
    assert_eq!(phase.constraints[0].damping, 0.5);

    let atom = phase.child("Atom", Some(0)).unwrap();
    assert_eq!(atom.constraints[0].formula, "2*k");
    assert!(atom.constraints[0].on);
    assert!(phase.child("Atom", Some(5)).is_err());

    let json = model.to_json(fit).unwrap();
    assert!(json.contains("\"kind\": \"Fit\""));
    assert!(!json.contains("RefineSet"));
}

#[test]
fn test_json_round_trip_relinks_constraints() {
    let mut model = model();
    let fit = constrained_fit(&mut model);
    let json = model.to_json(fit).unwrap();

    let copy = model.from_json(&json).unwrap();

    assert_eq!(model.parent(copy).unwrap(), None);
    assert_eq!(
        model.list_parameters(copy, "").unwrap(),
        model.list_parameters(fit, "").unwrap()
    );
    assert_eq!(model.get_f64(atom(&model, copy, 0, 0), "Biso").unwrap(), 0.8);

    // The copy has its own refine set with the same variables
    assert_eq!(variable_names(&model, copy), variable_names(&model, fit));
    assert_ne!(model.refine_set_of(copy).unwrap(), model.refine_set_of(fit).unwrap());
    assert_eq!(model.refine_constraints(copy).unwrap().len(), 3);
    model.check_consistency(copy).unwrap();
    model.check_consistency(fit).unwrap();

    let c = model
        .get_constraint(atom(&model, copy, 0, 1), "Biso", None)
        .unwrap()
        .unwrap();
    assert_eq!(model.constraint(c).unwrap().dev(), 3.0);
    assert_eq!(model.constraint_state(c).unwrap(), ConstraintState::Enabled);
}

#[test]
fn test_duplicate_waits_for_session() {
    let mut model = model();
    let fit = constrained_fit(&mut model);
    let phase = model.children(fit, "Phase").unwrap()[0];
    let second = model
        .get_constraint(atom(&model, fit, 0, 1), "Biso", None)
        .unwrap()
        .unwrap();
    model.turn_refine_off(second).unwrap();

    let copy = model.duplicate(phase).unwrap();
    assert_eq!(model.parent(copy).unwrap(), None);

    // Detached: settings kept, nothing linked
    let copied_atoms = model.children(copy, "Atom").unwrap();
    let pending = model.get_constraint(copied_atoms[0], "Biso", None).unwrap().unwrap();
    assert_eq!(model.constraint_state(pending).unwrap(), ConstraintState::Unlinked);
    assert_eq!(model.constraint(pending).unwrap().formula(), "2*k");
    let k = model.find_variable(fit, "k").unwrap().unwrap();
    assert_eq!(model.variable_constraints(k).unwrap().len(), 2);

    // Attached: linked into the existing variables, disabled state kept
    model.set(fit, "Phase", copy, None).unwrap();
    assert_eq!(model.variable_constraints(k).unwrap().len(), 4);
    assert_eq!(model.variables(fit).unwrap().len(), 2);
    assert_eq!(model.constraint_state(pending).unwrap(), ConstraintState::Enabled);

    let copied_off = model.get_constraint(copied_atoms[1], "Biso", None).unwrap().unwrap();
    assert_eq!(model.constraint_state(copied_off).unwrap(), ConstraintState::Disabled);
    model.check_consistency(fit).unwrap();
}

#[test]
fn test_save_and_load_json_file() {
    let mut model = model();
    let fit = constrained_fit(&mut model);
    let phase = model.children(fit, "Phase").unwrap()[0];

    let path = std::env::temp_dir().join(format!("rietveld_model_phase_{}.json", std::process::id()));
    model.save_json(phase, &path).unwrap();
    let loaded = model.load_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(model.kind(loaded).unwrap(), "Phase");
    assert_eq!(model.list_len(loaded, "Atom").unwrap(), 2);
    assert_eq!(model.param_values(loaded, "Cell").unwrap().len(), 3);
    let cell = model.get_constraint(loaded, "Cell", Some(0)).unwrap().unwrap();
    assert_eq!(model.constraint(cell).unwrap().formula(), "a");
    assert_eq!(model.constraint_state(cell).unwrap(), ConstraintState::Unlinked);
}

#[test]
fn test_failed_restore_leaves_nothing_behind() {
    let mut model = model();
    let fit = constrained_fit(&mut model);
    let phase = model.children(fit, "Phase").unwrap()[0];

    let mut snapshot = model.snapshot(phase).unwrap();
    snapshot.object_lists.get_mut("Atom").unwrap()[1]
        .params
        .insert("Occ".to_string(), Value::Float(2.0));

    let before = model.node_count();
    assert!(model.restore(&snapshot).is_err());
    assert_eq!(model.node_count(), before);

    assert!(model.from_json("{ not json").is_err());
    assert_eq!(model.node_count(), before);
}

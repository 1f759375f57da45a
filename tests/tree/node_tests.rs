//! Integration tests for field access and node ownership
//!
//! These tests verify defaults, type conversion, attachment rules, list
//! sizing, clearing and deletion.

use crate::test_helpers::{atom, fit_with_atoms, model, phase_with_atoms};
use rietveld_model::{ConstraintOptions, ListIndex, ModelError, Value};

#[test]
fn test_create_uses_defaults() {
    let mut model = model();
    let atom = model.create("Atom").unwrap();

    assert_eq!(model.kind(atom).unwrap(), "Atom");
    assert_eq!(model.get_f64(atom, "Biso").unwrap(), 0.5);
    assert_eq!(model.get_f64(atom, "Occ").unwrap(), 1.0);
    assert_eq!(model.get_value(atom, "Name").unwrap(), Value::Str(String::new()));
    assert_eq!(model.list_len(atom, "X").unwrap(), 0);
    assert_eq!(model.parent(atom).unwrap(), None);
    assert_eq!(model.path(atom).unwrap(), "");

    match model.create("Nothing") {
        Err(ModelError::UnknownKind { kind }) => assert_eq!(kind, "Nothing"),
        other => panic!("Expected UnknownKind, got {:?}", other),
    }
}

#[test]
fn test_set_converts_by_declared_type() {
    let mut model = model();
    let atom = model.create("Atom").unwrap();

    // Integers widen into float fields
    model.set_value(atom, "Biso", 2).unwrap();
    assert_eq!(model.get_value(atom, "Biso").unwrap(), Value::Float(2.0));

    // Strings do not
    assert!(matches!(
        model.set_value(atom, "Biso", "large"),
        Err(ModelError::TypeConversion { .. })
    ));

    // Range checks keep the old value
    assert!(matches!(
        model.set_value(atom, "Occ", 1.5),
        Err(ModelError::TypeConversion { .. })
    ));
    assert_eq!(model.get_f64(atom, "Occ").unwrap(), 1.0);

    // Scalars take no index
    assert!(matches!(
        model.set(atom, "Biso", 1.0, Some(ListIndex::Single(0))),
        Err(ModelError::WrongIndexKind { .. })
    ));

    match model.set_value(atom, "Uiso", 1.0) {
        Err(ModelError::FieldNotFound { kind, field }) => {
            assert_eq!(kind, "Atom");
            assert_eq!(field, "Uiso");
        }
        other => panic!("Expected FieldNotFound, got {:?}", other),
    }
}

#[test]
fn test_attach_sets_parent_and_path() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 2, 2);
    let a = atom(&model, fit, 1, 1);
    let phase = model.parent(a).unwrap().unwrap();

    assert_eq!(model.key(a).unwrap(), Some("Atom"));
    assert_eq!(model.name(a).unwrap(), "Atom[1]");
    assert_eq!(model.path(a).unwrap(), "Phase[1].Atom[1]");
    assert_eq!(model.root(a).unwrap(), fit);
    assert!(model.is_descendant(a, fit).unwrap());
    assert!(model.is_descendant(a, phase).unwrap());
    assert!(!model.is_descendant(phase, a).unwrap());

    let pattern = model.get_node(fit, "Pattern", None).unwrap().unwrap();
    assert_eq!(model.name(pattern).unwrap(), "Pattern");
}

#[test]
fn test_object_field_checks_kind() {
    let mut model = model();
    let fit = model.create("Fit").unwrap();
    let atom = model.create("Atom").unwrap();

    match model.set(fit, "Pattern", atom, None) {
        Err(ModelError::TypeMismatch {
            field,
            expected,
            found,
        }) => {
            assert_eq!(field, "Pattern");
            assert_eq!(expected, "Pattern");
            assert_eq!(found, "Atom");
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
    assert_eq!(model.parent(atom).unwrap(), None);

    // A kind extending the accepted kind is accepted
    let cw = model.create("PatternCW").unwrap();
    model.set(fit, "Pattern", cw, None).unwrap();
    assert_eq!(model.get_node(fit, "Pattern", None).unwrap(), Some(cw));

    // Values do not go into object fields
    assert!(matches!(
        model.set(fit, "Pattern", 1.0, None),
        Err(ModelError::TypeMismatch { .. })
    ));
}

#[test]
fn test_replacing_child_detaches_old() {
    let mut model = model();
    let fit = model.create("Fit").unwrap();
    let first = model.create("Pattern").unwrap();
    let second = model.create("Pattern").unwrap();

    model.set(fit, "Pattern", first, None).unwrap();
    model.set(fit, "Pattern", second, None).unwrap();

    assert_eq!(model.parent(first).unwrap(), None);
    assert_eq!(model.key(first).unwrap(), None);
    assert_eq!(model.parent(second).unwrap(), Some(fit));

    // The detached node is still alive until destroyed
    assert!(model.contains(first));
    let before = model.node_count();
    model.destroy(first).unwrap();
    assert!(!model.contains(first));
    assert_eq!(model.node_count(), before - 1);

    // Re-assigning the current child is a no-op
    model.set(fit, "Pattern", second, None).unwrap();
    assert_eq!(model.parent(second).unwrap(), Some(fit));
}

#[test]
fn test_destroy_requires_detached_node() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 1);
    let a = atom(&model, fit, 0, 0);

    assert!(matches!(
        model.destroy(a),
        Err(ModelError::AlreadyAttached { .. })
    ));

    // Destroying the root frees the whole tree
    let members = model.subtree(fit).unwrap();
    model.destroy(fit).unwrap();
    for member in members {
        assert!(!model.contains(member));
    }
    assert!(matches!(model.kind(a), Err(ModelError::StaleNode)));
}

#[test]
fn test_single_owner() {
    let mut model = model();
    let first = phase_with_atoms(&mut model, 1);
    let second = phase_with_atoms(&mut model, 1);
    let a = model.children(first, "Atom").unwrap()[0];

    match model.set(second, "Atom", a, None) {
        Err(ModelError::AlreadyAttached { .. }) => {}
        other => panic!("Expected AlreadyAttached, got {:?}", other),
    }
    assert_eq!(model.parent(a).unwrap(), Some(first));
    assert_eq!(model.list_len(second, "Atom").unwrap(), 1);
}

#[test]
fn test_cycle_is_rejected() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 1);
    let phase = model.children(fit, "Phase").unwrap()[0];

    // A tree root cannot go below its own descendants
    assert!(matches!(
        model.set(phase, "Atom", fit, None),
        Err(ModelError::WouldCreateCycle)
    ));
    assert_eq!(model.parent(fit).unwrap(), None);
    assert_eq!(model.list_len(phase, "Atom").unwrap(), 1);

    // Nor below itself
    let lone = model.create("Phase").unwrap();
    assert!(matches!(
        model.set(lone, "Atom", lone, None),
        Err(ModelError::WouldCreateCycle)
    ));
}

#[test]
fn test_list_maximum_size() {
    let mut model = model();
    let phase = phase_with_atoms(&mut model, 4);

    let extra = model.create("Atom").unwrap();
    match model.set(phase, "Atom", extra, None) {
        Err(ModelError::SizeLimitExceeded { field, max }) => {
            assert_eq!(field, "Atom");
            assert_eq!(max, 4);
        }
        other => panic!("Expected SizeLimitExceeded, got {:?}", other),
    }
    assert_eq!(model.list_len(phase, "Atom").unwrap(), 4);
    assert_eq!(model.parent(extra).unwrap(), None);

    // Parameter lists are bounded the same way
    for x in [0.1, 0.2, 0.3] {
        model.set(extra, "X", x, None).unwrap();
    }
    assert!(matches!(
        model.set(extra, "X", 0.4, None),
        Err(ModelError::SizeLimitExceeded { .. })
    ));
}

#[test]
fn test_replace_list_member_by_position() {
    let mut model = model();
    let phase = phase_with_atoms(&mut model, 3);
    let old = model.children(phase, "Atom").unwrap()[1];
    let new = model.create("Atom").unwrap();

    model
        .set(phase, "Atom", new, Some(ListIndex::Single(-2)))
        .unwrap();
    let atoms = model.children(phase, "Atom").unwrap();
    assert_eq!(atoms.len(), 3);
    assert_eq!(atoms[1], new);
    assert_eq!(model.parent(old).unwrap(), None);

    // One node cannot fill several positions
    let another = model.create("Atom").unwrap();
    assert!(matches!(
        model.set(phase, "Atom", another, Some(ListIndex::full_range())),
        Err(ModelError::AlreadyAttached { .. })
    ));

    // Parameter lists replace values in place
    model.set(phase, "Cell", 5.0, None).unwrap();
    model.set(phase, "Cell", 6.0, None).unwrap();
    model.set(phase, "Cell", 7.0, Some(ListIndex::Single(0))).unwrap();
    assert_eq!(
        model.param_values(phase, "Cell").unwrap(),
        vec![Value::Float(7.0), Value::Float(6.0)]
    );
}

#[test]
fn test_validation_reports_missing_members() {
    let mut model = model();
    let fit = model.create("Fit").unwrap();
    let phase = model.create("Phase").unwrap();
    model.set(fit, "Phase", phase, None).unwrap();

    let report = model.validation_report(fit).unwrap();
    assert!(!report.is_valid());
    assert!(report
        .messages
        .iter()
        .any(|m| m.contains("object Pattern not set-up")));
    assert!(report
        .messages
        .iter()
        .any(|m| m.contains("list Atom has 0 members")));

    let pattern = model.create("Pattern").unwrap();
    model.set(fit, "Pattern", pattern, None).unwrap();
    let atom = model.create("Atom").unwrap();
    model.set(phase, "Atom", atom, None).unwrap();
    assert!(model.validate(fit).unwrap());

    model.delete(phase, "Atom", Some(ListIndex::ByIdentity(atom))).unwrap();
    assert!(!model.validate(fit).unwrap());
}

#[test]
fn test_clear_empties_children_and_lists() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 2);
    let phase = model.children(fit, "Phase").unwrap()[0];
    let atoms = model.children(phase, "Atom").unwrap();
    model.set_value(phase, "Name", "Si").unwrap();
    model.set(phase, "Cell", 5.43, None).unwrap();
    model
        .set_constraint(atoms[0], "Biso", "b", ConstraintOptions::new(), None)
        .unwrap();
    assert_eq!(model.variables(fit).unwrap().len(), 1);

    model.clear(phase).unwrap();

    assert!(model.children(phase, "Atom").unwrap().is_empty());
    assert_eq!(model.list_len(phase, "Cell").unwrap(), 0);
    assert_eq!(model.get_value(phase, "Name").unwrap(), Value::from("Si"));
    for a in atoms {
        assert_eq!(model.parent(a).unwrap(), None);
        assert!(model.constraints_of(a).unwrap().is_empty());
    }
    // The unused variable went with the constraint
    assert!(model.variables(fit).unwrap().is_empty());
    model.check_consistency(fit).unwrap();
}

#[test]
fn test_delete_forms() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 4);
    let phase = model.children(fit, "Phase").unwrap()[0];
    let atoms = model.children(phase, "Atom").unwrap();

    // By position
    model.delete(phase, "Atom", Some(ListIndex::Single(0))).unwrap();
    assert_eq!(model.parent(atoms[0]).unwrap(), None);

    // By identity
    model.delete(phase, "Atom", Some(ListIndex::ByIdentity(atoms[2]))).unwrap();
    assert_eq!(model.children(phase, "Atom").unwrap(), vec![atoms[1], atoms[3]]);

    // A node that is not a member
    assert!(matches!(
        model.delete(phase, "Atom", Some(ListIndex::ByIdentity(atoms[0]))),
        Err(ModelError::NotAMember { .. })
    ));

    // A singleton child
    let pattern = model.get_node(fit, "Pattern", None).unwrap().unwrap();
    model.delete(fit, "Pattern", None).unwrap();
    assert_eq!(model.get_node(fit, "Pattern", None).unwrap(), None);
    assert_eq!(model.parent(pattern).unwrap(), None);

    // A scalar goes back to its default
    model.set_value(fit, "NCY", 30).unwrap();
    model.delete(fit, "NCY", None).unwrap();
    assert_eq!(model.get_value(fit, "NCY").unwrap(), Value::Int(10));

    // Everything in a list
    model.delete(phase, "Atom", None).unwrap();
    assert_eq!(model.list_len(phase, "Atom").unwrap(), 0);
}

#[test]
fn test_list_parameters_order() {
    let mut model = model();
    let fit = fit_with_atoms(&mut model, 1, 1);
    let phase = model.children(fit, "Phase").unwrap()[0];
    model.set(phase, "Cell", 5.43, None).unwrap();
    model.set(phase, "Cell", 5.43, None).unwrap();
    let a = atom(&model, fit, 0, 0);
    model
        .set_constraint(a, "Biso", "b", ConstraintOptions::new(), None)
        .unwrap();

    let names = model.list_parameters(fit, "").unwrap();
    assert_eq!(
        names,
        vec![
            "NCY",
            "Pattern.Scale",
            "Phase[0].Name",
            "Phase[0].Cell[0]",
            "Phase[0].Cell[1]",
            "Phase[0].Atom[0].Biso",
            "Phase[0].Atom[0].Name",
            "Phase[0].Atom[0].Occ",
        ]
    );

    // Every listed name resolves to a value
    for name in &names {
        let got = model.get_by_path(fit, name).unwrap();
        assert!(got.as_value().is_some(), "{} did not resolve to a value", name);
    }

    // The prefix is prepended verbatim
    let prefixed = model.list_parameters(phase, "p.").unwrap();
    assert_eq!(prefixed[0], "p.Name");
}

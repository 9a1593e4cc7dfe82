use super::assign;
use crate::error::RotationError;
use crate::rotation::{Assignment, Assignments, FILLER_TARGET};
use crate::sim::{AssignmentSpec, RotationSpec};
use crate::spell::catalog;
use std::collections::BTreeMap;

fn spec(spell: &str, target: Option<&str>) -> AssignmentSpec {
    AssignmentSpec {
        spell: spell.to_string(),
        rank: None,
        target: target.map(str::to_string),
        allow_fade: None,
        fade_at_stacks: None,
        queue: None,
    }
}

fn rotation_spec(assignments: Vec<AssignmentSpec>, filler: Option<AssignmentSpec>) -> RotationSpec {
    RotationSpec {
        name: "test".to_string(),
        description: None,
        assignments,
        filler,
        buffs: BTreeMap::new(),
    }
}

#[test]
fn assignment_defaults_from_spec() {
    let assignment =
        Assignment::from_spec(&spec(catalog::REJUVENATION, Some("tank"))).expect("assignment");
    assert!(assignment.allow_fade());
    assert_eq!(assignment.fade_at_stacks(), 1);
    assert!(!assignment.queue());
    assert_eq!(assignment.target(), "tank");
    assert_eq!(assignment.to_string(), "rejuvenation-13-tank");
    assert_eq!(assignment.key().to_string(), "rejuvenation-13-tank");
}

#[test]
fn filler_rejects_expire_policy_fields() {
    let mut filler = spec(catalog::REGROWTH, None);
    filler.fade_at_stacks = Some(2);
    let err = Assignments::from_spec(&rotation_spec(vec![], Some(filler)))
        .expect_err("filler with fade policy");
    assert!(matches!(err, RotationError::FillerExpirePolicy));

    let mut filler = spec(catalog::REGROWTH, None);
    filler.allow_fade = Some(false);
    assert!(Assignments::from_spec(&rotation_spec(vec![], Some(filler))).is_err());
}

#[test]
fn filler_target_defaults_to_filler_name() {
    let assignments = Assignments::from_spec(&rotation_spec(
        vec![spec(catalog::LIFEBLOOM, Some("tank"))],
        Some(spec(catalog::REGROWTH, None)),
    ))
    .expect("rotation");
    assert!(assignments.has_filler());
    assert_eq!(
        assignments.filler().map(|f| f.target()),
        Some(FILLER_TARGET)
    );
}

#[test]
fn unknown_spell_fails_before_scheduling() {
    let err = Assignments::from_spec(&rotation_spec(vec![spec("wild_growth", Some("raid"))], None))
        .expect_err("unknown spell");
    assert!(matches!(err, RotationError::UnknownSpell { .. }));
}

#[test]
fn duplicate_spell_and_target_is_rejected() {
    let err = Assignments::from_spec(&rotation_spec(
        vec![
            spec(catalog::REJUVENATION, Some("tank")),
            spec(catalog::LIFEBLOOM, Some("tank")),
            spec(catalog::REJUVENATION, Some("tank")),
        ],
        None,
    ))
    .expect_err("duplicate assignment");
    match err {
        RotationError::DuplicateAssignment { key } => assert_eq!(key, "rejuvenation-13-tank"),
        other => panic!("unexpected error {other}"),
    }

    // 同一法术落在不同目标上是允许的
    let assignments = Assignments::from_spec(&rotation_spec(
        vec![
            spec(catalog::REJUVENATION, Some("tank")),
            spec(catalog::REJUVENATION, Some("offtank")),
        ],
        None,
    ))
    .expect("distinct targets");
    assert_eq!(assignments.len(), 2);
}

#[test]
fn unknown_target_buff_is_rejected() {
    let mut rotation = rotation_spec(vec![spec(catalog::LIFEBLOOM, Some("tank"))], None);
    rotation
        .buffs
        .insert("tank".to_string(), vec!["blessing_of_light".to_string()]);
    let err = Assignments::from_spec(&rotation).expect_err("unknown buff");
    assert!(matches!(err, RotationError::UnknownModifier { .. }));
}

#[test]
fn priority_order_and_queue_subset() {
    let assignments = Assignments::new(vec![
        assign(catalog::LIFEBLOOM, "tank").with_queue(true),
        assign(catalog::REJUVENATION, "tank"),
        assign(catalog::REGROWTH, "offtank").with_queue(true),
    ]);
    let targets: Vec<&str> = assignments.iter().map(|a| a.target()).collect();
    assert_eq!(targets, ["tank", "tank", "offtank"]);
    let queued: Vec<String> = assignments.queue_eligible().map(|a| a.to_string()).collect();
    assert_eq!(queued, ["lifebloom-1-tank", "regrowth-10-offtank"]);
    assert!(assignments.buffs("tank").is_none());
}

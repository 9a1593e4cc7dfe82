use super::approx;
use crate::character::{
    Buffed, Caster, Character, ModifierOp, ModifierSet, ModifierSource, Stat, StatModifier, Talent,
    target_buff,
};
use crate::error::RotationError;

#[test]
fn gcd_defaults_to_hasted_global_cooldown() {
    let plain = Character::new("plain", 70);
    assert!(approx(plain.get_stat(Stat::Gcd), 1.5));
    let hasted = Character::new("hasted", 70).with_stat(Stat::SpellHaste, 0.5);
    assert!(approx(hasted.get_stat(Stat::Gcd), 1.0));
    let fixed = Character::new("fixed", 70).with_stat(Stat::Gcd, 1.2);
    assert!(approx(fixed.get_stat(Stat::Gcd), 1.2));
    assert_eq!(plain.get_stat(Stat::Spirit), 0.0);
}

#[test]
fn talent_points_are_capped() {
    let character = Character::new("greedy", 70)
        .with_talent(Talent::EmpoweredTouch, 9)
        .with_talent(Talent::ImprovedRejuvenation, 3);
    assert_eq!(character.talent(Talent::EmpoweredTouch), 2);
    assert_eq!(character.talent(Talent::ImprovedRejuvenation), 3);
    assert_eq!(character.talent(Talent::Naturalist), 0);
}

#[test]
fn target_buffs_apply_through_buffed_caster() {
    let base = Character::new("druid", 70)
        .with_stat(Stat::BonusHealing, 1000.0)
        .with_stat(Stat::Spirit, 400.0);
    let buffs = ModifierSet::new(
        "tank",
        vec![
            target_buff("amplify_magic").expect("amplify magic"),
            target_buff("tree_of_life_healing").expect("tree of life"),
        ],
    );
    let buffed = Buffed::new(&base, &buffs);
    assert!(approx(buffed.get_stat(Stat::BonusHealing), 1000.0 + 240.0 + 100.0));
    assert!(approx(buffed.get_stat(Stat::Spirit), 400.0));
    assert!(buffs.has_modifier("amplify_magic"));

    let err = target_buff("power_word_fortitude").expect_err("unknown buff");
    assert!(matches!(err, RotationError::UnknownModifier { .. }));
}

#[test]
fn modifiers_render_formula_from_explicit_base() {
    let set = ModifierSet::new(
        "mixed",
        vec![
            StatModifier::new(
                "double",
                Stat::BonusHealing,
                ModifierOp::Mul,
                ModifierSource::Constant(2.0),
            ),
            target_buff("amplify_magic").expect("amplify magic"),
        ],
    );
    assert_eq!(
        set.formula(Stat::BonusHealing, "#Stats.bonus_healing#"),
        "((#Stats.bonus_healing# + 240) * 2)"
    );
    assert_eq!(set.formula(Stat::Spirit, "#Stats.spirit#"), "#Stats.spirit#");

    let tree = target_buff("tree_of_life_healing").expect("tree of life");
    assert_eq!(
        tree.formula(Stat::BonusHealing, "bh"),
        "(bh + (#Stats.spirit# * 0.25))"
    );

    // 数值求值与公式同序：先加后乘
    let base = Character::new("druid", 70).with_stat(Stat::BonusHealing, 100.0);
    assert!(approx(
        set.apply(Stat::BonusHealing, 100.0, &base),
        (100.0 + 240.0) * 2.0
    ));
}

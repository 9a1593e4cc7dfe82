use super::{approx, assign, druid, run};
use crate::character::{Caster, Character, Stat};
use crate::rotation::{Assignments, Decision, FightDuration, REACTION, Rotation};
use crate::sim::{SimTime, Timeline};
use crate::spell::catalog;

fn snapshot(timeline: &Timeline) -> Vec<(f64, f64, u32)> {
    timeline
        .iter()
        .map(|e| (e.start().secs(), e.duration().secs(), e.stacks()))
        .collect()
}

#[test]
fn identical_inputs_produce_identical_timelines() {
    let assignments = || {
        Assignments::new(vec![
            assign(catalog::LIFEBLOOM, "tank").with_fade(false, 1),
            assign(catalog::REJUVENATION, "tank"),
            assign(catalog::REGROWTH, "offtank"),
        ])
        .with_filler(assign(catalog::REJUVENATION, "_filler"))
    };
    let a = run(assignments(), 90.0);
    let b = run(assignments(), 90.0);

    let ta = a.timelines();
    let tb = b.timelines();
    assert_eq!(ta.len(), tb.len());
    for ((assign_a, line_a), (assign_b, line_b)) in ta.iter().zip(tb.iter()) {
        assert_eq!(assign_a.key(), assign_b.key());
        assert_eq!(snapshot(line_a), snapshot(line_b));
    }
    assert_eq!(snapshot(a.gcd_timeline()), snapshot(b.gcd_timeline()));
    assert_eq!(a.casts(), b.casts());
}

#[test]
fn fading_hot_is_recast_once_it_expires() {
    let rotation = run(
        Assignments::new(vec![assign(catalog::REJUVENATION, "tank")]),
        24.0,
    );
    let caster = druid();
    let (assignment, timeline) = rotation.timelines()[0];
    assert_eq!(timeline.len(), 2);
    assert_eq!(rotation.casts().len(), 2);

    let first = &timeline.events()[0];
    let second = &timeline.events()[1];
    let cast_time = assignment.spell().cast_time(&caster);
    assert!(second.start() >= first.end() - cast_time);
    assert!(!first.is_truncated());

    let stats = rotation.stats(&caster, SimTime::ZERO, None);
    let ticks = stats
        .overall
        .heals
        .iter()
        .filter(|c| c.label == "#rejuvenation-13.hot_tick#")
        .count();
    assert_eq!(ticks, 8);
}

#[test]
fn filler_spawns_new_targets_while_previous_ones_are_active() {
    let rotation = run(
        Assignments::new(vec![]).with_filler(assign(catalog::REJUVENATION, "_filler")),
        30.0,
    );
    let fillers = rotation.filler_targets();
    assert!(fillers.len() >= 2);
    assert_eq!(fillers[0], "_filler_0");
    assert_eq!(fillers[1], "_filler_1");

    // 30 秒内施法次数多于克隆数：过期的克隆会被复用
    assert!(rotation.casts().len() > fillers.len());
    assert!(fillers.len() <= 9);
}

#[test]
fn filler_clones_accumulate_around_an_always_active_primary() {
    let rotation = run(
        Assignments::new(vec![assign(catalog::LIFEBLOOM, "tank").with_fade(false, 1)])
            .with_filler(assign(catalog::REJUVENATION, "_filler")),
        60.0,
    );
    let (_, lifebloom) = rotation.timelines()[0];
    assert!(approx(
        lifebloom.active_time(lifebloom.start(), SimTime(60.0)).secs(),
        60.0 - lifebloom.start().secs()
    ));

    let fillers = rotation.filler_targets();
    assert!(fillers.len() >= 2);
    assert_eq!(fillers[..2], ["_filler_0", "_filler_1"]);
    // 第二个克隆创建时第一个仍在生效
    let first = rotation
        .timelines()
        .into_iter()
        .find(|(a, _)| a.target() == "_filler_0")
        .map(|(_, t)| t.start())
        .expect("first clone");
    let second = rotation
        .timelines()
        .into_iter()
        .find(|(a, _)| a.target() == "_filler_1")
        .map(|(_, t)| t.start())
        .expect("second clone");
    assert!((second - first).secs() < 12.0);
}

#[test]
fn filler_only_covers_idle_time_of_primary_assignments() {
    let rotation = run(
        Assignments::new(vec![assign(catalog::LIFEBLOOM, "tank").with_fade(false, 1)])
            .with_filler(assign(catalog::HEALING_TOUCH, "_filler")),
        60.0,
    );
    let (_, lifebloom) = rotation.timelines()[0];
    let horizon = rotation.end().min(SimTime(60.0));
    assert!(approx(
        lifebloom.active_time(lifebloom.start(), horizon).secs(),
        (horizon - lifebloom.start()).secs()
    ));
    assert_eq!(rotation.filler_targets(), ["_filler_0"]);
}

fn assert_no_refresh_gaps(rotation: &Rotation) {
    let caster = druid();
    for (assignment, timeline) in rotation.timelines() {
        let cast_time = assignment.spell().cast_time(&caster).secs();
        for pair in timeline.events().windows(2) {
            let gap = (pair[1].start() - pair[0].end()).secs();
            assert!(
                gap <= cast_time + 1e-6,
                "{assignment} has a {gap:.3}s gap at {:.3}",
                pair[0].end().secs()
            );
        }
    }
}

#[test]
fn refresh_only_assignments_leave_no_gaps() {
    let rotation = run(
        Assignments::new(vec![
            assign(catalog::LIFEBLOOM, "tank").with_fade(false, 1),
            assign(catalog::REJUVENATION, "tank").with_fade(false, 1),
        ]),
        120.0,
    );
    assert_no_refresh_gaps(&rotation);
}

#[test]
fn lower_priority_refreshes_leave_room_for_higher_priority_ones() {
    // 两个生命绽放与两个回春同时维持：回春的刷新窗口恰好容纳两次 GCD
    let rotation = run(
        Assignments::new(vec![
            assign(catalog::LIFEBLOOM, "tank").with_fade(false, 1),
            assign(catalog::LIFEBLOOM, "offtank").with_fade(false, 1),
            assign(catalog::REJUVENATION, "tank").with_fade(false, 1),
            assign(catalog::REJUVENATION, "offtank").with_fade(false, 1),
        ]),
        120.0,
    );
    assert_no_refresh_gaps(&rotation);
    assert!(rotation.timelines().iter().all(|(_, t)| t.len() > 10));
}

#[test]
fn lifebloom_blooms_after_reaching_fade_stacks() {
    let rotation = run(
        Assignments::new(vec![assign(catalog::LIFEBLOOM, "tank").with_fade(true, 3)]),
        40.0,
    );
    let (_, timeline) = rotation.timelines()[0];
    assert!(timeline.iter().all(|e| e.stacks() <= 3));
    assert!(
        timeline
            .iter()
            .any(|e| e.stacks() == 3 && !e.is_truncated())
    );

    let stats = rotation.stats(&druid(), SimTime::ZERO, Some(SimTime(40.0)));
    assert!(
        stats
            .overall
            .heals
            .iter()
            .any(|c| c.label == "#lifebloom-1.avg_direct_heal#")
    );
    assert!(
        stats
            .overall
            .heals
            .iter()
            .any(|c| c.label == "#lifebloom-1.hot_tick3#")
    );
}

#[test]
fn zero_duration_fight_is_empty() {
    let rotation = run(
        Assignments::new(vec![assign(catalog::REJUVENATION, "tank")])
            .with_filler(assign(catalog::REGROWTH, "_filler")),
        0.0,
    );
    assert!(rotation.casts().is_empty());
    assert!(rotation.gcd_timeline().is_empty());
    assert!(rotation.cast_timeline().is_empty());
    assert!(rotation.busy_timeline().is_empty());
    assert!(rotation.timelines().iter().all(|(_, t)| t.is_empty()));
    assert_eq!(rotation.duration(), SimTime::ZERO);

    let stats = rotation.stats(&druid(), SimTime::ZERO, None);
    assert_eq!(stats.overall.total_heal, 0.0);
    assert_eq!(stats.overall.total_mana, 0.0);
    assert_eq!(stats.overall.hps, 0.0);
    assert_eq!(stats.overall.hpm, 0.0);
    assert!(stats.overall.time_to_oom.is_none());
    assert_eq!(stats.gcd.used, 0);
    assert_eq!(stats.gcd.wasted, 0);
}

#[test]
fn until_oom_stops_when_mana_runs_out() {
    let caster = Character::new("poor", 70).with_stat(Stat::Mana, 2_000.0);
    let mut rotation = Rotation::new(Assignments::new(vec![
        assign(catalog::REJUVENATION, "tank").with_fade(false, 1),
    ]));
    rotation
        .optimal_rotation(&caster, FightDuration::UntilOom)
        .expect("schedule");
    // 每次 415 法力，无回蓝
    assert_eq!(rotation.casts().len(), 5);
    assert!(rotation.remaining_mana() <= 0.0);
}

#[test]
fn regen_uses_idle_rate_outside_five_second_rule() {
    let caster = druid()
        .with_stat(Stat::Mp5, 50.0)
        .with_stat(Stat::Regen5sr, 100.0);
    let mut rotation = Rotation::new(Assignments::new(vec![assign(catalog::REJUVENATION, "tank")]));
    rotation
        .optimal_rotation(&caster, FightDuration::Bounded(SimTime(20.0)))
        .expect("schedule");

    let ticks = rotation.regen_ticks(&caster, SimTime::ZERO, SimTime(12.0));
    let at: Vec<f64> = ticks.iter().map(|t| t.at.secs()).collect();
    assert_eq!(at, [0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    // t=0 之前没有施法；t=2/4 处于五秒规则内；之后恢复脱战速率
    assert!(approx(ticks[0].mana, 2.0 * 150.0 / 5.0));
    assert!(approx(ticks[1].mana, 2.0 * 50.0 / 5.0));
    assert!(approx(ticks[2].mana, 2.0 * 50.0 / 5.0));
    assert!(approx(ticks[4].mana, 2.0 * 150.0 / 5.0));

    // 第一跳对齐到不晚于窗口开始的偶数秒
    let aligned = rotation.regen_ticks(&caster, SimTime(3.0), SimTime(6.0));
    assert_eq!(aligned.first().map(|t| t.at), Some(SimTime(2.0)));
}

#[test]
fn queue_eligible_refresh_overrides_waiting() {
    let caster = druid();
    let gcd = SimTime(caster.get_stat(Stat::Gcd));
    let build = |queue: bool| {
        let mut rotation = Rotation::new(Assignments::new(vec![
            assign(catalog::LIFEBLOOM, "tank")
                .with_fade(false, 1)
                .with_queue(queue),
        ]));
        rotation
            .optimal_rotation(&caster, FightDuration::Bounded(SimTime(0.5)))
            .expect("schedule");
        rotation
    };

    // 唯一一次施法后剩余 1.3 秒：超过一跳，但不足一个 GCD
    let now = SimTime(5.7);
    let mut queued = build(true);
    assert!(matches!(
        queued.action_at(now, gcd, &caster).expect("decide"),
        Decision::Cast(a) if a.target() == "tank"
    ));

    let mut plain = build(false);
    match plain.action_at(now, gcd, &caster).expect("decide") {
        Decision::Wait(wait) => assert!(approx(wait.secs(), 1.3 - 1.0 + REACTION.secs() + 1e-6)),
        Decision::Cast(a) => panic!("unexpected cast of {a}"),
    }
}

#[test]
fn queue_candidate_requires_eligible_entry_inside_its_window() {
    let caster = druid();
    let gcd = SimTime(caster.get_stat(Stat::Gcd));
    let build = |queue: bool| {
        let mut rotation = Rotation::new(Assignments::new(vec![
            assign(catalog::REJUVENATION, "offtank").with_fade(false, 1),
            assign(catalog::LIFEBLOOM, "tank")
                .with_fade(false, 1)
                .with_queue(queue),
        ]));
        rotation
            .optimal_rotation(&caster, FightDuration::Bounded(SimTime(2.0)))
            .expect("schedule");
        rotation
    };

    // 生命绽放在 1.5 秒施放，8.5 秒结束
    let queued = build(true);
    let (remaining, candidate) = queued
        .queue_candidate(SimTime(7.2), gcd, &caster)
        .expect("lifebloom is about to end");
    assert_eq!(candidate.target(), "tank");
    assert!(approx(remaining.secs(), 1.3 + 2e-6));
    // 剩余不足一跳时走普通刷新，距离结束尚远时不排队
    assert!(queued.queue_candidate(SimTime(7.6), gcd, &caster).is_none());
    assert!(queued.queue_candidate(SimTime(4.0), gcd, &caster).is_none());

    let plain = build(false);
    assert!(plain.queue_candidate(SimTime(7.2), gcd, &caster).is_none());
}

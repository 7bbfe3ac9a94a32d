use engine::{PointerInput, RecordingSink, Scene, Vec2};

use super::character::CharacterMode;
use super::interaction::{
    BIRTHDAY_MESSAGES, CANT_GET_THERE_TEXT, CAT_MESSAGES, COMING_TEXT, GREETING_TEXT,
    NOT_ON_CAKE_TEXT, ONLY_BELOW_CAKE_TEXT,
};
use super::scene::PartyTimer;
use super::{PartyScene, CAKE_ASSET, CAT_ASSET};
use crate::app::planning::{Action, IdleKind, Plan, PlanOrigin, PlanOutcome};

const TICK_MS: u64 = 10;

fn started_scene(seed: u64) -> PartyScene {
    let mut scene = PartyScene::new(800.0, 600.0, seed);
    scene.finish_intro();
    scene.mark_asset_loaded(CAT_ASSET).expect("cat key");
    scene.mark_asset_loaded(CAKE_ASSET).expect("cake key");
    assert!(scene.is_started());
    scene
}

fn outcome(actions: Vec<Action>) -> PlanOutcome {
    PlanOutcome {
        plan: Plan::new(actions),
        origin: PlanOrigin::Mock,
    }
}

fn idle(kind: IdleKind, duration_ms: u64) -> Action {
    Action::Idle { kind, duration_ms }
}

fn walk_to(x: f32, y: f32) -> Action {
    Action::Walk {
        path: vec![Vec2::new(x, y)],
    }
}

fn advance(scene: &mut PartyScene, ms: u64) {
    for _ in 0..ms / TICK_MS {
        scene.update(TICK_MS);
    }
}

/// Ticks until `done` holds; returns the elapsed ms.
fn advance_until(
    scene: &mut PartyScene,
    max_ms: u64,
    mut done: impl FnMut(&PartyScene) -> bool,
) -> u64 {
    let mut elapsed = 0;
    while elapsed <= max_ms {
        if done(scene) {
            return elapsed;
        }
        scene.update(TICK_MS);
        elapsed += TICK_MS;
    }
    panic!("condition not reached within {max_ms}ms: {}", scene.status());
}

fn count_timers(scene: &PartyScene, predicate: impl Fn(&PartyTimer) -> bool) -> usize {
    scene.pending_timers().filter(|timer| predicate(timer)).count()
}

fn autonomous_timers(scene: &PartyScene) -> usize {
    count_timers(scene, |timer| !matches!(timer, PartyTimer::ResolveClick { .. }))
}

#[test]
fn scene_waits_for_intro_and_both_assets() {
    let mut scene = PartyScene::new(800.0, 600.0, 1);
    scene.mark_asset_loaded(CAT_ASSET).expect("cat key");
    scene.finish_intro();
    assert!(!scene.is_started());
    assert!(scene.drain_plan_requests().is_empty());

    scene.update(TICK_MS);
    scene.on_pointer(PointerInput::DoubleClick {
        pos: Vec2::new(600.0, 550.0),
    });
    assert!(!scene.executor().user_in_control());

    scene.mark_asset_loaded(CAKE_ASSET).expect("cake key");
    assert!(scene.is_started());
    assert_eq!(scene.character().position(), Vec2::new(160.0, 480.0));
    assert_eq!(scene.cake().x, 275.0);
    assert_eq!(scene.cake().y, 175.0);
    assert_eq!(scene.bubble_text(), Some(GREETING_TEXT));
    assert_eq!(scene.drain_plan_requests().len(), 1);
}

#[test]
fn bad_asset_key_is_rejected_without_starting() {
    let mut scene = PartyScene::new(800.0, 600.0, 1);
    scene.finish_intro();
    assert!(scene.mark_asset_loaded("Cat.png").is_err());
    assert!(!scene.is_started());
}

#[test]
fn only_one_plan_request_is_outstanding() {
    let mut scene = started_scene(2);
    assert!(!scene.request_plan());
    let requests = scene.drain_plan_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].position, Vec2::new(160.0, 480.0));
    assert_eq!(requests[0].obstacle, scene.cake());
    assert_eq!(requests[0].bounds, scene.bounds());

    scene.apply_plan_outcome(outcome(vec![idle(IdleKind::LickPaw, 3_000)]));
    assert!(scene.request_plan());
    assert_eq!(scene.drain_plan_requests().len(), 1);
}

#[test]
fn plan_actions_run_in_order_then_refill_is_requested() {
    let mut scene = started_scene(3);
    scene.drain_plan_requests();
    scene.apply_plan_outcome(outcome(vec![
        idle(IdleKind::SitDown, 1_000),
        walk_to(700.0, 480.0),
        idle(IdleKind::LickPaw, 1_000),
    ]));

    assert_eq!(scene.character().mode(), CharacterMode::Idle);
    assert_eq!(scene.character().idle_kind(), IdleKind::SitDown);
    assert_eq!(scene.executor().queued(), 2);

    let waited = advance_until(&mut scene, 2_600, |scene| scene.character().is_walking());
    assert!(waited >= 1_500, "walk began after {waited}ms");

    advance_until(&mut scene, 6_000, |scene| !scene.character().is_walking());
    assert_eq!(scene.character().position(), Vec2::new(700.0, 480.0));

    advance_until(&mut scene, 3_600, |scene| {
        count_timers(scene, |timer| matches!(timer, PartyTimer::IdleComplete { .. })) == 1
    });
    assert_eq!(scene.character().idle_kind(), IdleKind::LickPaw);
    assert_eq!(scene.executor().queued(), 0);

    advance_until(&mut scene, 1_000 + 1_500 + 9_000, |scene| {
        scene.status().plan_in_flight
    });
    assert_eq!(scene.drain_plan_requests().len(), 1);
}

#[test]
fn new_plan_replaces_queued_actions_and_their_timers() {
    let mut scene = started_scene(4);
    scene.drain_plan_requests();
    scene.apply_plan_outcome(outcome(vec![
        idle(IdleKind::SitDown, 5_000),
        walk_to(600.0, 500.0),
        walk_to(100.0, 500.0),
    ]));
    advance(&mut scene, 1_000);

    scene.apply_plan_outcome(outcome(vec![idle(IdleKind::LickPaw, 2_000)]));
    assert_eq!(scene.executor().queued(), 0);
    assert_eq!(scene.character().idle_kind(), IdleKind::LickPaw);
    assert_eq!(autonomous_timers(&scene), 1);

    // The first plan's walks never happen.
    advance(&mut scene, 2_000 + 1_500);
    assert!(!scene.character().is_walking());
    assert!(count_timers(&scene, |timer| matches!(timer, PartyTimer::RefillPlan { .. })) == 1);
}

#[test]
fn user_navigation_mid_idle_leaves_autonomy_idle() {
    let mut scene = started_scene(5);
    scene.drain_plan_requests();
    scene.apply_plan_outcome(outcome(vec![
        idle(IdleKind::LickPaw, 3_000),
        idle(IdleKind::SitDown, 3_000),
    ]));
    advance(&mut scene, 1_000);

    scene.on_pointer(PointerInput::DoubleClick {
        pos: Vec2::new(600.0, 550.0),
    });
    assert!(scene.executor().user_in_control());
    assert!(scene.character().is_walking());
    assert_eq!(scene.executor().queued(), 0);
    assert_eq!(scene.bubble_text(), Some(COMING_TEXT));

    // The idle timer fires mid-walk and must not dequeue or ask for a plan.
    advance(&mut scene, 2_500);
    assert!(scene.character().is_walking());
    assert_eq!(autonomous_timers(&scene), 0);
    assert!(scene.drain_plan_requests().is_empty());

    advance_until(&mut scene, 10_000, |scene| !scene.character().is_walking());
    assert!(!scene.executor().user_in_control());
    assert_eq!(scene.character().position(), Vec2::new(610.0, 550.0));

    advance(&mut scene, 20_000);
    assert!(scene.drain_plan_requests().is_empty());
    assert!(!scene.character().is_walking());
    assert_eq!(autonomous_timers(&scene), 0);
}

#[test]
fn stale_refill_timer_is_dropped_after_interrupt() {
    let mut scene = started_scene(6);
    scene.drain_plan_requests();
    scene.apply_plan_outcome(outcome(vec![idle(IdleKind::LickPaw, 500)]));
    advance_until(&mut scene, 2_100, |scene| {
        count_timers(scene, |timer| matches!(timer, PartyTimer::RefillPlan { .. })) == 1
    });

    scene.on_pointer(PointerInput::DoubleClick {
        pos: Vec2::new(200.0, 500.0),
    });
    advance_until(&mut scene, 2_000, |scene| !scene.executor().user_in_control());
    advance(&mut scene, 10_000);
    assert!(scene.drain_plan_requests().is_empty());
}

#[test]
fn plan_arriving_during_user_walk_is_discarded() {
    let mut scene = started_scene(7);
    scene.drain_plan_requests();
    scene.on_pointer(PointerInput::DoubleClick {
        pos: Vec2::new(600.0, 550.0),
    });

    scene.apply_plan_outcome(outcome(vec![idle(IdleKind::SitDown, 3_000)]));
    assert_eq!(scene.executor().queued(), 0);
    assert!(scene.character().is_walking());

    let mut sink = RecordingSink::default();
    scene.render(&mut sink);
    assert!(sink.has_notice("plan_discarded"));

    // The request slot is free again once the late plan is handled.
    advance_until(&mut scene, 10_000, |scene| !scene.executor().user_in_control());
    assert!(scene.request_plan());
}

#[test]
fn plan_in_flight_when_user_walk_ends_resumes_autonomy() {
    let mut scene = started_scene(8);
    scene.drain_plan_requests();
    scene.on_pointer(PointerInput::DoubleClick {
        pos: Vec2::new(200.0, 500.0),
    });
    advance_until(&mut scene, 2_000, |scene| !scene.executor().user_in_control());

    scene.apply_plan_outcome(outcome(vec![walk_to(300.0, 520.0), idle(IdleKind::LickPaw, 3_000)]));
    assert!(scene.character().is_walking());
    assert_eq!(scene.executor().queued(), 1);
}

#[test]
fn single_click_on_cake_resolves_after_delay() {
    let mut scene = started_scene(9);
    scene.on_pointer(PointerInput::Click {
        pos: Vec2::new(400.0, 300.0),
    });
    advance(&mut scene, 290);
    assert_eq!(scene.bubble_text(), Some(GREETING_TEXT));
    advance(&mut scene, 10);
    let text = scene.bubble_text().expect("bubble");
    assert!(BIRTHDAY_MESSAGES.contains(&text), "{text}");
}

#[test]
fn single_click_on_cat_chats_and_above_line_hints() {
    let mut scene = started_scene(10);
    scene.on_pointer(PointerInput::Click {
        pos: Vec2::new(165.0, 470.0),
    });
    advance(&mut scene, 300);
    let text = scene.bubble_text().expect("bubble");
    assert!(CAT_MESSAGES.contains(&text), "{text}");

    scene.on_pointer(PointerInput::Click {
        pos: Vec2::new(700.0, 100.0),
    });
    advance(&mut scene, 300);
    assert_eq!(scene.bubble_text(), Some(ONLY_BELOW_CAKE_TEXT));
}

#[test]
fn double_click_cancels_pending_single_click() {
    let mut scene = started_scene(11);
    let cake_center = Vec2::new(400.0, 300.0);
    scene.on_pointer(PointerInput::Click { pos: cake_center });
    scene.on_pointer(PointerInput::DoubleClick { pos: cake_center });
    assert_eq!(scene.bubble_text(), Some(NOT_ON_CAKE_TEXT));
    assert!(!scene.executor().user_in_control());

    advance(&mut scene, 400);
    assert_eq!(scene.bubble_text(), Some(NOT_ON_CAKE_TEXT));
}

#[test]
fn double_click_above_floor_line_does_not_interrupt() {
    let mut scene = started_scene(12);
    scene.drain_plan_requests();
    scene.apply_plan_outcome(outcome(vec![
        idle(IdleKind::LickPaw, 3_000),
        idle(IdleKind::SitDown, 3_000),
    ]));
    scene.on_pointer(PointerInput::DoubleClick {
        pos: Vec2::new(100.0, 300.0),
    });
    assert_eq!(scene.bubble_text(), Some(ONLY_BELOW_CAKE_TEXT));
    assert!(!scene.executor().user_in_control());
    assert_eq!(scene.executor().queued(), 1);
}

#[test]
fn unreachable_goal_shows_message_and_releases_control() {
    let mut scene = started_scene(13);
    scene.drain_plan_requests();
    let start = scene.character().position();
    scene.on_pointer(PointerInput::DoubleClick {
        pos: Vec2::new(805.0, 590.0),
    });
    assert_eq!(scene.bubble_text(), Some(CANT_GET_THERE_TEXT));
    assert!(!scene.executor().user_in_control());
    assert!(!scene.character().is_walking());
    advance(&mut scene, 100);
    assert_eq!(scene.character().position(), start);

    let mut sink = RecordingSink::default();
    scene.render(&mut sink);
    assert!(sink.has_notice("no_path"));
}

#[test]
fn unreachable_goal_during_user_walk_keeps_user_control() {
    let mut scene = started_scene(14);
    scene.drain_plan_requests();
    scene.apply_plan_outcome(outcome(vec![
        idle(IdleKind::LickPaw, 3_000),
        idle(IdleKind::SitDown, 3_000),
    ]));
    scene.on_pointer(PointerInput::DoubleClick {
        pos: Vec2::new(700.0, 550.0),
    });
    advance(&mut scene, 200);

    scene.on_pointer(PointerInput::DoubleClick {
        pos: Vec2::new(805.0, 590.0),
    });
    assert_eq!(scene.bubble_text(), Some(CANT_GET_THERE_TEXT));
    assert!(scene.character().is_walking());
    assert!(scene.executor().user_in_control());

    advance_until(&mut scene, 10_000, |scene| !scene.character().is_walking());
    assert!(!scene.executor().user_in_control());
    assert_eq!(autonomous_timers(&scene), 0);

    advance(&mut scene, 20_000);
    assert!(scene.drain_plan_requests().is_empty());
    assert!(!scene.character().is_walking());
    assert_eq!(autonomous_timers(&scene), 0);
}

#[test]
fn resize_moves_cake_and_rebuilds_grid() {
    let mut scene = started_scene(14);
    scene.resize(1_000.0, 800.0);
    assert_eq!(scene.cake().x, 375.0);
    assert_eq!(scene.cake().y, 275.0);

    // Below the old grid's bottom edge, reachable only on the new grid.
    scene.on_pointer(PointerInput::DoubleClick {
        pos: Vec2::new(900.0, 700.0),
    });
    assert!(scene.character().is_walking());
    assert!(scene.executor().user_in_control());
}

#[test]
fn render_draws_cake_cat_and_bubble() {
    let mut scene = started_scene(15);
    let mut sink = RecordingSink::default();
    scene.render(&mut sink);

    assert!(sink.has_notice("scene_started"));
    assert_eq!(sink.sprites.len(), 2);
    assert_eq!(sink.sprites[0].asset, CAKE_ASSET);
    assert_eq!(sink.sprites[0].center, Vec2::new(400.0, 300.0));
    assert_eq!(sink.sprites[1].asset, CAT_ASSET);
    assert_eq!(sink.sprites[1].center, Vec2::new(160.0, 480.0));
    assert_eq!(sink.sprites[1].row, 5);
    assert_eq!(sink.bubbles.len(), 1);
    assert_eq!(sink.bubbles[0].anchor, Vec2::new(160.0, 410.0));

    advance(&mut scene, 290);
    sink.clear_frame();
    scene.render(&mut sink);
    assert_eq!(sink.sprites[0].frame, 0);
    advance(&mut scene, 10);
    sink.clear_frame();
    scene.render(&mut sink);
    assert_eq!(sink.sprites[0].frame, 1);
}

use engine::{simple_detour_path, Vec2};
use rand::Rng;

use super::plan::{Action, IdleKind, Plan, PlanRequest, MAX_IDLE_DURATION_MS, MIN_IDLE_DURATION_MS};

const MIN_ACTIONS: usize = 2;
const MAX_ACTIONS: usize = 3;
const WALK_PROBABILITY: f64 = 0.4;
const MAX_TARGET_ATTEMPTS: u32 = 10;

/// Local stand-in for the language model: a short random wander.
pub(crate) fn mock_plan(request: &PlanRequest, rng: &mut impl Rng) -> Plan {
    let action_count = rng.random_range(MIN_ACTIONS..=MAX_ACTIONS);
    let mut current = request.position;
    let mut actions = Vec::with_capacity(action_count);

    for _ in 0..action_count {
        if !rng.random_bool(WALK_PROBABILITY) {
            actions.push(random_idle(rng));
            continue;
        }

        let target = pick_walk_target(request, rng);
        let path = simple_detour_path(current, target, request.obstacle, request.bounds);
        if path.is_empty() {
            actions.push(random_idle(rng));
        } else {
            actions.push(Action::Walk { path });
            current = target;
        }
    }

    Plan::new(actions)
}

pub(crate) fn random_idle_kind(rng: &mut impl Rng) -> IdleKind {
    if rng.random_bool(0.5) {
        IdleKind::LickPaw
    } else {
        IdleKind::SitDown
    }
}

fn random_idle(rng: &mut impl Rng) -> Action {
    Action::Idle {
        kind: random_idle_kind(rng),
        duration_ms: rng.random_range(MIN_IDLE_DURATION_MS..MAX_IDLE_DURATION_MS),
    }
}

fn pick_walk_target(request: &PlanRequest, rng: &mut impl Rng) -> Vec2 {
    let floor_y = request.floor_line_y();
    let mut target = random_point_below(request, floor_y, rng);
    let mut attempts = 1;
    while request.obstacle.contains_strict(target) && attempts < MAX_TARGET_ATTEMPTS {
        target = random_point_below(request, floor_y, rng);
        attempts += 1;
    }
    target
}

fn random_point_below(request: &PlanRequest, floor_y: f32, rng: &mut impl Rng) -> Vec2 {
    let width = request.bounds.width.max(0.0);
    let height = request.bounds.height.max(0.0);
    let x = request.bounds.x + width * rng.random::<f32>();
    let y = (request.bounds.y + height * rng.random::<f32>()).max(floor_y);
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use engine::Rect;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn request() -> PlanRequest {
        PlanRequest::new_plan(
            Vec2::new(160.0, 480.0),
            Rect::from_size(800.0, 600.0),
            Rect::new(275.0, 175.0, 250.0, 250.0),
        )
    }

    #[test]
    fn mock_plans_have_two_or_three_valid_actions() {
        let request = request();
        for seed in 0..200u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = mock_plan(&request, &mut rng);
            assert!((2..=3).contains(&plan.len()), "seed {seed}: {plan:?}");
            for action in &plan.actions {
                match action {
                    Action::Walk { path } => {
                        assert!(!path.is_empty());
                        assert!(path.len() <= 2);
                    }
                    Action::Idle { duration_ms, .. } => {
                        assert!((3_000..7_000).contains(duration_ms), "seed {seed}");
                    }
                }
            }
        }
    }

    #[test]
    fn walk_targets_stay_below_the_floor_line() {
        let request = request();
        let floor_y = request.obstacle.bottom() + 50.0;
        let mut walks = 0;
        for seed in 0..200u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            for action in mock_plan(&request, &mut rng).actions {
                if let Action::Walk { path } = action {
                    walks += 1;
                    let target = *path.last().expect("non-empty path");
                    assert!(target.y >= floor_y, "seed {seed}: {target:?}");
                    assert!(!request.obstacle.contains_strict(target));
                }
            }
        }
        assert!(walks > 0, "no walk actions in 200 seeds");
    }

    #[test]
    fn each_walk_starts_where_the_previous_ended() {
        // Starting above the cake forces a detour on walks that cross it.
        let mut request = request();
        request.position = Vec2::new(400.0, 20.0);
        for seed in 0..100u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = mock_plan(&request, &mut rng);
            let mut current = request.position;
            for action in plan.actions {
                if let Action::Walk { path } = action {
                    let target = *path.last().expect("target");
                    let expected =
                        simple_detour_path(current, target, request.obstacle, request.bounds);
                    assert_eq!(path, expected, "seed {seed}");
                    current = target;
                }
            }
        }
    }

    #[test]
    fn same_seed_same_plan() {
        let request = request();
        let first = mock_plan(&request, &mut StdRng::seed_from_u64(7));
        let second = mock_plan(&request, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }
}

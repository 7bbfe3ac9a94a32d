use super::plan::{PlanRequest, MAX_IDLE_DURATION_MS, MIN_IDLE_DURATION_MS};

pub(crate) fn build_prompt(request: &PlanRequest) -> String {
    let position = request.position;
    let bounds = request.bounds;
    let cake = request.obstacle;
    format!(
        "You are a cute little cat at a birthday party. Your current position is ({px:.0}, {py:.0}) \
and the scene is {w:.0}x{h:.0}. A birthday cake sits at ({cx:.0}, {cy:.0}) with size {cw:.0}x{ch:.0}.\n\
\n\
Make an action plan with 2-3 actions. Each action is one of:\n\
1. walk: move to a spot, shaped like {{\"action\": \"walk\", \"details\": {{\"path\": [{{\"x\": 100, \"y\": 200}}]}}}}\n\
2. idle: play an idle animation, shaped like {{\"action\": \"idle\", \"details\": {{\"type\": \"lickPaw\" or \"sitDown\", \"duration\": milliseconds}}}}\n\
\n\
Rules:\n\
- never move into the cake\n\
- stay below the cake: every y must be greater than {floor:.0}\n\
- keep paths short, at most 2-3 waypoints per walk\n\
- behave naturally and do not move too often\n\
- idle durations must be between {min_idle} and {max_idle} milliseconds\n\
\n\
Reply with the plan as JSON only, shaped like {{\"plan\": [actions]}}",
        px = position.x,
        py = position.y,
        w = bounds.width,
        h = bounds.height,
        cx = cake.x,
        cy = cake.y,
        cw = cake.width,
        ch = cake.height,
        floor = request.floor_line_y(),
        min_idle = MIN_IDLE_DURATION_MS,
        max_idle = MAX_IDLE_DURATION_MS,
    )
}

use crate::global_variables::{
    REWARD_FOLLOWED_HINT, REWARD_ILLEGAL_MOVE, REWARD_OTHER_MOVE, REWARD_WAIT,
};
use crate::simulation_engine::grid::TrafficGrid;
use crate::simulation_engine::intersections::{Heading, LightColor, Position};
use crate::simulation_engine::vehicles::{Action, Maneuver, Percept};

/// Result of applying one action to a vehicle's location and heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// False when the traffic rules forbade the attempted move.
    pub legal: bool,
    pub location: Position,
    pub heading: Heading,
}

/// Applies `action` at a light showing `light` to the vehicle.
///
/// # Behavior
///
/// - `Forward` needs green.
/// - `Left` needs green and turns the heading counter-clockwise.
/// - `Right` is always allowed and turns the heading clockwise.
/// - `None` is always allowed and leaves the vehicle where it is.
///
/// Legal moves advance one intersection along the new heading, wrapping
/// around the grid edges. Illegal moves leave location and heading untouched.
pub fn advance_vehicle(
    grid: &TrafficGrid,
    location: Position,
    heading: Heading,
    light: LightColor,
    action: Action,
) -> MoveOutcome {
    let stay = |legal| MoveOutcome {
        legal,
        location,
        heading,
    };

    let new_heading = match action {
        Action::None => return stay(true),
        Action::Forward if light == LightColor::Green => heading,
        Action::Left if light == LightColor::Green => heading.turned_left(),
        Action::Forward | Action::Left => return stay(false),
        Action::Right => heading.turned_right(),
    };

    MoveOutcome {
        legal: true,
        location: grid.step(location, new_heading),
        heading: new_heading,
    }
}

/// Reward for an action before any destination bonus.
pub fn movement_reward(action: Action, outcome: &MoveOutcome, hint: Option<Maneuver>) -> f64 {
    match action {
        Action::None => REWARD_WAIT,
        _ if !outcome.legal => REWARD_ILLEGAL_MOVE,
        _ if action.maneuver() == hint => REWARD_FOLLOWED_HINT,
        _ => REWARD_OTHER_MOVE,
    }
}

/// Where another vehicle at the same intersection is coming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approach {
    Oncoming,
    Left,
    Right,
}

/// Classifies `other` relative to `own`. Vehicles with the same heading are
/// not part of the crossing picture and yield `None`.
pub fn classify_approach(own: Heading, other: Heading) -> Option<Approach> {
    let (hx, hy) = own.delta();
    if own == other {
        None
    } else if own.dot(other) == -1 {
        Some(Approach::Oncoming)
    } else if other.delta() == (hy, -hx) {
        // Traffic from our right travels the way we would after a left turn.
        Some(Approach::Right)
    } else {
        Some(Approach::Left)
    }
}

/// Right-of-way rule for rule-following drivers: can `maneuver` be made now?
///
/// - `Right` yields to left traffic going forward on red.
/// - `Forward` waits for green.
/// - `Left` waits for green and yields to oncoming traffic going forward or right.
pub fn maneuver_is_clear(maneuver: Maneuver, percept: &Percept) -> bool {
    let red = percept.light == LightColor::Red;
    match maneuver {
        Maneuver::Right => !(red && percept.left == Some(Maneuver::Forward)),
        Maneuver::Forward => !red,
        Maneuver::Left => {
            !(red
                || matches!(
                    percept.oncoming,
                    Some(Maneuver::Forward) | Some(Maneuver::Right)
                ))
        }
    }
}

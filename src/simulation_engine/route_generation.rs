// route_generation.rs
//
// Suggests the next maneuver toward a destination on a perpendicular grid.
// The planner only looks at the remaining delta and the current heading and
// does not search the street graph. Some perpendicular turns point away from
// the destination; the vehicle then gets there through the wrap-around.

use crate::simulation_engine::intersections::{Heading, Position};
use crate::simulation_engine::vehicles::Maneuver;

/// Collaborator that turns (location, heading, destination) into a hint.
pub trait RouteHintProvider {
    fn set_destination(&mut self, destination: Option<Position>);

    fn destination(&self) -> Option<Position>;

    /// `None` once the destination is reached or when no destination is set.
    fn hint(&self, location: Position, heading: Heading) -> Option<Maneuver>;
}

/// Closes the east-west gap first, then the north-south gap.
#[derive(Debug, Clone, Default)]
pub struct GridRoutePlanner {
    destination: Option<Position>,
}

impl GridRoutePlanner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RouteHintProvider for GridRoutePlanner {
    fn set_destination(&mut self, destination: Option<Position>) {
        log::debug!("GridRoutePlanner: destination = {:?}", destination);
        self.destination = destination;
    }

    fn destination(&self) -> Option<Position> {
        self.destination
    }

    fn hint(&self, location: Position, heading: Heading) -> Option<Maneuver> {
        let destination = self.destination?;
        let (dx, dy) = (destination.col - location.col, destination.row - location.row);
        let (hx, hy) = heading.delta();

        if dx != 0 {
            Some(if dx * hx > 0 {
                Maneuver::Forward
            } else if dx * hx < 0 {
                // Facing away: take the long way round.
                Maneuver::Right
            } else if dx * hy > 0 {
                Maneuver::Right
            } else {
                Maneuver::Left
            })
        } else if dy != 0 {
            Some(if dy * hy > 0 {
                Maneuver::Forward
            } else if dy * hy < 0 {
                Maneuver::Right
            } else if dy * hx > 0 {
                Maneuver::Right
            } else {
                Maneuver::Left
            })
        } else {
            None
        }
    }
}

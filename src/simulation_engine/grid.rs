use crate::simulation_engine::intersections::{Heading, Position, TrafficLight};
use rand::Rng;
use std::collections::BTreeMap;

/// Represents the toroidal road network: one traffic light per intersection.
#[derive(Debug, Clone)]
pub struct TrafficGrid {
    /// Number of intersection columns.
    pub width: i32,
    /// Number of intersection rows.
    pub height: i32,
    /// Every intersection and its light, ordered by (col, row).
    pub intersections: BTreeMap<Position, TrafficLight>,
    /// Directed streets between intersections at L1 distance 1.
    pub streets: Vec<(Position, Position)>,
}

impl TrafficGrid {
    /// Builds a `width` x `height` grid with a randomly timed light at each intersection.
    pub fn new<R: Rng + ?Sized>(width: i32, height: i32, rng: &mut R) -> Self {
        let mut intersections = BTreeMap::new();
        for col in 0..width {
            for row in 0..height {
                intersections.insert(Position::new(col, row), TrafficLight::random(rng));
            }
        }

        let mut streets = Vec::new();
        for col in 0..width {
            for row in 0..height {
                let here = Position::new(col, row);
                if col + 1 < width {
                    let east = Position::new(col + 1, row);
                    streets.push((here, east));
                    streets.push((east, here));
                }
                if row + 1 < height {
                    let south = Position::new(col, row + 1);
                    streets.push((here, south));
                    streets.push((south, here));
                }
            }
        }

        TrafficGrid {
            width,
            height,
            intersections,
            streets,
        }
    }

    pub fn light(&self, position: &Position) -> Option<&TrafficLight> {
        self.intersections.get(position)
    }

    /// Advances every light to the given tick.
    pub fn advance_lights(&mut self, tick: u32) {
        for light in self.intersections.values_mut() {
            light.advance(tick);
        }
    }

    pub fn reset_lights(&mut self) {
        for light in self.intersections.values_mut() {
            light.reset();
        }
    }

    /// Folds any position back into the grid on both axes.
    pub fn wrap(&self, col: i32, row: i32) -> Position {
        Position::new(col.rem_euclid(self.width), row.rem_euclid(self.height))
    }

    /// One step along `heading`, wrapping around the edges.
    pub fn step(&self, from: Position, heading: Heading) -> Position {
        let (dx, dy) = heading.delta();
        self.wrap(from.col + dx, from.row + dy)
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.intersections.contains_key(position)
    }

    /// Intersections reachable by a single street from `position`.
    pub fn neighbors(&self, position: &Position) -> Vec<Position> {
        self.streets
            .iter()
            .filter(|(from, _)| from == position)
            .map(|&(_, to)| to)
            .collect()
    }

    /// Largest L1 distance between any two intersections.
    pub fn max_distance(&self) -> i32 {
        (self.width - 1) + (self.height - 1)
    }

    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(
            rng.random_range(0..self.width),
            rng.random_range(0..self.height),
        )
    }
}

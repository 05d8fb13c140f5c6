use crate::global_variables::LIGHT_PERIODS;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid coordinates of an intersection as (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub col: i32,
    pub row: i32,
}

impl Position {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// L1 distance, measured inside the grid (no wrap-around shortcut).
    pub fn manhattan(self, other: Position) -> i32 {
        (other.col - self.col).abs() + (other.row - self.row).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// One of the four lattice directions, in screen coordinates (north is -y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    East,
    North,
    West,
    South,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::East, Heading::North, Heading::West, Heading::South];

    /// Unit vector (dx, dy).
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Heading::East => (1, 0),
            Heading::North => (0, -1),
            Heading::West => (-1, 0),
            Heading::South => (0, 1),
        }
    }

    fn from_delta(delta: (i32, i32)) -> Self {
        match delta {
            (1, 0) => Heading::East,
            (0, -1) => Heading::North,
            (-1, 0) => Heading::West,
            _ => Heading::South,
        }
    }

    /// Heading after a 90 degree counter-clockwise turn: (dx, dy) -> (dy, -dx).
    pub fn turned_left(self) -> Self {
        let (dx, dy) = self.delta();
        Self::from_delta((dy, -dx))
    }

    /// Heading after a 90 degree clockwise turn: (dx, dy) -> (-dy, dx).
    pub fn turned_right(self) -> Self {
        let (dx, dy) = self.delta();
        Self::from_delta((-dy, dx))
    }

    pub fn is_north_south(self) -> bool {
        matches!(self, Heading::North | Heading::South)
    }

    /// Dot product of the two unit vectors.
    pub fn dot(self, other: Heading) -> i32 {
        let (ax, ay) = self.delta();
        let (bx, by) = other.delta();
        ax * bx + ay * by
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Which pair of approaches currently has right of way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightAxis {
    NorthSouth,
    EastWest,
}

impl LightAxis {
    pub fn flipped(self) -> Self {
        match self {
            LightAxis::NorthSouth => LightAxis::EastWest,
            LightAxis::EastWest => LightAxis::NorthSouth,
        }
    }
}

/// Light color as seen by a vehicle with a particular heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightColor {
    Green,
    Red,
}

/// Two-phase periodic signal at a single intersection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficLight {
    /// Axis currently open to traffic.
    pub open_axis: LightAxis,
    /// Ticks between phase flips, one of 3, 4 or 5.
    pub period: u32,
    /// Tick of the most recent flip.
    pub last_flip: u32,
}

impl TrafficLight {
    pub fn new(open_axis: LightAxis, period: u32) -> Self {
        Self {
            open_axis,
            period,
            last_flip: 0,
        }
    }

    /// A light with random initial axis and period.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let open_axis = if rng.random_bool(0.5) {
            LightAxis::NorthSouth
        } else {
            LightAxis::EastWest
        };
        let period = *LIGHT_PERIODS.choose(rng).unwrap_or(&LIGHT_PERIODS[0]);
        Self::new(open_axis, period)
    }

    /// Flips the phase once `period` ticks have passed since the last flip.
    /// Calling it again with the same tick does nothing.
    pub fn advance(&mut self, current_tick: u32) {
        if current_tick.saturating_sub(self.last_flip) >= self.period {
            self.open_axis = self.open_axis.flipped();
            self.last_flip = current_tick;
        }
    }

    /// Restarts the timing; phase and period are kept.
    pub fn reset(&mut self) {
        self.last_flip = 0;
    }

    pub fn color_for(&self, heading: Heading) -> LightColor {
        let open = match self.open_axis {
            LightAxis::NorthSouth => heading.is_north_south(),
            LightAxis::EastWest => !heading.is_north_south(),
        };
        if open {
            LightColor::Green
        } else {
            LightColor::Red
        }
    }
}

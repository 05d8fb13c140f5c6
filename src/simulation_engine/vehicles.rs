use crate::error::{SimError, SimResult};
use crate::learning::QLearner;
use crate::simulation_engine::intersections::{Heading, LightColor, Position};
use crate::simulation_engine::simulation::Environment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque reference to an agent registered with one environment.
///
/// The handle carries the id of the environment that issued it, so a handle
/// from one environment is rejected by every other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentHandle {
    environment: u32,
    index: usize,
}

impl AgentHandle {
    pub(crate) fn new(environment: u32, index: usize) -> Self {
        Self { environment, index }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn environment(self) -> u32 {
        self.environment
    }
}

/// A movement through an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Maneuver {
    Forward,
    Left,
    Right,
}

impl Maneuver {
    pub const ALL: [Maneuver; 3] = [Maneuver::Forward, Maneuver::Left, Maneuver::Right];
}

/// What an agent may submit on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    None,
    Forward,
    Left,
    Right,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::None, Action::Forward, Action::Left, Action::Right];

    pub fn from_index(index: usize) -> SimResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| SimError::InvalidAction(index.to_string()))
    }

    pub fn maneuver(self) -> Option<Maneuver> {
        match self {
            Action::None => None,
            Action::Forward => Some(Maneuver::Forward),
            Action::Left => Some(Maneuver::Left),
            Action::Right => Some(Maneuver::Right),
        }
    }
}

impl From<Maneuver> for Action {
    fn from(maneuver: Maneuver) -> Self {
        match maneuver {
            Maneuver::Forward => Action::Forward,
            Maneuver::Left => Action::Left,
            Maneuver::Right => Action::Right,
        }
    }
}

impl From<Option<Maneuver>> for Action {
    fn from(maneuver: Option<Maneuver>) -> Self {
        maneuver.map_or(Action::None, Action::from)
    }
}

impl FromStr for Action {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Action::None),
            "forward" => Ok(Action::Forward),
            "left" => Ok(Action::Left),
            "right" => Ok(Action::Right),
            _ => Err(SimError::InvalidAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Action::None => "none",
            Action::Forward => "forward",
            Action::Left => "left",
            Action::Right => "right",
        };
        f.write_str(name)
    }
}

/// Local traffic picture sensed by one agent at its intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Percept {
    pub light: LightColor,
    /// Announced maneuver of traffic facing us.
    pub oncoming: Option<Maneuver>,
    /// Announced maneuver of traffic approaching from our left.
    pub left: Option<Maneuver>,
    /// Announced maneuver of traffic approaching from our right.
    pub right: Option<Maneuver>,
}

/// Discretized percept used as the learning table's row key.
///
/// Left-side traffic is left out: whether a left turn is blocked depends on
/// oncoming traffic, which is already part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub light: LightColor,
    pub oncoming: Option<Maneuver>,
    pub right: Option<Maneuver>,
    pub hint: Option<Maneuver>,
}

impl StateKey {
    pub fn new(percept: &Percept, hint: Option<Maneuver>) -> Self {
        Self {
            light: percept.light,
            oncoming: percept.oncoming,
            right: percept.right,
            hint,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "light={:?} oncoming={:?} right={:?} hint={:?}",
            self.light, self.oncoming, self.right, self.hint
        )
    }
}

/// Per-agent record owned by the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    pub location: Position,
    pub heading: Heading,
    /// Only the primary agent has a destination.
    pub destination: Option<Position>,
    /// Remaining ticks, primary agent only.
    pub deadline: Option<i32>,
    /// Maneuver the agent has announced for the current tick.
    pub hint: Option<Maneuver>,
}

impl AgentState {
    pub fn new(location: Position, heading: Heading) -> Self {
        Self {
            location,
            heading,
            destination: None,
            deadline: None,
            hint: None,
        }
    }
}

/// Capability contract shared by every agent variant.
///
/// `update` runs once per tick while the environment has the agent checked out
/// of its slot, so the agent gets full mutable access to the environment and
/// reaches its own record through `handle`.
pub trait Agent {
    /// Called at the start of every episode with the agent's destination, if any.
    fn episode_reset(&mut self, destination: Option<Position>);

    /// Sense, decide, act and (optionally) learn.
    fn update(&mut self, env: &mut Environment, handle: AgentHandle, tick: u32) -> SimResult<()>;

    /// Last state the agent decided from, for agents that track one.
    fn current_state(&self) -> Option<StateKey> {
        None
    }

    /// Maneuver the agent intends to make next.
    fn next_hint(&self) -> Option<Maneuver>;

    /// The learning policy, for agents that have one.
    fn policy(&self) -> Option<&QLearner> {
        None
    }

    /// Short name used in snapshots and logs.
    fn label(&self) -> &'static str;
}

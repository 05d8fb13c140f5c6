// simulation.rs
use crate::agents::background::BackgroundAgent;
use crate::config::{check_grid_size, SimulationConfig};
use crate::error::{SimError, SimResult};
use crate::global_variables::{
    DEADLINE_PER_DISTANCE, MIN_START_DESTINATION_DISTANCE, REWARD_DESTINATION_BONUS,
};
use crate::simulation_engine::grid::TrafficGrid;
use crate::simulation_engine::intersections::{Heading, LightAxis, LightColor, Position};
use crate::simulation_engine::movement::{
    advance_vehicle, classify_approach, movement_reward, Approach,
};
use crate::simulation_engine::vehicles::{
    Action, Agent, AgentHandle, AgentState, Maneuver, Percept, StateKey,
};

use log::{debug, info, trace, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ENVIRONMENT_ID: AtomicU32 = AtomicU32::new(0);

/// How a finished episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpisodeOutcome {
    /// The primary agent reached its destination.
    Success,
    /// The primary agent ran out of time with the deadline enforced.
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpisodeStatus {
    NotStarted,
    Running,
    Done(EpisodeOutcome),
}

/// The primary agent's most recent action and its consequences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryStep {
    pub tick: u32,
    pub action: Action,
    pub reward: f64,
    pub legal: bool,
    pub location: Position,
    pub deadline: Option<i32>,
    /// State the agent decided from, filled in once its update returns.
    pub state: Option<StateKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub handle: AgentHandle,
    pub label: &'static str,
    pub location: Position,
    pub heading: Heading,
    pub hint: Option<Maneuver>,
    pub destination: Option<Position>,
    pub deadline: Option<i32>,
    /// Action this agent submitted most recently in the episode.
    pub last_action: Option<Action>,
    /// Reward that action earned.
    pub last_reward: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightSnapshot {
    pub position: Position,
    pub open_axis: LightAxis,
}

/// Read-only picture of the world after a tick, for renderers and loggers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSnapshot {
    pub tick: u32,
    pub status: EpisodeStatus,
    pub agents: Vec<AgentSnapshot>,
    pub lights: Vec<LightSnapshot>,
    pub primary_step: Option<PrimaryStep>,
}

impl StepSnapshot {
    /// Human readable status line for the primary agent.
    pub fn status_text(&self) -> String {
        match &self.primary_step {
            Some(step) => format!(
                "state: {}\naction: {}\nreward: {}",
                step.state
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                step.action,
                step.reward
            ),
            None => String::new(),
        }
    }
}

struct AgentSlot {
    state: AgentState,
    label: &'static str,
    last_step: Option<(Action, f64)>,
    /// Empty only while the agent's own update is running.
    agent: Option<Box<dyn Agent>>,
}

/// World within which all agents operate.
pub struct Environment {
    id: u32,
    grid: TrafficGrid,
    slots: Vec<AgentSlot>,
    primary: Option<AgentHandle>,
    enforce_deadline: bool,
    tick: u32,
    status: EpisodeStatus,
    last_primary_step: Option<PrimaryStep>,
    rng: SmallRng,
}

impl Environment {
    /// Builds the network described by `config` and adds its background traffic.
    pub fn new(config: &SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let mut env = Self::with_grid(config.grid_width, config.grid_height, rng)?;
        for _ in 0..config.num_dummies {
            env.register_agent(BackgroundAgent::new);
        }
        Ok(env)
    }

    /// An environment with no agents at all.
    pub fn with_grid(width: i32, height: i32, mut rng: SmallRng) -> SimResult<Self> {
        check_grid_size(width, height)?;
        let grid = TrafficGrid::new(width, height, &mut rng);
        Ok(Self {
            id: NEXT_ENVIRONMENT_ID.fetch_add(1, Ordering::Relaxed),
            grid,
            slots: Vec::new(),
            primary: None,
            enforce_deadline: false,
            tick: 0,
            status: EpisodeStatus::NotStarted,
            last_primary_step: None,
            rng,
        })
    }

    /// Constructs an agent and places it at a random intersection heading south.
    pub fn register_agent<A, F>(&mut self, factory: F) -> AgentHandle
    where
        A: Agent + 'static,
        F: FnOnce(&mut SmallRng) -> A,
    {
        let agent = factory(&mut self.rng);
        let handle = AgentHandle::new(self.id, self.slots.len());
        let mut state = AgentState::new(self.grid.random_position(&mut self.rng), Heading::South);
        state.hint = agent.next_hint();
        debug!(
            "Registered {} agent {:?} at {}",
            agent.label(),
            handle,
            state.location
        );
        self.slots.push(AgentSlot {
            state,
            label: agent.label(),
            last_step: None,
            agent: Some(Box::new(agent)),
        });
        handle
    }

    /// Marks the agent under evaluation. Only it gets a destination and deadline.
    pub fn designate_primary(
        &mut self,
        handle: AgentHandle,
        enforce_deadline: bool,
    ) -> SimResult<()> {
        self.slot(handle)?;
        self.primary = Some(handle);
        self.enforce_deadline = enforce_deadline;
        Ok(())
    }

    /// Starts a new episode: fresh start/destination for the primary agent,
    /// random placement for everyone else, restarted light timing.
    pub fn reset_episode(&mut self) -> SimResult<()> {
        if self.grid.max_distance() < MIN_START_DESTINATION_DISTANCE {
            return Err(SimError::UnsatisfiableEpisodeSetup {
                width: self.grid.width,
                height: self.grid.height,
                min_distance: MIN_START_DESTINATION_DISTANCE,
            });
        }

        self.tick = 0;
        self.status = EpisodeStatus::Running;
        self.last_primary_step = None;
        self.grid.reset_lights();

        let (start, destination) = self.draw_start_and_destination();
        let start_heading = Heading::random(&mut self.rng);
        let deadline = start.manhattan(destination) * DEADLINE_PER_DISTANCE;
        info!(
            "Episode set up with start = {}, destination = {}, deadline = {}",
            start, destination, deadline
        );

        for index in 0..self.slots.len() {
            let is_primary = self.primary.is_some_and(|primary| primary.index() == index);
            let state = if is_primary {
                AgentState {
                    location: start,
                    heading: start_heading,
                    destination: Some(destination),
                    deadline: Some(deadline),
                    hint: None,
                }
            } else {
                AgentState::new(
                    self.grid.random_position(&mut self.rng),
                    Heading::random(&mut self.rng),
                )
            };

            let slot = &mut self.slots[index];
            slot.state = state;
            slot.last_step = None;
            if let Some(agent) = slot.agent.as_mut() {
                agent.episode_reset(slot.state.destination);
                slot.state.hint = agent.next_hint();
            }
        }
        Ok(())
    }

    /// Reject-and-resample until the pair is far enough apart. `reset_episode`
    /// checks beforehand that such a pair exists.
    fn draw_start_and_destination(&mut self) -> (Position, Position) {
        loop {
            let start = self.grid.random_position(&mut self.rng);
            let destination = self.grid.random_position(&mut self.rng);
            if start.manhattan(destination) >= MIN_START_DESTINATION_DISTANCE {
                return (start, destination);
            }
        }
    }

    /// Advances the world by one step: lights first, then every agent in
    /// registration order, then the primary agent's deadline.
    pub fn tick(&mut self) -> SimResult<StepSnapshot> {
        if let EpisodeStatus::Done(outcome) = self.status {
            warn!("tick() called on a finished episode ({:?})", outcome);
            return Ok(self.snapshot());
        }

        let tick = self.tick;
        self.grid.advance_lights(tick);

        for handle in self.agent_handles() {
            let Some(mut agent) = self.slots[handle.index()].agent.take() else {
                continue;
            };
            let result = agent.update(self, handle, tick);

            let slot = &mut self.slots[handle.index()];
            slot.state.hint = agent.next_hint();
            if self.primary == Some(handle) {
                if let Some(step) = self.last_primary_step.as_mut() {
                    if step.tick == tick {
                        step.state = agent.current_state();
                    }
                }
            }
            slot.agent = Some(agent);
            result?;
        }

        self.tick += 1;
        if let Some(primary) = self.primary {
            let state = &mut self.slots[primary.index()].state;
            if self.enforce_deadline
                && self.status == EpisodeStatus::Running
                && state.deadline.is_some_and(|deadline| deadline <= 0)
            {
                self.status = EpisodeStatus::Done(EpisodeOutcome::Failure);
                info!("Primary agent could not reach its destination within the deadline");
            }
            if let Some(deadline) = state.deadline.as_mut() {
                *deadline -= 1;
            }
        }

        Ok(self.snapshot())
    }

    /// What `handle` sees at its intersection.
    ///
    /// Other vehicles at the same intersection with a different heading are
    /// reported by their announced maneuver. When several share an approach the
    /// more demanding maneuver wins: oncoming `left`, right-side `forward` or
    /// `left`, and left-side `forward` are never overwritten.
    pub fn sense(&self, handle: AgentHandle) -> SimResult<Percept> {
        let own = &self.slot(handle)?.state;
        let mut percept = Percept {
            light: self.light_color(own.location, own.heading),
            oncoming: None,
            left: None,
            right: None,
        };

        for (index, other) in self.slots.iter().enumerate() {
            if index == handle.index() || other.state.location != own.location {
                continue;
            }
            let hint = other.state.hint;
            match classify_approach(own.heading, other.state.heading) {
                Some(Approach::Oncoming) => {
                    if percept.oncoming != Some(Maneuver::Left) {
                        percept.oncoming = hint;
                    }
                }
                Some(Approach::Right) => {
                    if !matches!(
                        percept.right,
                        Some(Maneuver::Forward) | Some(Maneuver::Left)
                    ) {
                        percept.right = hint;
                    }
                }
                Some(Approach::Left) => {
                    if percept.left != Some(Maneuver::Forward) {
                        percept.left = hint;
                    }
                }
                None => {}
            }
        }

        trace!("sense({:?}) = {:?}", handle, percept);
        Ok(percept)
    }

    /// Records the maneuver `handle` intends to make this tick. Others sense
    /// it, and the reward for `resolve_action` compares against it.
    pub fn announce_hint(&mut self, handle: AgentHandle, hint: Option<Maneuver>) -> SimResult<()> {
        self.slot_mut(handle)?.state.hint = hint;
        Ok(())
    }

    /// Applies `action` for `handle` and returns the reward it earned.
    ///
    /// Moving against a red light is not an error: the vehicle stays put and
    /// the reward is negative.
    pub fn resolve_action(&mut self, handle: AgentHandle, action: Action) -> SimResult<f64> {
        let state = self.slot(handle)?.state.clone();
        let light = self.light_color(state.location, state.heading);
        let outcome = advance_vehicle(&self.grid, state.location, state.heading, light, action);
        let mut reward = movement_reward(action, &outcome, state.hint);

        let slot = &mut self.slots[handle.index()];
        slot.state.location = outcome.location;
        slot.state.heading = outcome.heading;
        debug!(
            "{} {:?}: action = {}, legal = {}, location = {}, reward = {}",
            slot.label, handle, action, outcome.legal, outcome.location, reward
        );

        if self.primary == Some(handle) {
            if state.destination == Some(outcome.location) {
                if state.deadline.is_some_and(|deadline| deadline >= 0) {
                    reward += REWARD_DESTINATION_BONUS;
                }
                if self.status == EpisodeStatus::Running {
                    self.status = EpisodeStatus::Done(EpisodeOutcome::Success);
                }
                info!("Primary agent has reached its destination");
            }
            self.last_primary_step = Some(PrimaryStep {
                tick: self.tick,
                action,
                reward,
                legal: outcome.legal,
                location: outcome.location,
                deadline: state.deadline,
                state: None,
            });
        }

        self.slots[handle.index()].last_step = Some((action, reward));
        Ok(reward)
    }

    /// Remaining ticks for the primary agent; `None` for everyone else.
    pub fn deadline_of(&self, handle: AgentHandle) -> SimResult<Option<i32>> {
        let slot = self.slot(handle)?;
        if self.primary == Some(handle) {
            Ok(slot.state.deadline)
        } else {
            Ok(None)
        }
    }

    /// Moves an agent directly, outside the traffic rules. For scripted scenarios.
    pub fn place_agent(
        &mut self,
        handle: AgentHandle,
        location: Position,
        heading: Heading,
    ) -> SimResult<()> {
        let location = self.grid.wrap(location.col, location.row);
        let state = &mut self.slot_mut(handle)?.state;
        state.location = location;
        state.heading = heading;
        Ok(())
    }

    /// Overrides the primary agent's destination and deadline for the running episode.
    pub fn set_route(
        &mut self,
        handle: AgentHandle,
        destination: Position,
        deadline: i32,
    ) -> SimResult<()> {
        let slot = self.slot_mut(handle)?;
        slot.state.destination = Some(destination);
        slot.state.deadline = Some(deadline);
        if let Some(agent) = slot.agent.as_mut() {
            agent.episode_reset(Some(destination));
        }
        Ok(())
    }

    pub fn agent_state(&self, handle: AgentHandle) -> SimResult<&AgentState> {
        Ok(&self.slot(handle)?.state)
    }

    pub fn agent_handles(&self) -> Vec<AgentHandle> {
        (0..self.slots.len())
            .map(|index| AgentHandle::new(self.id, index))
            .collect()
    }

    /// Action and reward of the agent's latest `resolve_action` this episode.
    pub fn last_step_of(&self, handle: AgentHandle) -> SimResult<Option<(Action, f64)>> {
        Ok(self.slot(handle)?.last_step)
    }

    /// The agent behind a handle, unless it is currently running its own update.
    pub fn agent(&self, handle: AgentHandle) -> SimResult<Option<&dyn Agent>> {
        Ok(self.slot(handle)?.agent.as_deref())
    }

    pub fn primary(&self) -> Option<AgentHandle> {
        self.primary
    }

    pub fn enforces_deadline(&self) -> bool {
        self.enforce_deadline
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        matches!(self.status, EpisodeStatus::Done(_))
    }

    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    pub fn network(&self) -> &TrafficGrid {
        &self.grid
    }

    pub fn network_mut(&mut self) -> &mut TrafficGrid {
        &mut self.grid
    }

    pub fn last_primary_step(&self) -> Option<&PrimaryStep> {
        self.last_primary_step.as_ref()
    }

    pub fn light_color(&self, location: Position, heading: Heading) -> LightColor {
        self.grid
            .light(&location)
            .map_or(LightColor::Red, |light| light.color_for(heading))
    }

    pub fn snapshot(&self) -> StepSnapshot {
        let agents = self
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| AgentSnapshot {
                handle: AgentHandle::new(self.id, index),
                label: slot.label,
                location: slot.state.location,
                heading: slot.state.heading,
                hint: slot.state.hint,
                destination: slot.state.destination,
                deadline: slot.state.deadline,
                last_action: slot.last_step.map(|(action, _)| action),
                last_reward: slot.last_step.map(|(_, reward)| reward),
            })
            .collect();
        let lights = self
            .grid
            .intersections
            .iter()
            .map(|(&position, light)| LightSnapshot {
                position,
                open_axis: light.open_axis,
            })
            .collect();
        StepSnapshot {
            tick: self.tick,
            status: self.status,
            agents,
            lights,
            primary_step: self.last_primary_step.clone(),
        }
    }

    fn slot(&self, handle: AgentHandle) -> SimResult<&AgentSlot> {
        if handle.environment() != self.id {
            return Err(SimError::InvalidAgentReference(handle));
        }
        self.slots
            .get(handle.index())
            .ok_or(SimError::InvalidAgentReference(handle))
    }

    fn slot_mut(&mut self, handle: AgentHandle) -> SimResult<&mut AgentSlot> {
        if handle.environment() != self.id {
            return Err(SimError::InvalidAgentReference(handle));
        }
        self.slots
            .get_mut(handle.index())
            .ok_or(SimError::InvalidAgentReference(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Does nothing on update; lets tests drive `resolve_action` by hand.
    struct Parked {
        hint: Option<Maneuver>,
    }

    impl Agent for Parked {
        fn episode_reset(&mut self, _destination: Option<Position>) {}

        fn update(
            &mut self,
            _env: &mut Environment,
            _handle: AgentHandle,
            _tick: u32,
        ) -> SimResult<()> {
            Ok(())
        }

        fn next_hint(&self) -> Option<Maneuver> {
            self.hint
        }

        fn label(&self) -> &'static str {
            "parked"
        }
    }

    fn env() -> Environment {
        Environment::with_grid(8, 6, SmallRng::seed_from_u64(42)).unwrap()
    }

    fn parked(env: &mut Environment, hint: Option<Maneuver>) -> AgentHandle {
        env.register_agent(|_| Parked { hint })
    }

    fn set_axis(env: &mut Environment, at: Position, axis: LightAxis) {
        let light = env.network_mut().intersections.get_mut(&at).unwrap();
        light.open_axis = axis;
        light.period = 5;
        light.last_flip = 0;
    }

    #[test]
    fn registration_places_agents_in_bounds_heading_south() {
        let mut env = env();
        let a = parked(&mut env, None);
        let state = env.agent_state(a).unwrap();
        assert_eq!(state.heading, Heading::South);
        assert!(env.network().contains(&state.location));
        assert_eq!(state.destination, None);
        assert_eq!(env.deadline_of(a).unwrap(), None);
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let mut env = env();
        let bogus = AgentHandle::new(env.id, 7);
        assert!(matches!(
            env.sense(bogus),
            Err(SimError::InvalidAgentReference(_))
        ));
        assert!(env.resolve_action(bogus, Action::None).is_err());
        assert!(env.designate_primary(bogus, true).is_err());
        assert!(env.deadline_of(bogus).is_err());
    }

    #[test]
    fn handles_from_another_environment_are_rejected() {
        let mut first = env();
        let mut second = env();
        let ours = parked(&mut first, None);
        let theirs = parked(&mut second, None);
        assert_eq!(ours.index(), theirs.index());
        assert_ne!(ours.environment(), theirs.environment());

        assert!(first.agent_state(ours).is_ok());
        assert!(matches!(
            first.agent_state(theirs),
            Err(SimError::InvalidAgentReference(_))
        ));
        assert!(first.resolve_action(theirs, Action::None).is_err());
        assert!(first.designate_primary(theirs, true).is_err());
    }

    #[test]
    fn resolved_actions_are_recorded_per_agent() {
        let mut env = env();
        let car = parked(&mut env, None);
        assert_eq!(env.last_step_of(car).unwrap(), None);
        env.resolve_action(car, Action::None).unwrap();
        assert_eq!(env.last_step_of(car).unwrap(), Some((Action::None, 1.0)));

        let snapshot = env.snapshot();
        assert_eq!(snapshot.agents[0].last_action, Some(Action::None));
        assert_eq!(snapshot.agents[0].last_reward, Some(1.0));

        env.designate_primary(car, true).unwrap();
        env.reset_episode().unwrap();
        assert_eq!(env.last_step_of(car).unwrap(), None);
    }

    #[test]
    fn oversized_grid_is_rejected_before_building() {
        let result = Environment::with_grid(i32::MAX, 6, SmallRng::seed_from_u64(1));
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn too_small_grid_fails_fast() {
        let result = Environment::with_grid(2, 2, SmallRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(SimError::UnsatisfiableEpisodeSetup { .. })
        ));
    }

    #[test]
    fn reset_sets_up_primary_route() {
        let mut env = env();
        let primary = parked(&mut env, None);
        let other = parked(&mut env, Some(Maneuver::Left));
        env.designate_primary(primary, true).unwrap();
        env.reset_episode().unwrap();

        assert_eq!(env.status(), EpisodeStatus::Running);
        assert_eq!(env.current_tick(), 0);
        let state = env.agent_state(primary).unwrap().clone();
        let destination = state.destination.unwrap();
        let distance = state.location.manhattan(destination);
        assert!(distance >= 4);
        assert_eq!(state.deadline, Some(distance * 5));
        assert_eq!(env.deadline_of(primary).unwrap(), Some(distance * 5));

        let other_state = env.agent_state(other).unwrap();
        assert_eq!(other_state.destination, None);
        assert_eq!(other_state.deadline, None);
        assert_eq!(other_state.hint, Some(Maneuver::Left));
    }

    #[test]
    fn sensing_classifies_by_heading() {
        let mut env = env();
        let me = parked(&mut env, None);
        let oncoming = parked(&mut env, Some(Maneuver::Forward));
        let from_right = parked(&mut env, Some(Maneuver::Left));
        let from_left = parked(&mut env, Some(Maneuver::Right));
        let same_way = parked(&mut env, Some(Maneuver::Forward));
        let here = Position::new(2, 2);
        env.place_agent(me, here, Heading::North).unwrap();
        env.place_agent(oncoming, here, Heading::South).unwrap();
        env.place_agent(from_right, here, Heading::West).unwrap();
        env.place_agent(from_left, here, Heading::East).unwrap();
        env.place_agent(same_way, here, Heading::North).unwrap();
        set_axis(&mut env, here, LightAxis::NorthSouth);

        let percept = env.sense(me).unwrap();
        assert_eq!(percept.light, LightColor::Green);
        assert_eq!(percept.oncoming, Some(Maneuver::Forward));
        assert_eq!(percept.right, Some(Maneuver::Left));
        assert_eq!(percept.left, Some(Maneuver::Right));
    }

    #[test]
    fn sensing_keeps_higher_priority_maneuvers() {
        let mut env = env();
        let me = parked(&mut env, None);
        let first = parked(&mut env, Some(Maneuver::Left));
        let second = parked(&mut env, Some(Maneuver::Right));
        let here = Position::new(4, 1);
        env.place_agent(me, here, Heading::East).unwrap();
        env.place_agent(first, here, Heading::West).unwrap();
        env.place_agent(second, here, Heading::West).unwrap();
        assert_eq!(env.sense(me).unwrap().oncoming, Some(Maneuver::Left));

        // Left-side traffic already going forward is not overwritten.
        let mut env = self::env();
        let me = parked(&mut env, None);
        let first = parked(&mut env, Some(Maneuver::Forward));
        let second = parked(&mut env, Some(Maneuver::Right));
        env.place_agent(me, here, Heading::North).unwrap();
        env.place_agent(first, here, Heading::East).unwrap();
        env.place_agent(second, here, Heading::East).unwrap();
        assert_eq!(env.sense(me).unwrap().left, Some(Maneuver::Forward));
    }

    #[test]
    fn red_light_blocks_forward_but_not_right() {
        let mut env = env();
        let car = parked(&mut env, Some(Maneuver::Forward));
        let here = Position::new(3, 3);
        env.place_agent(car, here, Heading::North).unwrap();
        set_axis(&mut env, here, LightAxis::EastWest);

        assert_eq!(env.resolve_action(car, Action::Forward).unwrap(), -1.0);
        assert_eq!(env.resolve_action(car, Action::Left).unwrap(), -1.0);
        assert_eq!(env.agent_state(car).unwrap().location, here);

        assert_eq!(env.resolve_action(car, Action::Right).unwrap(), 0.5);
        let state = env.agent_state(car).unwrap();
        assert_eq!(state.location, Position::new(4, 3));
        assert_eq!(state.heading, Heading::East);
    }

    #[test]
    fn arriving_adds_bonus_and_ends_episode() {
        let mut env = env();
        let car = parked(&mut env, None);
        env.designate_primary(car, true).unwrap();
        env.reset_episode().unwrap();
        let here = Position::new(3, 3);
        env.place_agent(car, here, Heading::East).unwrap();
        set_axis(&mut env, here, LightAxis::EastWest);
        env.set_route(car, Position::new(4, 3), 0).unwrap();
        env.announce_hint(car, Some(Maneuver::Forward)).unwrap();

        let reward = env.resolve_action(car, Action::Forward).unwrap();
        assert_eq!(reward, 2.0 + 10.0);
        assert_eq!(env.status(), EpisodeStatus::Done(EpisodeOutcome::Success));
        let step = env.last_primary_step().unwrap();
        assert_eq!(step.action, Action::Forward);
        assert_eq!(step.reward, 12.0);
    }

    #[test]
    fn arriving_late_gets_no_bonus() {
        let mut env = env();
        let car = parked(&mut env, None);
        env.designate_primary(car, false).unwrap();
        env.reset_episode().unwrap();
        let here = Position::new(3, 3);
        env.place_agent(car, here, Heading::North).unwrap();
        env.set_route(car, Position::new(4, 3), -2).unwrap();

        let reward = env.resolve_action(car, Action::Right).unwrap();
        assert_eq!(reward, 0.5);
        assert!(env.is_done());
    }

    #[test]
    fn deadline_counts_down_and_fails_when_enforced() {
        let mut env = env();
        let car = parked(&mut env, None);
        env.designate_primary(car, true).unwrap();
        env.reset_episode().unwrap();
        let here = env.agent_state(car).unwrap().location;
        env.set_route(car, here, 1).unwrap();

        env.tick().unwrap();
        assert_eq!(env.deadline_of(car).unwrap(), Some(0));
        assert_eq!(env.status(), EpisodeStatus::Running);

        let snapshot = env.tick().unwrap();
        assert_eq!(snapshot.status, EpisodeStatus::Done(EpisodeOutcome::Failure));
        assert_eq!(env.deadline_of(car).unwrap(), Some(-1));
        assert_eq!(env.current_tick(), 2);

        // Finished episodes do not advance.
        env.tick().unwrap();
        assert_eq!(env.current_tick(), 2);
    }

    #[test]
    fn deadline_is_not_enforced_when_disabled() {
        let mut env = env();
        let car = parked(&mut env, None);
        env.designate_primary(car, false).unwrap();
        env.reset_episode().unwrap();
        let deadline = env.deadline_of(car).unwrap().unwrap();
        for _ in 0..(deadline + 3) {
            env.tick().unwrap();
        }
        assert_eq!(env.status(), EpisodeStatus::Running);
        assert_eq!(env.deadline_of(car).unwrap(), Some(-3));
    }

    #[test]
    fn snapshot_lists_every_agent_and_light() {
        let mut env = env();
        parked(&mut env, None);
        parked(&mut env, Some(Maneuver::Right));
        let snapshot = env.snapshot();
        assert_eq!(snapshot.agents.len(), 2);
        assert_eq!(snapshot.lights.len(), 48);
        assert_eq!(snapshot.agents[1].hint, Some(Maneuver::Right));
        assert_eq!(snapshot.status, EpisodeStatus::NotStarted);
    }
}

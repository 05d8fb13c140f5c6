use crate::error::SimResult;
use crate::simulation_engine::intersections::Position;
use crate::simulation_engine::movement::maneuver_is_clear;
use crate::simulation_engine::route_generation::{GridRoutePlanner, RouteHintProvider};
use crate::simulation_engine::simulation::Environment;
use crate::simulation_engine::vehicles::{Action, Agent, AgentHandle, Maneuver, StateKey};
use log::debug;

/// Non-learning baseline: follows the route planner whenever the
/// right-of-way rules allow it, otherwise waits.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedAgent<P: RouteHintProvider = GridRoutePlanner> {
    planner: P,
    hint: Option<Maneuver>,
    state: Option<StateKey>,
    total_reward: f64,
}

impl RuleBasedAgent<GridRoutePlanner> {
    pub fn new() -> Self {
        Self::with_planner(GridRoutePlanner::new())
    }
}

impl<P: RouteHintProvider> RuleBasedAgent<P> {
    pub fn with_planner(planner: P) -> Self {
        Self {
            planner,
            hint: None,
            state: None,
            total_reward: 0.0,
        }
    }

    /// Reward collected since the last episode reset.
    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }
}

impl<P: RouteHintProvider> Agent for RuleBasedAgent<P> {
    fn episode_reset(&mut self, destination: Option<Position>) {
        self.planner.set_destination(destination);
        self.hint = None;
        self.state = None;
        self.total_reward = 0.0;
    }

    fn update(&mut self, env: &mut Environment, handle: AgentHandle, tick: u32) -> SimResult<()> {
        let me = env.agent_state(handle)?;
        self.hint = self.planner.hint(me.location, me.heading);
        env.announce_hint(handle, self.hint)?;

        let percept = env.sense(handle)?;
        let deadline = env.deadline_of(handle)?;
        self.state = Some(StateKey::new(&percept, self.hint));

        let action = match self.hint {
            Some(maneuver) if maneuver_is_clear(maneuver, &percept) => Action::from(maneuver),
            _ => Action::None,
        };
        let reward = env.resolve_action(handle, action)?;
        self.total_reward += reward;

        debug!(
            "RuleBasedAgent.update(): t = {}, deadline = {:?}, percept = {:?}, action = {}, reward = {}",
            tick, deadline, percept, action, reward
        );
        Ok(())
    }

    fn current_state(&self) -> Option<StateKey> {
        self.state
    }

    fn next_hint(&self) -> Option<Maneuver> {
        self.hint
    }

    fn label(&self) -> &'static str {
        "rule_based"
    }
}

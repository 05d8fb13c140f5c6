use crate::config::LearningParams;
use crate::error::SimResult;
use crate::learning::QLearner;
use crate::simulation_engine::intersections::Position;
use crate::simulation_engine::route_generation::{GridRoutePlanner, RouteHintProvider};
use crate::simulation_engine::simulation::Environment;
use crate::simulation_engine::vehicles::{Agent, AgentHandle, Maneuver, StateKey};
use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Driver that learns a policy over (light, oncoming, right, hint) states.
#[derive(Debug, Clone)]
pub struct QLearningAgent<P: RouteHintProvider = GridRoutePlanner> {
    planner: P,
    learner: QLearner,
    hint: Option<Maneuver>,
    state: Option<StateKey>,
    total_reward: f64,
}

impl QLearningAgent<GridRoutePlanner> {
    pub fn new(params: LearningParams, rng: &mut SmallRng) -> Self {
        Self::with_planner(GridRoutePlanner::new(), params, rng)
    }
}

impl<P: RouteHintProvider> QLearningAgent<P> {
    pub fn with_planner(planner: P, params: LearningParams, rng: &mut SmallRng) -> Self {
        Self {
            planner,
            learner: QLearner::new(params, SmallRng::from_rng(rng)),
            hint: None,
            state: None,
            total_reward: 0.0,
        }
    }

    pub fn learner(&self) -> &QLearner {
        &self.learner
    }

    /// Reward collected since the last episode reset.
    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }
}

impl<P: RouteHintProvider> Agent for QLearningAgent<P> {
    /// The learner is kept: what was learned carries into the next episode.
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
        let state = StateKey::new(&percept, self.hint);

        let action = self.learner.choose_action(&state);
        let reward = env.resolve_action(handle, action)?;
        self.total_reward += reward;

        // The hint is not recomputed: the next state pairs the new percept
        // with the maneuver this step was planned against.
        let next_state = StateKey::new(&env.sense(handle)?, self.hint);
        self.learner.update(state, action, reward, &next_state);
        self.state = Some(state);

        debug!(
            "QLearningAgent.update(): t = {}, deadline = {:?}, state = {}, action = {}, reward = {}",
            tick, deadline, state, action, reward
        );
        Ok(())
    }

    fn current_state(&self) -> Option<StateKey> {
        self.state
    }

    fn next_hint(&self) -> Option<Maneuver> {
        self.hint
    }

    fn policy(&self) -> Option<&QLearner> {
        Some(&self.learner)
    }

    fn label(&self) -> &'static str {
        "q_learning"
    }
}

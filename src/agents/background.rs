use crate::error::SimResult;
use crate::simulation_engine::intersections::Position;
use crate::simulation_engine::movement::maneuver_is_clear;
use crate::simulation_engine::simulation::Environment;
use crate::simulation_engine::vehicles::{Action, Agent, AgentHandle, Maneuver};
use log::debug;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

/// Route-agnostic traffic: commits to a random maneuver, waits until the
/// right-of-way rules allow it, makes it, then picks the next one.
#[derive(Debug, Clone)]
pub struct BackgroundAgent {
    maneuver: Maneuver,
    rng: SmallRng,
}

impl BackgroundAgent {
    pub fn new(rng: &mut SmallRng) -> Self {
        let mut rng = SmallRng::from_rng(rng);
        let maneuver = random_maneuver(&mut rng);
        Self { maneuver, rng }
    }

    pub fn with_maneuver(maneuver: Maneuver, rng: &mut SmallRng) -> Self {
        Self {
            maneuver,
            rng: SmallRng::from_rng(rng),
        }
    }
}

fn random_maneuver(rng: &mut SmallRng) -> Maneuver {
    *Maneuver::ALL.choose(rng).unwrap_or(&Maneuver::Forward)
}

impl Agent for BackgroundAgent {
    fn episode_reset(&mut self, _destination: Option<Position>) {}

    fn update(&mut self, env: &mut Environment, handle: AgentHandle, tick: u32) -> SimResult<()> {
        let percept = env.sense(handle)?;

        // A cleared maneuver is replaced before the move resolves, so the
        // reward is scored against the newly announced one.
        let action = if maneuver_is_clear(self.maneuver, &percept) {
            let action = Action::from(self.maneuver);
            self.maneuver = random_maneuver(&mut self.rng);
            action
        } else {
            Action::None
        };
        env.announce_hint(handle, Some(self.maneuver))?;
        let reward = env.resolve_action(handle, action)?;

        debug!(
            "BackgroundAgent.update(): t = {}, percept = {:?}, action = {}, reward = {}, next = {:?}",
            tick, percept, action, reward, self.maneuver
        );
        Ok(())
    }

    fn next_hint(&self) -> Option<Maneuver> {
        Some(self.maneuver)
    }

    fn label(&self) -> &'static str {
        "background"
    }
}

use rand::rngs::SmallRng;
use rand::SeedableRng;
use smartcab_sim::agents::{BackgroundAgent, QLearningAgent};
use smartcab_sim::config::{LearningParams, SimulationConfig};
use smartcab_sim::error::SimResult;
use smartcab_sim::simulation_engine::intersections::{Heading, LightAxis, LightColor, Position};
use smartcab_sim::simulation_engine::simulation::{EpisodeOutcome, EpisodeStatus, Environment};
use smartcab_sim::simulation_engine::vehicles::{Action, Agent, AgentHandle, Maneuver};

/// Never moves; announces a fixed maneuver.
struct Stationary(Option<Maneuver>);

impl Agent for Stationary {
    fn episode_reset(&mut self, _destination: Option<Position>) {}

    fn update(&mut self, _env: &mut Environment, _handle: AgentHandle, _tick: u32) -> SimResult<()> {
        Ok(())
    }

    fn next_hint(&self) -> Option<Maneuver> {
        self.0
    }

    fn label(&self) -> &'static str {
        "stationary"
    }
}

fn seeded_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        seed: Some(seed),
        ..SimulationConfig::default()
    }
}

fn hold_axis(env: &mut Environment, at: Position, axis: LightAxis) {
    let light = env.network_mut().intersections.get_mut(&at).unwrap();
    light.open_axis = axis;
    light.period = 5;
    light.last_flip = 0;
}

#[test]
fn agents_stay_on_the_torus() {
    let config = seeded_config(21);
    let mut env = Environment::new(&config).unwrap();
    let primary = env.register_agent(|rng| QLearningAgent::new(LearningParams::default(), rng));
    env.designate_primary(primary, false).unwrap();
    env.reset_episode().unwrap();

    for _ in 0..300 {
        if env.is_done() {
            env.reset_episode().unwrap();
        }
        let snapshot = env.tick().unwrap();
        for agent in &snapshot.agents {
            assert!(
                env.network().contains(&agent.location),
                "{:?} left the grid at {}",
                agent.handle,
                agent.location
            );
        }
    }
}

#[test]
fn episodes_start_far_enough_from_the_destination() {
    for seed in 0..50 {
        let mut env = Environment::new(&seeded_config(seed)).unwrap();
        let primary = env.register_agent(|_| Stationary(None));
        env.designate_primary(primary, true).unwrap();
        env.reset_episode().unwrap();

        let state = env.agent_state(primary).unwrap();
        let destination = state.destination.unwrap();
        let distance = state.location.manhattan(destination);
        assert!(distance >= 4, "seed {}: distance {}", seed, distance);
        assert_eq!(env.deadline_of(primary).unwrap(), Some(distance * 5));
    }
}

#[test]
fn perpendicular_traffic_never_shares_a_green() {
    let mut env = Environment::with_grid(8, 6, SmallRng::seed_from_u64(4)).unwrap();
    let at = Position::new(2, 2);
    let north = env.register_agent(|_| Stationary(Some(Maneuver::Forward)));
    let east = env.register_agent(|_| Stationary(Some(Maneuver::Forward)));
    env.place_agent(north, at, Heading::North).unwrap();
    env.place_agent(east, at, Heading::East).unwrap();

    for axis in [LightAxis::NorthSouth, LightAxis::EastWest] {
        hold_axis(&mut env, at, axis);
        let north_light = env.sense(north).unwrap().light;
        let east_light = env.sense(east).unwrap().light;
        assert_ne!(north_light, east_light);
        assert!(north_light == LightColor::Green || east_light == LightColor::Green);
    }
}

#[test]
fn background_right_turn_yields_to_left_traffic_on_red() {
    let mut env = Environment::with_grid(8, 6, SmallRng::seed_from_u64(9)).unwrap();
    let at = Position::new(3, 3);
    let turner = env.register_agent(|rng| BackgroundAgent::with_maneuver(Maneuver::Right, rng));
    let crossing = env.register_agent(|_| Stationary(Some(Maneuver::Forward)));
    env.place_agent(turner, at, Heading::North).unwrap();
    // Heading east at this intersection means approaching from the turner's left.
    env.place_agent(crossing, at, Heading::East).unwrap();
    hold_axis(&mut env, at, LightAxis::EastWest);

    let percept = env.sense(turner).unwrap();
    assert_eq!(percept.light, LightColor::Red);
    assert_eq!(percept.left, Some(Maneuver::Forward));

    let snapshot = env.tick().unwrap();
    let seen = snapshot
        .agents
        .iter()
        .find(|agent| agent.handle == turner)
        .unwrap();
    assert_eq!(seen.last_action, Some(Action::None));
    assert_eq!(seen.last_reward, Some(1.0));
    assert_eq!(seen.hint, Some(Maneuver::Right));
    assert_eq!(env.last_step_of(turner).unwrap(), Some((Action::None, 1.0)));

    let state = env.agent_state(turner).unwrap();
    assert_eq!(state.location, at);
    assert_eq!(state.heading, Heading::North);
}

#[test]
fn expired_deadline_fails_the_episode() {
    let mut env = Environment::new(&seeded_config(2)).unwrap();
    let primary = env.register_agent(|_| Stationary(None));
    env.designate_primary(primary, true).unwrap();
    env.reset_episode().unwrap();

    let here = env.agent_state(primary).unwrap().location;
    let far = env.network().wrap(here.col + 3, here.row + 2);
    env.set_route(primary, far, 0).unwrap();

    env.tick().unwrap();
    assert_eq!(env.status(), EpisodeStatus::Done(EpisodeOutcome::Failure));
    assert_eq!(env.deadline_of(primary).unwrap(), Some(-1));

    // Further ticks leave the finished episode untouched.
    env.tick().unwrap();
    assert_eq!(env.current_tick(), 1);
    assert_eq!(env.deadline_of(primary).unwrap(), Some(-1));
}

// simulation_main.rs
use log::info;
use smartcab_sim::agents::QLearningAgent;
use smartcab_sim::config::SimulationConfig;
use smartcab_sim::monitoring::trial_report::{log_trials_to_csv, plot_learning_curve};
use smartcab_sim::simulation_engine::simulation::Environment;
use smartcab_sim::simulation_engine::simulator::{success_rate, Simulator};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    info!("Starting Q-learning run with {:?}", config);

    let mut env = Environment::new(&config)?;
    let learning = config.learning;
    let primary = env.register_agent(|rng| QLearningAgent::new(learning, rng));
    env.designate_primary(primary, config.enforce_deadline)?;

    let mut simulator = Simulator::new(env, config.max_ticks_per_trial);
    let trials = simulator.run(config.n_trials)?;

    if let Some(agent) = simulator.environment().agent(primary)? {
        if let Some(learner) = agent.policy() {
            info!("Learned {} state-action values", learner.table().len());
        }
    }
    println!(
        "Q-learning agent: {} trials, success rate {:.2}",
        trials.len(),
        success_rate(&trials)
    );

    if let Some(path) = &config.report.csv_path {
        log_trials_to_csv(path, &trials)?;
    }
    if let Some(path) = &config.report.chart_path {
        plot_learning_curve(path, &trials)?;
    }
    Ok(())
}

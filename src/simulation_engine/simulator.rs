// simulator.rs
//
// Headless run driver: resets the environment, ticks it until the episode
// ends or the step budget runs out, and records how the primary agent did.

use crate::error::SimResult;
use crate::simulation_engine::simulation::{EpisodeOutcome, EpisodeStatus, Environment};
use log::{info, trace, warn};
use serde::{Deserialize, Serialize};

/// How a single trial ended from the driver's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialOutcome {
    Success,
    Failure,
    /// The step budget ran out before the episode finished.
    Timeout,
}

/// One row of the training report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub trial: usize,
    pub outcome: TrialOutcome,
    pub ticks: u32,
    /// Sum of the primary agent's rewards over the trial.
    pub total_reward: f64,
    /// Deadline left when the trial ended.
    pub deadline_remaining: Option<i32>,
    /// Number of illegal moves the primary agent attempted.
    pub penalties: u32,
    /// Entries in the primary agent's learning table, if it learns.
    pub learned_entries: Option<usize>,
}

pub struct Simulator {
    env: Environment,
    max_ticks_per_trial: u32,
}

impl Simulator {
    pub fn new(env: Environment, max_ticks_per_trial: u32) -> Self {
        Self {
            env,
            max_ticks_per_trial,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn into_environment(self) -> Environment {
        self.env
    }

    /// Runs `n_trials` episodes back to back.
    pub fn run(&mut self, n_trials: usize) -> SimResult<Vec<TrialSummary>> {
        let mut trials = Vec::with_capacity(n_trials);
        for trial in 0..n_trials {
            let summary = self.run_trial(trial)?;
            info!(
                "Trial {}: {:?} after {} ticks, total reward {:.1}, deadline left {:?}",
                summary.trial,
                summary.outcome,
                summary.ticks,
                summary.total_reward,
                summary.deadline_remaining
            );
            trials.push(summary);
        }
        info!(
            "{} trials finished, success rate {:.2}",
            trials.len(),
            success_rate(&trials)
        );
        Ok(trials)
    }

    pub fn run_trial(&mut self, trial: usize) -> SimResult<TrialSummary> {
        self.env.reset_episode()?;
        let mut total_reward = 0.0;
        let mut penalties = 0;

        while !self.env.is_done() && self.env.current_tick() < self.max_ticks_per_trial {
            let tick = self.env.current_tick();
            let snapshot = self.env.tick()?;
            trace!("tick {}\n{}", tick, snapshot.status_text());
            if let Some(step) = snapshot.primary_step.filter(|step| step.tick == tick) {
                total_reward += step.reward;
                if !step.legal {
                    penalties += 1;
                }
            }
        }

        let outcome = match self.env.status() {
            EpisodeStatus::Done(EpisodeOutcome::Success) => TrialOutcome::Success,
            EpisodeStatus::Done(EpisodeOutcome::Failure) => TrialOutcome::Failure,
            _ => {
                warn!(
                    "Trial {} hit the step budget of {} ticks",
                    trial, self.max_ticks_per_trial
                );
                TrialOutcome::Timeout
            }
        };

        let (deadline_remaining, learned_entries) = match self.env.primary() {
            Some(primary) => (
                self.env.deadline_of(primary)?,
                self.env
                    .agent(primary)?
                    .and_then(|agent| agent.policy())
                    .map(|learner| learner.table().len()),
            ),
            None => (None, None),
        };

        Ok(TrialSummary {
            trial,
            outcome,
            ticks: self.env.current_tick(),
            total_reward,
            deadline_remaining,
            penalties,
            learned_entries,
        })
    }
}

/// Fraction of trials that reached the destination.
pub fn success_rate(trials: &[TrialSummary]) -> f64 {
    if trials.is_empty() {
        return 0.0;
    }
    let successes = trials
        .iter()
        .filter(|t| t.outcome == TrialOutcome::Success)
        .count();
    successes as f64 / trials.len() as f64
}

use crate::config::LearningParams;
use crate::simulation_engine::vehicles::{Action, StateKey};
use log::trace;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;

/// Sparse table of action values, keyed by (state, action).
#[derive(Debug, Clone, Default)]
pub struct QTable {
    values: HashMap<(StateKey, Action), f64>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, state: &StateKey, action: Action) -> Option<f64> {
        self.values.get(&(*state, action)).copied()
    }

    pub fn set(&mut self, state: StateKey, action: Action, value: f64) {
        self.values.insert((state, action), value);
    }

    /// Values of all four actions for `state`, in `Action::ALL` order.
    pub fn row(&self, state: &StateKey) -> [Option<f64>; 4] {
        Action::ALL.map(|action| self.get(state, action))
    }

    /// Highest value recorded for `state`, if any action has one.
    pub fn best_value(&self, state: &StateKey) -> Option<f64> {
        self.row(state).into_iter().flatten().reduce(f64::max)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(StateKey, Action), &f64)> {
        self.values.iter()
    }
}

/// Epsilon-greedy tabular learner.
///
/// Update rule: an unseen pair starts at the observed reward, and a seen pair
/// moves by `alpha * (reward - gamma * best_next)`. The current estimate is
/// never subtracted, so this is not the textbook temporal-difference update.
///
/// The table lives as long as the learner; one learner spans a whole
/// training run, across episodes.
#[derive(Debug, Clone)]
pub struct QLearner {
    table: QTable,
    params: LearningParams,
    rng: SmallRng,
}

impl QLearner {
    pub fn new(params: LearningParams, rng: SmallRng) -> Self {
        Self {
            table: QTable::new(),
            params,
            rng,
        }
    }

    pub fn params(&self) -> LearningParams {
        self.params
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn value(&self, state: &StateKey, action: Action) -> Option<f64> {
        self.table.get(state, action)
    }

    /// Explores with probability epsilon, otherwise exploits.
    pub fn choose_action(&mut self, state: &StateKey) -> Action {
        if self.rng.random::<f64>() < self.params.epsilon {
            let action = Action::ALL[self.rng.random_range(0..Action::ALL.len())];
            trace!("explore: {} for {}", action, state);
            return action;
        }
        self.best_action(state)
    }

    /// Greedy choice. Actions without a value never beat one that has a value;
    /// ties (including "nothing known yet") are broken uniformly at random.
    pub fn best_action(&mut self, state: &StateKey) -> Action {
        let row = self.table.row(state);
        let candidates: Vec<Action> = match row.into_iter().flatten().reduce(f64::max) {
            Some(max) => Action::ALL
                .into_iter()
                .zip(row)
                .filter(|&(_, value)| value == Some(max))
                .map(|(action, _)| action)
                .collect(),
            None => Action::ALL.to_vec(),
        };
        *candidates.choose(&mut self.rng).unwrap_or(&Action::None)
    }

    /// Folds one observed transition into the table.
    pub fn update(&mut self, state: StateKey, action: Action, reward: f64, next_state: &StateKey) {
        let best_next = self.table.best_value(next_state).unwrap_or(0.0);
        let value = match self.table.get(&state, action) {
            None => reward,
            Some(current) => {
                current + self.params.alpha * (reward - self.params.gamma * best_next)
            }
        };
        trace!("Q({}, {}) = {}", state, action, value);
        self.table.set(state, action, value);
    }
}

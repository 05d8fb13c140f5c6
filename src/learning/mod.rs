pub mod q_learner;

pub use q_learner::{QLearner, QTable};

pub mod background;
pub mod learning;
pub mod rule_based;

pub use background::BackgroundAgent;
pub use learning::QLearningAgent;
pub use rule_based::RuleBasedAgent;

// Road network defaults (cols, rows)
pub const DEFAULT_GRID_WIDTH: i32 = 8;
pub const DEFAULT_GRID_HEIGHT: i32 = 6;
pub const DEFAULT_NUM_DUMMIES: usize = 3;
pub const MAX_GRID_DIMENSION: i32 = 1000;

// Episode setup
pub const MIN_START_DESTINATION_DISTANCE: i32 = 4;
pub const DEADLINE_PER_DISTANCE: i32 = 5;

// Traffic light periods (ticks between phase flips)
pub const LIGHT_PERIODS: [u32; 3] = [3, 4, 5];

// Rewards
pub const REWARD_WAIT: f64 = 1.0;
pub const REWARD_ILLEGAL_MOVE: f64 = -1.0;
pub const REWARD_FOLLOWED_HINT: f64 = 2.0;
pub const REWARD_OTHER_MOVE: f64 = 0.5;
pub const REWARD_DESTINATION_BONUS: f64 = 10.0;

// Q-learning defaults for the learning agent
pub const DEFAULT_EPSILON: f64 = 0.05;
pub const DEFAULT_ALPHA: f64 = 0.1;
pub const DEFAULT_GAMMA: f64 = 0.9;

// Run driver
pub const DEFAULT_N_TRIALS: usize = 100;
pub const DEFAULT_MAX_TICKS_PER_TRIAL: u32 = 500;

pub const DEFAULT_NUM_TREES: usize = 2000;
pub const DEFAULT_MIN_NODE_SIZE: usize = 5;
pub const DEFAULT_SAMPLE_FRACTION: f64 = 0.5;
pub const DEFAULT_ALPHA: f64 = 0.05;
pub const MAX_ALPHA: f64 = 0.25;

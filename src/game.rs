#![warn(clippy::all, clippy::pedantic)]

// Board dimensions
pub const BOARD_WIDTH: usize = 12;
pub const BOARD_HEIGHT: usize = 20;

// Pieces spawn this many rows above the visible top
pub const SPAWN_MARGIN: i32 = 1;

// Horizontal offsets tried, in order, after a rotation
pub const KICK_OFFSETS: [i32; 5] = [0, 1, -1, 2, -2];

// Line clear scoring, indexed by rows cleared, multiplied by (level + 1)
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];
pub const LINES_PER_LEVEL: u32 = 10;

// Default tunables
pub const DEFAULT_GRAVITY: f64 = 1.0; // cells per second
pub const DEFAULT_SOFT_DROP_FACTOR: f64 = 20.0;
pub const DEFAULT_DAS_MS: f64 = 170.0;
pub const DEFAULT_ARR_MS: f64 = 50.0;
pub const DEFAULT_LOCK_DELAY_MS: f64 = 500.0;
pub const DEFAULT_NEXT_COUNT: usize = 3;
pub const DEFAULT_GAME_OVER_DELAY_MS: f64 = 1000.0;

// Clamps applied to user supplied tunables
pub const MIN_GRAVITY: f64 = 0.01;
pub const MIN_SOFT_DROP_FACTOR: f64 = 1.0;
pub const MIN_BOARD_SIZE: usize = 4;
pub const MAX_BOARD_SIZE: usize = 64;
pub const MAX_NEXT_COUNT: usize = 6;

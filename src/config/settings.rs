#![warn(clippy::all, clippy::pedantic)]

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::game::{
    BOARD_HEIGHT, BOARD_WIDTH, DEFAULT_ARR_MS, DEFAULT_DAS_MS, DEFAULT_GAME_OVER_DELAY_MS,
    DEFAULT_GRAVITY, DEFAULT_LOCK_DELAY_MS, DEFAULT_NEXT_COUNT, DEFAULT_SOFT_DROP_FACTOR,
    MAX_BOARD_SIZE, MAX_NEXT_COUNT, MIN_BOARD_SIZE, MIN_GRAVITY, MIN_SOFT_DROP_FACTOR,
};

// Gameplay tunables
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gravity: f64, // cells per second
    pub soft_drop_factor: f64,
    pub das_ms: f64,
    pub arr_ms: f64,
    pub lock_delay_ms: f64,
    pub next_count: usize,
    pub board_width: usize,
    pub board_height: usize,
    pub game_over_delay_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            soft_drop_factor: DEFAULT_SOFT_DROP_FACTOR,
            das_ms: DEFAULT_DAS_MS,
            arr_ms: DEFAULT_ARR_MS,
            lock_delay_ms: DEFAULT_LOCK_DELAY_MS,
            next_count: DEFAULT_NEXT_COUNT,
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            game_over_delay_ms: DEFAULT_GAME_OVER_DELAY_MS,
        }
    }
}

impl Settings {
    /// Clamps every tunable into a range the simulation can divide by and allocate.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.gravity = finite_or(self.gravity, DEFAULT_GRAVITY).max(MIN_GRAVITY);
        self.soft_drop_factor =
            finite_or(self.soft_drop_factor, DEFAULT_SOFT_DROP_FACTOR).max(MIN_SOFT_DROP_FACTOR);
        self.das_ms = finite_or(self.das_ms, DEFAULT_DAS_MS).max(0.0);
        self.arr_ms = finite_or(self.arr_ms, DEFAULT_ARR_MS).max(0.0);
        self.lock_delay_ms = finite_or(self.lock_delay_ms, DEFAULT_LOCK_DELAY_MS).max(0.0);
        self.game_over_delay_ms =
            finite_or(self.game_over_delay_ms, DEFAULT_GAME_OVER_DELAY_MS).max(0.0);
        self.next_count = self.next_count.clamp(1, MAX_NEXT_COUNT);
        self.board_width = self.board_width.clamp(MIN_BOARD_SIZE, MAX_BOARD_SIZE);
        self.board_height = self.board_height.clamp(MIN_BOARD_SIZE, MAX_BOARD_SIZE);
        self
    }

    /// Milliseconds the piece spends per row under gravity.
    #[must_use]
    pub fn cell_ms(&self, soft_drop: bool) -> f64 {
        let base = 1000.0 / self.gravity.max(MIN_GRAVITY);
        if soft_drop {
            base / self.soft_drop_factor.max(MIN_SOFT_DROP_FACTOR)
        } else {
            base
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

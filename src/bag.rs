#![warn(clippy::all, clippy::pedantic)]

use std::collections::VecDeque;

use bevy_ecs::prelude::*;

use crate::components::PieceKind;

/// 7-bag randomizer: every run of seven draws from a fresh bag holds each kind once.
#[derive(Resource, Debug, Clone)]
pub struct Bag {
    rng: fastrand::Rng,
    pieces: [PieceKind; 7],
    index: usize,
}

impl Bag {
    #[must_use]
    pub fn new() -> Self {
        Self::from_rng(fastrand::Rng::new())
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(fastrand::Rng::with_seed(seed))
    }

    fn from_rng(rng: fastrand::Rng) -> Self {
        Self {
            rng,
            pieces: PieceKind::ALL,
            // Exhausted, so the first draw shuffles
            index: PieceKind::ALL.len(),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> PieceKind {
        if self.index >= self.pieces.len() {
            self.refill();
        }

        let kind = self.pieces[self.index];
        self.index += 1;
        kind
    }

    /// Drops whatever is left of the current bag.
    pub fn discard(&mut self) {
        self.index = self.pieces.len();
    }

    // Fisher-Yates
    fn refill(&mut self) {
        for i in (1..self.pieces.len()).rev() {
            let j = self.rng.usize(0..=i);
            self.pieces.swap(i, j);
        }
        self.index = 0;
    }
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

/// Upcoming pieces, front first.
#[derive(Resource, Debug, Clone, Default)]
pub struct NextQueue {
    pub pieces: VecDeque<PieceKind>,
}

impl NextQueue {
    pub fn refill(&mut self, bag: &mut Bag, min_len: usize) {
        while self.pieces.len() < min_len {
            self.pieces.push_back(bag.next());
        }
    }

    /// Takes the front piece, topping the queue up before and after.
    pub fn pop(&mut self, bag: &mut Bag, min_len: usize) -> PieceKind {
        self.refill(bag, min_len.max(1));
        let kind = self.pieces.pop_front().unwrap_or_else(|| bag.next());
        self.refill(bag, min_len);
        kind
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    #[must_use]
    pub fn peek(&self) -> Vec<PieceKind> {
        self.pieces.iter().copied().collect()
    }
}

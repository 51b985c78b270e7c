#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Board dimensions are small and validated, so usize <-> i32 casts cannot truncate or wrap
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    // Coordinates are checked to be non-negative before casting to usize
    clippy::cast_sign_loss
)]

use bevy_ecs::prelude::*;

use crate::game::{LINE_SCORES, LINES_PER_LEVEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    T,
    O,
    L,
    J,
    I,
    S,
    Z,
}

// Cell identifiers, indexed by `id - 1`
const KIND_BY_ID: [PieceKind; 7] = [
    PieceKind::T,
    PieceKind::O,
    PieceKind::L,
    PieceKind::J,
    PieceKind::I,
    PieceKind::S,
    PieceKind::Z,
];

impl PieceKind {
    pub const ALL: [PieceKind; 7] = KIND_BY_ID;

    /// Numeric cell identifier, 1..=7.
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            PieceKind::T => 1,
            PieceKind::O => 2,
            PieceKind::L => 3,
            PieceKind::J => 4,
            PieceKind::I => 5,
            PieceKind::S => 6,
            PieceKind::Z => 7,
        }
    }

    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        KIND_BY_ID.get(usize::from(id).checked_sub(1)?).copied()
    }

    #[must_use]
    pub fn get_color(self) -> ratatui::style::Color {
        match self {
            PieceKind::T => ratatui::style::Color::Magenta,
            PieceKind::O => ratatui::style::Color::Yellow,
            PieceKind::L => ratatui::style::Color::LightRed,
            PieceKind::J => ratatui::style::Color::Blue,
            PieceKind::I => ratatui::style::Color::Cyan,
            PieceKind::S => ratatui::style::Color::Green,
            PieceKind::Z => ratatui::style::Color::Red,
        }
    }

    // Canonical matrices; 1 marks an occupied cell
    fn template(self) -> &'static [&'static [u8]] {
        match self {
            PieceKind::T => &[&[0, 0, 0], &[1, 1, 1], &[0, 1, 0]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::L => &[&[0, 1, 0], &[0, 1, 0], &[0, 1, 1]],
            PieceKind::J => &[&[0, 1, 0], &[0, 1, 0], &[1, 1, 0]],
            PieceKind::I => &[&[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0]],
            PieceKind::S => &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
            PieceKind::Z => &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// Square matrix of cells describing a piece relative to its origin.
///
/// Rows are indexed by `y` (downwards), columns by `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    cells: Vec<Vec<Option<PieceKind>>>,
}

impl Shape {
    /// Fresh copy of the canonical matrix with `kind` stamped into each occupied cell.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        let cells = kind
            .template()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&cell| if cell == 0 { None } else { Some(kind) })
                    .collect()
            })
            .collect();
        Self { cells }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<PieceKind> {
        self.cells.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    /// Occupied cells as `(dx, dy, kind)` offsets from the origin.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, PieceKind)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, cell)| cell.map(|kind| (x as i32, y as i32, kind)))
        })
    }

    /// Index of the lowest row holding an occupied cell.
    #[must_use]
    pub fn lowest_row(&self) -> Option<usize> {
        self.cells
            .iter()
            .rposition(|row| row.iter().any(Option::is_some))
    }

    /// Rotates 90 degrees in place: transpose, then mirror.
    pub fn rotate(&mut self, rotation: Rotation) {
        let size = self.size();
        for y in 0..size {
            for x in 0..y {
                let tmp = self.cells[y][x];
                self.cells[y][x] = self.cells[x][y];
                self.cells[x][y] = tmp;
            }
        }

        match rotation {
            Rotation::Clockwise => self.cells.iter_mut().for_each(|row| row.reverse()),
            Rotation::CounterClockwise => self.cells.reverse(),
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// The falling piece. At most one entity carries it.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: Shape,
}

impl ActivePiece {
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: Shape::new(kind),
        }
    }
}

// Ground contact and the wall-clock time spent resting on it
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct LockDelay {
    pub grounded: bool,
    pub elapsed_ms: f64,
    /// Part of the current frame spent falling before reaching the current row.
    pub airborne_ms: f64,
}

impl LockDelay {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    /// Row-major: `cells[y][x]`.
    pub cells: Vec<Vec<Option<PieceKind>>>,
}

impl Board {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![None; width]; height],
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(None);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    /// True if any occupied cell of `shape` at `position` leaves the side walls,
    /// reaches the floor, or overlaps a filled cell. Cells above the top never collide.
    #[must_use]
    pub fn collide(&self, position: Position, shape: &Shape) -> bool {
        let width = self.width as i32;
        let height = self.height as i32;

        shape.cells().any(|(dx, dy, _)| {
            let x = position.x + dx;
            let y = position.y + dy;

            if x < 0 || x >= width || y >= height {
                return true;
            }

            y >= 0 && self.cells[y as usize][x as usize].is_some()
        })
    }

    /// Writes the shape's cells into the board, clipping anything outside it.
    pub fn merge(&mut self, position: Position, shape: &Shape) {
        let width = self.width as i32;
        let height = self.height as i32;

        for (dx, dy, kind) in shape.cells() {
            let x = position.x + dx;
            let y = position.y + dy;

            if (0..width).contains(&x) && (0..height).contains(&y) {
                self.cells[y as usize][x as usize] = Some(kind);
            }
        }
    }

    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.cells
            .get(y)
            .is_some_and(|row| row.iter().all(Option::is_some))
    }

    /// Removes full rows bottom-up, dropping everything above, and returns how many went.
    pub fn sweep(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.height;

        while y > 0 {
            if self.is_row_full(y - 1) {
                self.cells.remove(y - 1);
                self.cells.insert(0, vec![None; self.width]);
                cleared += 1;
                // The row that slid into y - 1 needs checking too
            } else {
                y -= 1;
            }
        }

        cleared
    }

    /// Lowest row the shape can descend to from `position` without colliding.
    #[must_use]
    pub fn landing_row(&self, position: Position, shape: &Shape) -> i32 {
        let mut y = position.y;
        if shape.lowest_row().is_none() {
            return y;
        }

        while y < self.height as i32 && !self.collide(Position { x: position.x, y: y + 1 }, shape)
        {
            y += 1;
        }
        y
    }
}

#[derive(Debug, Resource, Clone, Default)]
pub struct GameState {
    pub score: u32,
    pub lines_cleared: u32,
    pub level: u32,
    pub highscore: u32,
    pub new_highscore: bool,
    pub game_over: bool,
    pub paused: bool,
    pub drop_timer_ms: f64,
    pub game_over_timer_ms: f64,
}

impl GameState {
    /// Starts a fresh game; the highscore survives.
    pub fn reset(&mut self) {
        *self = Self {
            highscore: self.highscore,
            new_highscore: self.new_highscore,
            ..Self::default()
        };
    }

    /// Scores a sweep and returns the points awarded.
    pub fn award_lines(&mut self, lines: usize) -> u32 {
        if lines == 0 {
            return 0;
        }

        let base = LINE_SCORES[lines.min(LINE_SCORES.len() - 1)];
        let points = base * (self.level + 1);

        self.score += points;
        self.lines_cleared += u32::try_from(lines).unwrap_or(u32::MAX);
        self.update_level();

        if self.score > self.highscore {
            self.highscore = self.score;
            self.new_highscore = true;
        }

        points
    }

    pub fn update_level(&mut self) {
        self.level = self.lines_cleared / LINES_PER_LEVEL;
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hold {
    pub kind: Option<PieceKind>,
    pub used: bool,
}

// Held keys and the auto-shift countdown derived from them
#[derive(Resource, Debug, Clone, Default)]
pub struct Input {
    pub left: bool,
    pub right: bool,
    pub soft_drop: bool,
    pub shift_direction: Option<i32>,
    pub shift_timer_ms: f64,
    pub shift_charged: bool,
}

impl Input {
    /// Points the auto-shift at `direction` and restarts the countdown.
    pub fn start_shift(&mut self, direction: i32) {
        self.shift_direction = Some(direction);
        self.shift_timer_ms = 0.0;
        self.shift_charged = false;
    }

    /// Stops shifting in `direction`, falling back to the other key if it is still held.
    pub fn stop_shift(&mut self, direction: i32) {
        if self.shift_direction != Some(direction) {
            return;
        }

        let fallback = if direction < 0 && self.right {
            Some(1)
        } else if direction > 0 && self.left {
            Some(-1)
        } else {
            None
        };

        match fallback {
            Some(other) => self.start_shift(other),
            None => {
                self.shift_direction = None;
                self.shift_timer_ms = 0.0;
                self.shift_charged = false;
            }
        }
    }
}

/// Edge-triggered events from the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    MoveLeftStart,
    MoveLeftStop,
    MoveRightStart,
    MoveRightStop,
    SoftDropStart,
    SoftDropStop,
    RotateCw,
    RotateCcw,
    HardDrop,
    Hold,
    TogglePause,
    Reset,
}

/// Named audio cues, queued after the matching simulation event commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Move,
    Rotate,
    Hold,
    HardDrop,
    Lock,
    LineClear,
    GameOver,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct Cues(pub Vec<Cue>);

impl Cues {
    pub fn push(&mut self, cue: Cue) {
        self.0.push(cue);
    }
}

#![warn(clippy::all, clippy::pedantic)]

use bevy_ecs::prelude::*;
use log::{debug, info, trace};

use crate::bag::{Bag, NextQueue};
use crate::components::{
    Board, Cue, Cues, GameState, Hold, Input, InputEvent, LockDelay, PieceKind, Position,
    Rotation, Shape,
};
use crate::config::Settings;
use crate::systems::{
    active_piece, auto_shift_system, game_over_system, ghost_row, gravity_system, hard_drop,
    hold_piece, lock_delay_system, move_piece, reset_game, rotate_piece, spawn_piece,
};

/// Where the active piece is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Falling,
    Locking,
    GameOver,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveView {
    pub kind: PieceKind,
    pub shape: Shape,
    pub position: Position,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderView {
    pub board: Board,
    pub active: Option<ActiveView>,
    pub ghost_row: Option<i32>,
    /// Progress towards the next gravity step, in `[0, 1)`.
    pub fall_fraction: f64,
    pub next: Vec<PieceKind>,
    pub hold: Option<PieceKind>,
    pub score: u32,
    pub lines_cleared: u32,
    pub level: u32,
    pub highscore: u32,
    pub paused: bool,
    pub game_over: bool,
}

/// Owns the simulation world and is its only entry point.
pub struct App {
    pub world: World,
}

impl App {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self::with_bag(settings, Bag::new())
    }

    /// Deterministic piece order, for tests and replays.
    #[must_use]
    pub fn with_seed(settings: Settings, seed: u64) -> Self {
        Self::with_bag(settings, Bag::with_seed(seed))
    }

    fn with_bag(settings: Settings, bag: Bag) -> Self {
        let settings = settings.sanitized();
        let mut world = World::new();
        world.insert_resource(Board::new(settings.board_width, settings.board_height));
        world.insert_resource(settings);
        world.insert_resource(bag);
        world.insert_resource(NextQueue::default());
        world.insert_resource(GameState::default());
        world.insert_resource(Hold::default());
        world.insert_resource(Input::default());
        world.insert_resource(Cues::default());

        let mut app = Self { world };
        spawn_piece(&mut app.world);
        app
    }

    /// Applies one edge-triggered input event.
    pub fn handle_input(&mut self, event: InputEvent) {
        trace!("Input event: {event:?}");

        // Key state and the shift countdown are tracked even when frozen, so a
        // key held across a pause or reset still repeats afterwards
        {
            let mut input = self.world.resource_mut::<Input>();
            match event {
                InputEvent::MoveLeftStart => {
                    input.left = true;
                    input.start_shift(-1);
                }
                InputEvent::MoveLeftStop => {
                    input.left = false;
                    input.stop_shift(-1);
                }
                InputEvent::MoveRightStart => {
                    input.right = true;
                    input.start_shift(1);
                }
                InputEvent::MoveRightStop => {
                    input.right = false;
                    input.stop_shift(1);
                }
                InputEvent::SoftDropStart => input.soft_drop = true,
                InputEvent::SoftDropStop => input.soft_drop = false,
                _ => {}
            }
        }

        match event {
            InputEvent::TogglePause => {
                let mut game_state = self.world.resource_mut::<GameState>();
                if !game_state.game_over {
                    game_state.paused = !game_state.paused;
                    info!("Paused: {}", game_state.paused);
                }
                return;
            }
            InputEvent::Reset => {
                self.reset();
                return;
            }
            _ => {}
        }

        if self.is_frozen() {
            return;
        }

        match event {
            InputEvent::MoveLeftStart => {
                move_piece(&mut self.world, -1);
            }
            InputEvent::MoveRightStart => {
                move_piece(&mut self.world, 1);
            }
            InputEvent::RotateCw => {
                rotate_piece(&mut self.world, Rotation::Clockwise);
            }
            InputEvent::RotateCcw => {
                rotate_piece(&mut self.world, Rotation::CounterClockwise);
            }
            InputEvent::HardDrop => hard_drop(&mut self.world),
            InputEvent::Hold => {
                hold_piece(&mut self.world);
            }
            _ => {}
        }
    }

    /// Advances the simulation by one frame of `elapsed_ms` wall-clock time.
    pub fn advance(&mut self, elapsed_ms: f64) {
        let elapsed_ms = if elapsed_ms.is_finite() {
            elapsed_ms.max(0.0)
        } else {
            0.0
        };

        let (game_over, paused) = {
            let game_state = self.world.resource::<GameState>();
            (game_state.game_over, game_state.paused)
        };

        if paused {
            return;
        }

        if game_over {
            game_over_system(&mut self.world, elapsed_ms);
            return;
        }

        if active_piece(&mut self.world).is_none() {
            spawn_piece(&mut self.world);
        }

        gravity_system(&mut self.world, elapsed_ms);
        auto_shift_system(&mut self.world, elapsed_ms);
        lock_delay_system(&mut self.world, elapsed_ms);
    }

    /// Replaces the tunables. Running counters keep their values; a new board size
    /// takes effect on the next reset.
    pub fn apply_settings(&mut self, settings: Settings) {
        let settings = settings.sanitized();
        debug!("Applying settings: {settings:?}");
        self.world.insert_resource(settings);
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.world.resource::<Settings>()
    }

    pub fn reset(&mut self) {
        reset_game(&mut self.world);
    }

    /// Seeds the highscore loaded by the persistence collaborator.
    pub fn set_highscore(&mut self, highscore: u32) {
        let mut game_state = self.world.resource_mut::<GameState>();
        game_state.highscore = game_state.highscore.max(highscore);
    }

    /// Returns the highscore once each time it has grown, for saving.
    pub fn take_new_highscore(&mut self) -> Option<u32> {
        let mut game_state = self.world.resource_mut::<GameState>();
        if game_state.new_highscore {
            game_state.new_highscore = false;
            Some(game_state.highscore)
        } else {
            None
        }
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.world.resource_mut::<Cues>().0)
    }

    #[must_use]
    pub fn game_state(&self) -> &GameState {
        self.world.resource::<GameState>()
    }

    pub fn phase(&mut self) -> Phase {
        if self.world.resource::<GameState>().game_over {
            return Phase::GameOver;
        }

        let mut query = self.world.query::<&LockDelay>();
        match query.iter(&self.world).next() {
            None => Phase::Empty,
            Some(lock) if lock.grounded => Phase::Locking,
            Some(_) => Phase::Falling,
        }
    }

    pub fn view(&mut self) -> RenderView {
        let active = active_piece(&mut self.world).map(|(_, piece, position)| ActiveView {
            kind: piece.kind,
            shape: piece.shape,
            position,
        });
        let ghost_row = ghost_row(&mut self.world);

        let soft_drop = self.world.resource::<Input>().soft_drop;
        let cell_ms = self.world.resource::<Settings>().cell_ms(soft_drop);
        let game_state = self.world.resource::<GameState>();
        let fall_fraction = (game_state.drop_timer_ms / cell_ms).clamp(0.0, 1.0 - f64::EPSILON);

        RenderView {
            board: self.world.resource::<Board>().clone(),
            active,
            ghost_row,
            fall_fraction,
            next: self.world.resource::<NextQueue>().peek(),
            hold: self.world.resource::<Hold>().kind,
            score: game_state.score,
            lines_cleared: game_state.lines_cleared,
            level: game_state.level,
            highscore: game_state.highscore,
            paused: game_state.paused,
            game_over: game_state.game_over,
        }
    }

    fn is_frozen(&self) -> bool {
        let game_state = self.world.resource::<GameState>();
        game_state.game_over || game_state.paused
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Board dimensions are small enough to fit in i32
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    // Repeat counts are floored from non-negative timers
    clippy::cast_sign_loss
)]

use bevy_ecs::prelude::*;
use log::{debug, info, trace};

use crate::bag::{Bag, NextQueue};
use crate::components::{
    ActivePiece, Board, Cue, Cues, GameState, Hold, Input, LockDelay, Position, Rotation,
};
use crate::config::Settings;
use crate::game::{KICK_OFFSETS, SPAWN_MARGIN};

/// Snapshot of the falling piece, if there is one.
pub fn active_piece(world: &mut World) -> Option<(Entity, ActivePiece, Position)> {
    let mut query = world.query::<(Entity, &ActivePiece, &Position)>();
    query
        .iter(world)
        .next()
        .map(|(entity, piece, position)| (entity, piece.clone(), *position))
}

fn spawn_position(board: &Board, piece: &ActivePiece) -> Position {
    Position {
        x: (board.width / 2) as i32 - (piece.shape.size() / 2) as i32,
        y: -SPAWN_MARGIN,
    }
}

fn push_cue(world: &mut World, cue: Cue) {
    if let Some(mut cues) = world.get_resource_mut::<Cues>() {
        cues.push(cue);
    }
}

fn despawn_active(world: &mut World) {
    let entities: Vec<Entity> = world
        .query_filtered::<Entity, With<ActivePiece>>()
        .iter(world)
        .collect();
    for entity in entities {
        world.despawn(entity);
    }
}

/// Draws the next kind and places it at the top, or ends the game if it does not fit.
pub fn spawn_piece(world: &mut World) {
    let next_count = world.resource::<Settings>().next_count;
    let kind = world.resource_scope(|world, mut bag: Mut<Bag>| {
        world
            .resource_mut::<NextQueue>()
            .pop(&mut bag, next_count)
    });

    let piece = ActivePiece::new(kind);
    let position = spawn_position(world.resource::<Board>(), &piece);

    {
        let mut game_state = world.resource_mut::<GameState>();
        game_state.drop_timer_ms = 0.0;
    }
    world.resource_mut::<Hold>().used = false;

    if world.resource::<Board>().collide(position, &piece.shape) {
        info!("Spawn position blocked for {kind:?}, game over");
        {
            let mut game_state = world.resource_mut::<GameState>();
            game_state.game_over = true;
            game_state.game_over_timer_ms = 0.0;
        }
        push_cue(world, Cue::GameOver);
        return;
    }

    debug!("Spawned {kind:?} at ({}, {})", position.x, position.y);
    world.spawn((piece, position, LockDelay::default()));
}

/// Shifts the active piece one column. Returns whether it moved.
pub fn move_piece(world: &mut World, dx: i32) -> bool {
    let Some((entity, piece, position)) = active_piece(world) else {
        return false;
    };

    let new_position = Position {
        x: position.x + dx,
        y: position.y,
    };

    if world.resource::<Board>().collide(new_position, &piece.shape) {
        return false;
    }

    world.entity_mut(entity).insert((new_position, LockDelay::default()));
    push_cue(world, Cue::Move);
    true
}

/// Rotates the active piece, trying each horizontal kick in turn.
/// Leaves the piece untouched when every kick collides.
pub fn rotate_piece(world: &mut World, rotation: Rotation) -> bool {
    let Some((entity, mut piece, position)) = active_piece(world) else {
        return false;
    };

    piece.shape.rotate(rotation);

    let kicked = {
        let board = world.resource::<Board>();
        KICK_OFFSETS.iter().find_map(|&offset| {
            let candidate = Position {
                x: position.x + offset,
                y: position.y,
            };
            (!board.collide(candidate, &piece.shape)).then_some(candidate)
        })
    };

    let Some(new_position) = kicked else {
        trace!("Rotation of {:?} blocked", piece.kind);
        return false;
    };

    world
        .entity_mut(entity)
        .insert((piece, new_position, LockDelay::default()));
    push_cue(world, Cue::Rotate);
    true
}

/// Stashes the active piece, once per spawn.
pub fn hold_piece(world: &mut World) -> bool {
    if world.resource::<Hold>().used {
        return false;
    }
    let Some((entity, piece, _)) = active_piece(world) else {
        return false;
    };

    let previously_held = world.resource_mut::<Hold>().kind.replace(piece.kind);

    match previously_held {
        None => {
            debug!("Holding {:?}", piece.kind);
            world.despawn(entity);
            spawn_piece(world);
        }
        Some(held) => {
            debug!("Swapping {:?} for held {held:?}", piece.kind);
            let replacement = ActivePiece::new(held);
            // Placed without a collision check
            let position = spawn_position(world.resource::<Board>(), &replacement);
            world
                .entity_mut(entity)
                .insert((replacement, position, LockDelay::default()));
            world.resource_mut::<GameState>().drop_timer_ms = 0.0;
        }
    }

    world.resource_mut::<Hold>().used = true;
    push_cue(world, Cue::Hold);
    true
}

/// Row the active piece would land on; drives the ghost preview.
pub fn ghost_row(world: &mut World) -> Option<i32> {
    let (_, piece, position) = active_piece(world)?;
    Some(world.resource::<Board>().landing_row(position, &piece.shape))
}

/// Drops the piece straight down and locks it without any delay.
pub fn hard_drop(world: &mut World) {
    let Some((entity, piece, position)) = active_piece(world) else {
        return;
    };

    let landing = world.resource::<Board>().landing_row(position, &piece.shape);
    let final_position = Position {
        x: position.x,
        y: landing,
    };
    debug!(
        "Hard drop of {:?} by {} rows",
        piece.kind,
        landing - position.y
    );

    world.entity_mut(entity).insert(final_position);
    push_cue(world, Cue::HardDrop);
    lock_piece(world);
}

/// Merges the active piece, sweeps, scores and spawns the next one.
pub fn lock_piece(world: &mut World) {
    let Some((entity, piece, position)) = active_piece(world) else {
        return;
    };

    info!(
        "Locking {:?} at ({}, {})",
        piece.kind, position.x, position.y
    );

    let lines_cleared = {
        let mut board = world.resource_mut::<Board>();
        board.merge(position, &piece.shape);
        board.sweep()
    };

    push_cue(world, Cue::Lock);

    if lines_cleared > 0 {
        let perfect_clear = world.resource::<Board>().is_empty();
        {
            let mut game_state = world.resource_mut::<GameState>();
            let points = game_state.award_lines(lines_cleared);
            info!(
                "Cleared {lines_cleared} lines for {points} points (perfect clear: {perfect_clear}), level {}",
                game_state.level
            );
        }
        push_cue(world, Cue::LineClear);
    }

    world.despawn(entity);
    spawn_piece(world);
}

/// Accumulates fall time and moves the piece down one row per elapsed cell budget.
pub fn gravity_system(world: &mut World, delta_ms: f64) {
    let Some((entity, piece, mut position)) = active_piece(world) else {
        return;
    };

    let soft_drop = world.resource::<Input>().soft_drop;
    let cell_ms = world.resource::<Settings>().cell_ms(soft_drop);

    let (fallen, start_timer_ms, landed) =
        world.resource_scope(|world, mut game_state: Mut<GameState>| {
            let board = world.resource::<Board>();
            let start_timer_ms = game_state.drop_timer_ms;
            game_state.drop_timer_ms += delta_ms;

            let mut fallen = 0u32;
            while game_state.drop_timer_ms >= cell_ms {
                game_state.drop_timer_ms -= cell_ms;
                position.y += 1;

                if board.collide(position, &piece.shape) {
                    position.y -= 1;
                    game_state.drop_timer_ms = 0.0;
                    return (fallen, start_timer_ms, true);
                }
                fallen += 1;
            }
            (fallen, start_timer_ms, false)
        });

    trace!("Gravity: {:?} now at row {}", piece.kind, position.y);
    world.entity_mut(entity).insert(position);

    if let Some(mut lock) = world.get_mut::<LockDelay>(entity) {
        if fallen > 0 {
            // The last step happened this far into the frame
            lock.airborne_ms =
                (f64::from(fallen) * cell_ms - start_timer_ms).clamp(0.0, delta_ms);
        }
        if landed {
            lock.grounded = true;
        }
    }
}

/// Delayed auto-shift: after `das_ms` of holding a direction, repeat every `arr_ms`.
pub fn auto_shift_system(world: &mut World, delta_ms: f64) {
    let (das_ms, arr_ms) = {
        let settings = world.resource::<Settings>();
        (settings.das_ms, settings.arr_ms)
    };

    let Some(direction) = world.resource::<Input>().shift_direction else {
        return;
    };

    let mut moves = 0usize;
    let slide = {
        let mut input = world.resource_mut::<Input>();
        input.shift_timer_ms += delta_ms;

        if !input.shift_charged && input.shift_timer_ms >= das_ms {
            input.shift_charged = true;
            input.shift_timer_ms -= das_ms;
            moves += 1;
        }

        if input.shift_charged && arr_ms > 0.0 {
            let repeats = (input.shift_timer_ms / arr_ms).floor();
            input.shift_timer_ms -= repeats * arr_ms;
            moves += repeats as usize;
        }

        input.shift_charged && arr_ms <= 0.0
    };

    if slide {
        while move_piece(world, direction) {}
        world.resource_mut::<Input>().shift_timer_ms = 0.0;
        return;
    }

    for _ in 0..moves {
        if !move_piece(world, direction) {
            world.resource_mut::<Input>().shift_timer_ms = 0.0;
            break;
        }
    }
}

/// Runs the lock-delay countdown while the piece rests on a surface.
pub fn lock_delay_system(world: &mut World, delta_ms: f64) {
    let Some((entity, piece, position)) = active_piece(world) else {
        return;
    };

    let resting = world.resource::<Board>().collide(
        Position {
            x: position.x,
            y: position.y + 1,
        },
        &piece.shape,
    );
    let lock_delay_ms = world.resource::<Settings>().lock_delay_ms;

    let should_lock = {
        let Some(mut lock) = world.get_mut::<LockDelay>(entity) else {
            return;
        };

        if resting {
            // Only the part of the frame spent on this row counts
            let rested_ms = (delta_ms - lock.airborne_ms).max(0.0);
            lock.airborne_ms = 0.0;
            lock.grounded = true;
            lock.elapsed_ms += rested_ms;
            trace!("Lock delay at {:.1}ms", lock.elapsed_ms);
            lock.elapsed_ms >= lock_delay_ms
        } else {
            lock.reset();
            false
        }
    };

    if should_lock {
        lock_piece(world);
    }
}

/// Counts down the game-over dwell and restarts once it runs out.
pub fn game_over_system(world: &mut World, delta_ms: f64) {
    let delay_ms = world.resource::<Settings>().game_over_delay_ms;

    let expired = {
        let mut game_state = world.resource_mut::<GameState>();
        if !game_state.game_over {
            return;
        }
        game_state.game_over_timer_ms += delta_ms;
        game_state.game_over_timer_ms >= delay_ms
    };

    if expired {
        reset_game(world);
    }
}

/// Clears everything but the highscore and spawns a fresh piece.
pub fn reset_game(world: &mut World) {
    let (width, height) = {
        let settings = world.resource::<Settings>();
        (settings.board_width, settings.board_height)
    };

    let final_score = world.resource::<GameState>().score;
    info!("Resetting game (final score {final_score})");

    despawn_active(world);

    {
        let mut board = world.resource_mut::<Board>();
        if board.width == width && board.height == height {
            board.clear();
        } else {
            *board = Board::new(width, height);
        }
    }

    world.resource_mut::<GameState>().reset();
    *world.resource_mut::<Hold>() = Hold::default();
    world.resource_mut::<NextQueue>().clear();
    world.resource_mut::<Bag>().discard();

    // Keep which keys are physically held and restart auto-shift from them
    {
        let mut input = world.resource_mut::<Input>();
        let (left, right, soft_drop) = (input.left, input.right, input.soft_drop);
        *input = Input {
            left,
            right,
            soft_drop,
            ..Input::default()
        };
        if right {
            input.start_shift(1);
        } else if left {
            input.start_shift(-1);
        }
    }

    spawn_piece(world);
}

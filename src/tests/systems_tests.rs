#[cfg(test)]
mod tests {
    use crate::components::{
        Board, GameState, Hold, LockDelay, PieceKind, Position, Rotation, Shape,
    };
    use crate::systems::{
        active_piece, ghost_row, hard_drop, hold_piece, move_piece, rotate_piece,
    };
    use crate::tests::test_utils::{
        active_kind, active_position, create_test_app, fill_row, place_piece, still_settings,
    };

    fn spawn_x(kind: PieceKind) -> i32 {
        6 - (Shape::new(kind).size() / 2) as i32
    }

    #[test]
    fn test_spawn_is_centered_above_the_top() {
        let mut app = create_test_app(still_settings());
        let kind = active_kind(&mut app);

        assert_eq!(active_position(&mut app), Position { x: spawn_x(kind), y: -1 });
        assert_eq!(spawn_x(PieceKind::T), 5);
        assert_eq!(spawn_x(PieceKind::I), 4);
        assert_eq!(spawn_x(PieceKind::O), 5);
    }

    #[test]
    fn test_move_piece_resets_lock_delay() {
        let mut app = create_test_app(still_settings());
        let entity = place_piece(&mut app, PieceKind::T, 4, 17);
        *app.world.get_mut::<LockDelay>(entity).expect("lock delay") = LockDelay {
            grounded: true,
            elapsed_ms: 300.0,
            airborne_ms: 0.0,
        };

        assert!(move_piece(&mut app.world, 1));

        assert_eq!(active_position(&mut app), Position { x: 5, y: 17 });
        assert_eq!(
            *app.world.get::<LockDelay>(entity).expect("lock delay"),
            LockDelay::default()
        );
    }

    #[test]
    fn test_move_into_wall_is_rejected() {
        let mut app = create_test_app(still_settings());
        place_piece(&mut app, PieceKind::O, 0, 5);
        app.drain_cues();

        assert!(!move_piece(&mut app.world, -1));
        assert_eq!(active_position(&mut app), Position { x: 0, y: 5 });
        assert!(app.drain_cues().is_empty());
    }

    #[test]
    fn test_move_into_stack_is_rejected() {
        let mut app = create_test_app(still_settings());
        place_piece(&mut app, PieceKind::O, 3, 5);
        app.world.resource_mut::<Board>().cells[6][5] = Some(PieceKind::J);

        assert!(!move_piece(&mut app.world, 1));
        assert!(move_piece(&mut app.world, -1));
        assert_eq!(active_position(&mut app), Position { x: 2, y: 5 });
    }

    #[test]
    fn test_rotation_kicks_off_left_wall() {
        let mut app = create_test_app(still_settings());
        // Vertical I in column 0
        place_piece(&mut app, PieceKind::I, -1, 5);

        assert!(rotate_piece(&mut app.world, Rotation::Clockwise));

        let (_, piece, position) = active_piece(&mut app.world).expect("active piece");
        assert_eq!(position, Position { x: 0, y: 5 });
        let mut expected = Shape::new(PieceKind::I);
        expected.rotate(Rotation::Clockwise);
        assert_eq!(piece.shape, expected);
    }

    #[test]
    fn test_rotation_without_room_is_reverted() {
        let mut app = create_test_app(still_settings());
        {
            let mut board = app.world.resource_mut::<Board>();
            for y in 16..20 {
                fill_row(&mut board, y, &[5], PieceKind::Z);
            }
        }
        // Vertical I sitting in the one-wide well at column 5
        let entity = place_piece(&mut app, PieceKind::I, 4, 16);
        app.drain_cues();

        assert!(!rotate_piece(&mut app.world, Rotation::Clockwise));
        assert!(!rotate_piece(&mut app.world, Rotation::CounterClockwise));

        let (same, piece, position) = active_piece(&mut app.world).expect("active piece");
        assert_eq!(same, entity);
        assert_eq!(position, Position { x: 4, y: 16 });
        assert_eq!(piece.shape, Shape::new(PieceKind::I));
        assert!(app.drain_cues().is_empty());
    }

    #[test]
    fn test_hold_into_empty_slot_spawns_next() {
        let mut app = create_test_app(still_settings());
        let first = active_kind(&mut app);
        let upcoming = app.view().next[0];

        assert!(hold_piece(&mut app.world));

        assert_eq!(app.world.resource::<Hold>().kind, Some(first));
        assert_eq!(active_kind(&mut app), upcoming);
        assert_eq!(
            active_position(&mut app),
            Position { x: spawn_x(upcoming), y: -1 }
        );
    }

    #[test]
    fn test_hold_only_once_per_spawn() {
        let mut app = create_test_app(still_settings());
        assert!(hold_piece(&mut app.world));
        let after_first = active_kind(&mut app);

        assert!(!hold_piece(&mut app.world));
        assert_eq!(active_kind(&mut app), after_first);
    }

    #[test]
    fn test_hold_swaps_after_next_spawn() {
        let mut app = create_test_app(still_settings());
        let first = active_kind(&mut app);
        assert!(hold_piece(&mut app.world));

        hard_drop(&mut app.world);
        assert!(!app.world.resource::<Hold>().used);
        let current = active_kind(&mut app);

        assert!(hold_piece(&mut app.world));
        assert_eq!(active_kind(&mut app), first);
        assert_eq!(app.world.resource::<Hold>().kind, Some(current));
        assert_eq!(active_position(&mut app), Position { x: spawn_x(first), y: -1 });
        assert!(app.world.resource::<Hold>().used);
    }

    #[test]
    fn test_swapped_piece_is_not_checked_against_stack() {
        let mut app = create_test_app(still_settings());
        let first = active_kind(&mut app);
        assert!(hold_piece(&mut app.world));
        hard_drop(&mut app.world);

        {
            let mut board = app.world.resource_mut::<Board>();
            fill_row(&mut board, 0, &[0], PieceKind::Z);
            fill_row(&mut board, 1, &[0], PieceKind::Z);
        }

        // A blocked spawn would end the game; a swap does not
        assert!(hold_piece(&mut app.world));

        let (_, piece, position) = active_piece(&mut app.world).expect("active piece");
        assert_eq!(piece.kind, first);
        assert_eq!(position, Position { x: spawn_x(first), y: -1 });
        assert!(app.world.resource::<Board>().collide(position, &piece.shape));
        assert!(!app.world.resource::<GameState>().game_over);
    }

    #[test]
    fn test_ghost_row_matches_hard_drop() {
        let mut app = create_test_app(still_settings());
        place_piece(&mut app, PieceKind::T, 4, 0);

        assert_eq!(ghost_row(&mut app.world), Some(17));

        hard_drop(&mut app.world);

        let board = app.world.resource::<Board>();
        assert_eq!(board.cells[18][4], Some(PieceKind::T));
        assert_eq!(board.cells[18][5], Some(PieceKind::T));
        assert_eq!(board.cells[18][6], Some(PieceKind::T));
        assert_eq!(board.cells[19][5], Some(PieceKind::T));
    }

    #[test]
    fn test_actions_without_active_piece_do_nothing() {
        let mut app = create_test_app(still_settings());
        if let Some((entity, _, _)) = active_piece(&mut app.world) {
            app.world.despawn(entity);
        }

        assert!(!move_piece(&mut app.world, 1));
        assert!(!rotate_piece(&mut app.world, Rotation::Clockwise));
        assert!(!hold_piece(&mut app.world));
        assert_eq!(ghost_row(&mut app.world), None);
        hard_drop(&mut app.world);
        assert!(app.world.resource::<Board>().is_empty());
    }
}

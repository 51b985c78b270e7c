#[cfg(test)]
mod tests {
    use crate::app::Phase;
    use crate::components::{Board, InputEvent, PieceKind, Position};
    use crate::config::Settings;
    use crate::tests::test_utils::{
        active_position, create_test_app, place_piece, still_settings,
    };

    #[test]
    fn test_locks_after_continuous_rest() {
        let mut app = create_test_app(still_settings());
        let entity = place_piece(&mut app, PieceKind::T, 4, 17);

        app.advance(499.0);
        assert!(app.world.get::<Position>(entity).is_some());
        assert_eq!(app.phase(), Phase::Locking);

        app.advance(1.0);
        assert!(app.world.get::<Position>(entity).is_none());
        assert_eq!(app.world.resource::<Board>().cells[19][5], Some(PieceKind::T));
    }

    #[test]
    fn test_move_resets_lock_delay() {
        let mut app = create_test_app(still_settings());
        let entity = place_piece(&mut app, PieceKind::T, 4, 17);

        app.advance(499.0);
        app.handle_input(InputEvent::MoveRightStart);
        app.handle_input(InputEvent::MoveRightStop);
        assert_eq!(active_position(&mut app), Position { x: 5, y: 17 });

        app.advance(499.0);
        assert!(app.world.get::<Position>(entity).is_some());

        app.advance(1.0);
        assert!(app.world.get::<Position>(entity).is_none());
        assert_eq!(app.world.resource::<Board>().cells[19][6], Some(PieceKind::T));
    }

    #[test]
    fn test_rotation_resets_lock_delay() {
        let mut app = create_test_app(still_settings());
        let entity = place_piece(&mut app, PieceKind::O, 4, 18);

        app.advance(400.0);
        app.handle_input(InputEvent::RotateCw);
        app.advance(400.0);

        assert!(app.world.get::<Position>(entity).is_some());
    }

    #[test]
    fn test_no_lock_while_airborne() {
        let mut app = create_test_app(still_settings());
        let entity = place_piece(&mut app, PieceKind::T, 4, 5);

        app.advance(2000.0);

        assert!(app.world.get::<Position>(entity).is_some());
        assert_eq!(app.phase(), Phase::Falling);
    }

    #[test]
    fn test_zero_lock_delay_locks_on_contact() {
        let mut settings = still_settings();
        settings.lock_delay_ms = 0.0;
        let mut app = create_test_app(settings);
        let entity = place_piece(&mut app, PieceKind::T, 4, 17);

        app.advance(0.0);

        assert!(app.world.get::<Position>(entity).is_none());
    }

    #[test]
    fn test_only_time_after_landing_counts() {
        let mut app = create_test_app(Settings::default());
        let entity = place_piece(&mut app, PieceKind::T, 4, 15);

        // Two gravity steps land the piece 2000ms into a 2400ms frame
        app.advance(2400.0);
        assert!(app.world.get::<Position>(entity).is_some());
        assert_eq!(active_position(&mut app), Position { x: 4, y: 17 });
        assert_eq!(app.phase(), Phase::Locking);

        app.advance(99.0);
        assert!(app.world.get::<Position>(entity).is_some());

        app.advance(1.0);
        assert!(app.world.get::<Position>(entity).is_none());
    }

    #[test]
    fn test_landing_at_frame_end_starts_from_zero() {
        let mut app = create_test_app(Settings::default());
        let entity = place_piece(&mut app, PieceKind::T, 4, 16);

        app.advance(1000.0);
        assert_eq!(active_position(&mut app).y, 17);

        app.advance(499.0);
        assert!(app.world.get::<Position>(entity).is_some());

        app.advance(1.0);
        assert!(app.world.get::<Position>(entity).is_none());
    }
}

#![cfg(test)]

use crate::components::Cue;
use crate::sound::{AudioState, cue_duration};

const ALL_CUES: [Cue; 7] = [
    Cue::Move,
    Cue::Rotate,
    Cue::Hold,
    Cue::HardDrop,
    Cue::Lock,
    Cue::LineClear,
    Cue::GameOver,
];

#[test]
fn test_muted_state_drops_cues() {
    let audio_state = AudioState::muted();

    assert!(!audio_state.is_sound_enabled());
    for cue in ALL_CUES {
        assert!(!audio_state.play_cue(cue));
    }
}

#[test]
fn test_toggle_sound() {
    let mut audio_state = AudioState::muted();

    audio_state.toggle_sound();
    assert!(audio_state.is_sound_enabled());

    // No audio thread, but the cue is still accepted
    assert!(audio_state.play_cue(Cue::LineClear));

    audio_state.toggle_sound();
    assert!(!audio_state.is_sound_enabled());
}

#[test]
fn test_volume_adjustment() {
    let mut audio_state = AudioState::muted();

    audio_state.set_volume(0.8);
    assert!((audio_state.get_volume() - 0.8).abs() < f32::EPSILON);

    // Above 1.0 clamps to 1.0
    audio_state.set_volume(1.5);
    assert!((audio_state.get_volume() - 1.0).abs() < f32::EPSILON);

    // Below 0.0 clamps to 0.0
    audio_state.set_volume(-0.5);
    assert!(audio_state.get_volume().abs() < f32::EPSILON);
}

#[test]
fn test_cue_durations() {
    for cue in ALL_CUES {
        assert!(cue_duration(cue) > 0.0, "{cue:?}");
    }
    assert!(cue_duration(Cue::GameOver) > cue_duration(Cue::Move));
}

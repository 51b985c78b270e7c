#![warn(clippy::all, clippy::pedantic)]

pub mod lock_delay_tests;
pub mod sound_tests;
pub mod systems_tests;
pub mod time_tests;

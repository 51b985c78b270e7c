use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use crossbeam_channel::{Receiver, Sender, bounded};
use fundsp::hacker32::*;
use log::{debug, error};
use std::thread;

use crate::components::Cue;

// Command to control the audio thread
enum AudioCommand {
    Play(Cue),
    SetVolume(f32), // 0.0 to 1.0
    Quit,
}

/// Fire-and-forget beeps for simulation cues. Never blocks the caller.
pub struct AudioState {
    sender: Option<Sender<AudioCommand>>,
    sound_enabled: bool,
    volume: f32,
}

impl AudioState {
    #[must_use]
    pub fn new(volume: f32, sound_enabled: bool) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        let (sender, receiver) = bounded(64);

        thread::spawn(move || {
            if let Err(e) = run_audio_thread(&receiver, volume) {
                error!("Audio thread error: {e}");
            }
        });

        Self {
            sender: Some(sender),
            sound_enabled,
            volume,
        }
    }

    /// No audio thread at all; every cue is dropped.
    #[must_use]
    pub fn muted() -> Self {
        Self {
            sender: None,
            sound_enabled: false,
            volume: 0.0,
        }
    }

    pub fn play_cue(&self, cue: Cue) -> bool {
        if !self.sound_enabled {
            return false;
        }
        if let Some(sender) = &self.sender {
            let _ = sender.try_send(AudioCommand::Play(cue));
        }
        true
    }

    #[must_use]
    pub fn is_sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn toggle_sound(&mut self) {
        self.sound_enabled = !self.sound_enabled;
    }

    #[must_use]
    pub fn get_volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);

        if let Some(sender) = &self.sender {
            let _ = sender.try_send(AudioCommand::SetVolume(self.volume));
        }
    }
}

impl Drop for AudioState {
    fn drop(&mut self) {
        if let Some(sender) = &self.sender {
            let _ = sender.try_send(AudioCommand::Quit);
        }
    }
}

fn run_audio_thread(receiver: &Receiver<AudioCommand>, initial_volume: f32) -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No audio output device found"))?;
    let config = device.default_output_config()?;

    let (cue_sender, cue_receiver) = bounded::<Cue>(64);
    let (volume_sender, volume_receiver) = bounded::<f32>(16);

    let _stream = match config.sample_format() {
        cpal::SampleFormat::F32 => run_audio_stream::<f32>(
            &device,
            &config.into(),
            cue_receiver,
            volume_receiver,
            initial_volume,
        )?,
        cpal::SampleFormat::I16 => run_audio_stream::<i16>(
            &device,
            &config.into(),
            cue_receiver,
            volume_receiver,
            initial_volume,
        )?,
        cpal::SampleFormat::U16 => run_audio_stream::<u16>(
            &device,
            &config.into(),
            cue_receiver,
            volume_receiver,
            initial_volume,
        )?,
        _ => return Err(anyhow::anyhow!("Unsupported audio format")),
    };

    // Keep the stream alive until told to stop or the sender goes away
    while let Ok(command) = receiver.recv() {
        match command {
            AudioCommand::Play(cue) => {
                let _ = cue_sender.try_send(cue);
            }
            AudioCommand::SetVolume(volume) => {
                let _ = volume_sender.try_send(volume);
            }
            AudioCommand::Quit => break,
        }
    }

    debug!("Audio thread stopped");
    Ok(())
}

fn run_audio_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    cue_receiver: Receiver<Cue>,
    volume_receiver: Receiver<f32>,
    initial_volume: f32,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let sample_rate = f64::from(config.sample_rate.0);
    let channels = config.channels as usize;

    let mut volume = initial_volume;
    // Each playing cue with its remaining time in seconds
    let mut voices: Vec<(Box<dyn AudioUnit + Send>, f64)> = Vec::new();

    let mut next_value = move || {
        while let Ok(new_volume) = volume_receiver.try_recv() {
            volume = new_volume;
        }

        while let Ok(cue) = cue_receiver.try_recv() {
            let mut unit = create_cue_sound(cue);
            unit.set_sample_rate(sample_rate);
            voices.push((unit, cue_duration(cue)));
        }

        let mut sample = 0.0f32;
        for (unit, remaining) in &mut voices {
            sample += unit.get_mono();
            *remaining -= 1.0 / sample_rate;
        }
        voices.retain(|(_, remaining)| *remaining > 0.0);

        (sample * volume).clamp(-1.0, 1.0)
    };

    let err_fn = |err| error!("Error in audio stream: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = T::from_sample(next_value());
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok(stream)
}

/// Seconds a cue keeps sounding.
#[must_use]
pub fn cue_duration(cue: Cue) -> f64 {
    match cue {
        Cue::Move | Cue::Rotate => 0.05,
        Cue::Hold | Cue::Lock => 0.08,
        Cue::HardDrop => 0.1,
        Cue::LineClear => 0.5,
        Cue::GameOver => 1.0,
    }
}

fn create_cue_sound(cue: Cue) -> Box<dyn AudioUnit + Send> {
    match cue {
        Cue::Move => Box::new(sine_hz(220.0) * envelope(|t| if t < 0.05 { 1.0 } else { 0.0 }) * 0.3),
        Cue::Rotate => {
            Box::new(sine_hz(440.0) * envelope(|t| if t < 0.05 { 1.0 } else { 0.0 }) * 0.3)
        }
        Cue::Hold => {
            Box::new(sine_hz(330.0) * envelope(|t| if t < 0.08 { 1.0 } else { 0.0 }) * 0.3)
        }
        Cue::Lock => Box::new(sine_hz(150.0) * envelope(|t| (0.08 - t).max(0.0) * 12.5) * 0.4),
        Cue::HardDrop => Box::new(sine_hz(80.0) * envelope(|t| (0.1 - t).max(0.0) * 10.0) * 0.5),
        Cue::LineClear => {
            // Rising sweep
            let sweep = envelope(|t| lerp(300.0, 800.0, (t * 5.0).min(1.0))) >> sine();
            Box::new(
                sweep
                    * envelope(|t| if t < 0.2 { 1.0 } else { (0.5 - t).max(0.0) * 2.0 })
                    * 0.4,
            )
        }
        Cue::GameOver => {
            // Falling tone
            let fall = envelope(|t| lerp(600.0, 200.0, t.min(1.0))) >> sine();
            Box::new(fall * envelope(|t| (1.0 - t).max(0.0)) * 0.4)
        }
    }
}

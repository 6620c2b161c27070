use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{error, info};

use crate::audio_api::AudioCommand;
use crate::error::DispatchError;

mod drum;
mod engine;
mod frame;
mod sample_buffer;
mod sample_id;
mod voice;

pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;
pub use sample_id::SampleId;

use engine::Engine;

const COMMAND_QUEUE: usize = 1024;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    sample_rate: u32,
    _stream: cpal::Stream,
}

impl AudioHandle {
    /// Never blocks; a full queue drops the command.
    pub fn send(&self, cmd: AudioCommand) -> Result<(), DispatchError> {
        self.tx.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(_) => DispatchError::QueueFull,
            TrySendError::Disconnected(_) => DispatchError::Disconnected,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_QUEUE);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    info!("audio output: {} Hz, {} channels", sample_rate, channels);

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let stream = build_output_stream_f32(&device, &config.into(), rx, sample_rate, channels)?;
            stream.play().context("failed to play output stream")?;
            Ok(AudioHandle { tx, sample_rate, _stream: stream })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    sample_rate: u32,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(sample_rate);
    let mut scratch: Vec<StereoFrame> = Vec::new();

    let err_fn = |err| error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            // grows on the first callbacks only
            scratch.resize(n_frames, StereoFrame::zero());
            engine.render_block(&mut scratch);
            interleave(&scratch, data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

// mono devices get the left channel; extra channels stay silent
fn interleave(frames: &[StereoFrame], data: &mut [f32], channels: usize) {
    for (out, frame) in data.chunks_exact_mut(channels.max(1)).zip(frames) {
        out.fill(0.0);
        out[0] = frame.left;
        if let Some(right) = out.get_mut(1) {
            *right = frame.right;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaves_stereo_and_wider_layouts() {
        let frames = [StereoFrame { left: 0.1, right: 0.2 }, StereoFrame { left: 0.3, right: 0.4 }];

        let mut stereo = [9.0; 4];
        interleave(&frames, &mut stereo, 2);
        assert_eq!(stereo, [0.1, 0.2, 0.3, 0.4]);

        let mut quad = [9.0; 8];
        interleave(&frames, &mut quad, 4);
        assert_eq!(quad, [0.1, 0.2, 0.0, 0.0, 0.3, 0.4, 0.0, 0.0]);

        let mut mono = [9.0; 2];
        interleave(&frames, &mut mono, 1);
        assert_eq!(mono, [0.1, 0.3]);
    }
}

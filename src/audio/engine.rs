use std::collections::HashMap;

use crate::audio_api::AudioCommand;

use super::drum::DrumVoice;
use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;
use super::voice::SampleVoice;

const MAX_VOICES: usize = 32; // hard cap so the voice pool never grows in the callback
const MASTER_GAIN: f32 = 0.5;

#[derive(Clone, Debug)]
enum Voice {
    Drum(DrumVoice),
    Sample(SampleVoice),
}

pub struct Engine {
    sample_rate: f32,
    samples: HashMap<SampleId, SampleBuffer>,
    voices: Vec<Option<Voice>>, // fixed pool of voices
    next_steal: usize,
}

impl Engine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            samples: HashMap::new(),
            voices: vec![None; MAX_VOICES],
            next_steal: 0,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                self.samples.insert(id, buffer);
            }
            AudioCommand::PlaySample { id, gain } => {
                // an id the engine never saw is dropped silently
                if self.samples.contains_key(&id) {
                    self.start_voice(Voice::Sample(SampleVoice::new(id, gain)));
                }
            }
            AudioCommand::PlayDrum(kind) => {
                self.start_voice(Voice::Drum(DrumVoice::new(kind, self.sample_rate)));
            }
            AudioCommand::Silence => self.voices.fill(None),
        }
    }

    #[cfg(test)]
    fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_some()).count()
    }

    // free slot first, otherwise steal round-robin
    fn start_voice(&mut self, voice: Voice) {
        let slot = match self.voices.iter().position(Option::is_none) {
            Some(free) => free,
            None => {
                let steal = self.next_steal;
                self.next_steal = (self.next_steal + 1) % MAX_VOICES;
                steal
            }
        };
        self.voices[slot] = Some(voice);
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        for slot in self.voices.iter_mut() {
            let alive = match slot {
                Some(Voice::Drum(drum)) => drum.render_into(out),
                Some(Voice::Sample(voice)) => match self.samples.get(&voice.id) {
                    Some(buffer) => voice.render_into(buffer, out),
                    None => false,
                },
                None => continue,
            };
            if !alive {
                *slot = None;
            }
        }
        for frame in out.iter_mut() {
            frame.left = (frame.left * MASTER_GAIN).clamp(-1.0, 1.0);
            frame.right = (frame.right * MASTER_GAIN).clamp(-1.0, 1.0);
        }
    }
}

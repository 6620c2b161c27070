use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;

/// One-shot playback of a registered sample, start to end.
#[derive(Clone, Debug)]
pub struct SampleVoice {
    pub id: SampleId,
    pos: usize,
    gain: f32,
}

impl SampleVoice {
    pub fn new(id: SampleId, gain: f32) -> Self {
        Self { id, pos: 0, gain }
    }

    /// Mixes into `out`; returns false once the sample has run out.
    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame]) -> bool {
        let remaining = buffer.data.get(self.pos..).unwrap_or(&[]);
        for (frame, sample) in out.iter_mut().zip(remaining) {
            frame.add_scaled(*sample, self.gain);
        }
        self.pos += out.len().min(remaining.len());
        self.pos < buffer.data.len()
    }
}

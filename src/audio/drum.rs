// Synthesized drum kit. Each hit is an oscillator and/or a noise burst under an
// exponential decay to 1% over the patch's length; kicks and toms also sweep
// their pitch down over the same span.

use crate::audio_api::DrumKind;

use super::frame::StereoFrame;

const FLOOR: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wave {
    Sine,
    Triangle,
    Square,
}

#[derive(Clone, Copy, Debug)]
struct Patch {
    wave: Wave,
    freq: f32,
    sweep: bool,
    tone: f32,
    noise: f32,
    decay_secs: f32,
    bursts: u32,
    burst_gap_secs: f32,
}

impl Patch {
    const fn tone(wave: Wave, freq: f32, gain: f32, decay_secs: f32) -> Self {
        Self { wave, freq, sweep: false, tone: gain, noise: 0.0, decay_secs, bursts: 1, burst_gap_secs: 0.0 }
    }

    const fn noise(gain: f32, decay_secs: f32) -> Self {
        Self { wave: Wave::Sine, freq: 0.0, sweep: false, tone: 0.0, noise: gain, decay_secs, bursts: 1, burst_gap_secs: 0.0 }
    }

    const fn swept(self) -> Self {
        Self { sweep: true, ..self }
    }
}

fn patch(kind: DrumKind) -> Patch {
    match kind {
        DrumKind::Kick => Patch::tone(Wave::Sine, 150.0, 1.0, 0.5).swept(),
        DrumKind::Snare => Patch { noise: 0.3, ..Patch::tone(Wave::Triangle, 200.0, 0.7, 0.2) },
        DrumKind::HiHatClosed => Patch::noise(0.3, 0.05),
        DrumKind::HiHatOpen => Patch::noise(0.3, 0.3),
        DrumKind::TomLow => Patch::tone(Wave::Sine, 90.0, 0.8, 0.4).swept(),
        DrumKind::TomMid => Patch::tone(Wave::Sine, 130.0, 0.8, 0.3).swept(),
        DrumKind::TomHigh => Patch::tone(Wave::Sine, 180.0, 0.8, 0.25).swept(),
        DrumKind::Clap => Patch { bursts: 3, burst_gap_secs: 0.03, ..Patch::noise(0.4, 0.05) },
        DrumKind::Cymbal => Patch::noise(0.4, 0.8),
        DrumKind::Rim => Patch::tone(Wave::Triangle, 400.0, 0.5, 0.1),
        DrumKind::Cowbell => Patch::tone(Wave::Square, 540.0, 0.5, 0.3),
        DrumKind::Perc => Patch::tone(Wave::Sine, 800.0, 0.4, 0.15),
    }
}

#[derive(Clone, Debug)]
pub struct DrumVoice {
    patch: Patch,
    sample_rate: f32,
    phase: f32,
    age: usize,
    decay_len: usize,
    burst_gap: usize,
    length: usize,
    rng: u32,
}

impl DrumVoice {
    pub fn new(kind: DrumKind, sample_rate: f32) -> Self {
        let patch = patch(kind);
        let decay_len = ((patch.decay_secs * sample_rate).round() as usize).max(1);
        let burst_gap = (patch.burst_gap_secs * sample_rate).round() as usize;
        let length = burst_gap * (patch.bursts.saturating_sub(1) as usize) + decay_len;
        Self { patch, sample_rate, phase: 0.0, age: 0, decay_len, burst_gap, length, rng: 0x9E37_79B9 }
    }

    #[cfg(test)]
    fn length(&self) -> usize {
        self.length
    }

    /// Mixes into `out`; returns false once the hit has died away.
    pub fn render_into(&mut self, out: &mut [StereoFrame]) -> bool {
        for frame in out.iter_mut() {
            if self.age >= self.length {
                return false;
            }
            frame.add_scaled(StereoFrame::mono(self.next_value()), 1.0);
            self.age += 1;
        }
        self.age < self.length
    }

    fn next_value(&mut self) -> f32 {
        // restart the envelope for each burst (claps)
        let last_burst = self.burst_gap * (self.patch.bursts.saturating_sub(1) as usize);
        let t = if self.age < last_burst { self.age % self.burst_gap } else { self.age - last_burst };
        let progress = t as f32 / self.decay_len as f32;
        let env = FLOOR.powf(progress);

        let mut value = 0.0;
        if self.patch.tone > 0.0 {
            let freq = if self.patch.sweep {
                // 150Hz -> 0.01Hz style ramp, same shape as the amplitude
                self.patch.freq * (FLOOR / self.patch.freq).powf(progress)
            } else {
                self.patch.freq
            };
            value += self.patch.tone * oscillator(self.patch.wave, self.phase);
            self.phase = (self.phase + freq / self.sample_rate).fract();
        }
        if self.patch.noise > 0.0 {
            value += self.patch.noise * self.white();
        }
        value * env
    }

    // xorshift32, -1.0..1.0
    fn white(&mut self) -> f32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

fn oscillator(wave: Wave, phase: f32) -> f32 {
    match wave {
        Wave::Sine => (phase * std::f32::consts::TAU).sin(),
        Wave::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        Wave::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_all(kind: DrumKind, rate: f32) -> Vec<f32> {
        let mut voice = DrumVoice::new(kind, rate);
        let mut out = vec![StereoFrame::zero(); voice.length() + 64];
        voice.render_into(&mut out);
        out.iter().map(|f| f.left).collect()
    }

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn every_drum_makes_sound_and_ends() {
        for kind in DrumKind::KIT {
            let samples = render_all(kind, 48_000.0);
            let len = DrumVoice::new(kind, 48_000.0).length();
            assert!(peak(&samples[..len]) > 0.05, "{kind:?} is silent");
            assert!(samples[len..].iter().all(|s| *s == 0.0), "{kind:?} rings past its length");
        }
    }

    #[test]
    fn kick_decays() {
        let samples = render_all(DrumKind::Kick, 48_000.0);
        assert_eq!(DrumVoice::new(DrumKind::Kick, 48_000.0).length(), 24_000);
        assert!(peak(&samples[..2_000]) > 4.0 * peak(&samples[20_000..24_000]));
    }

    #[test]
    fn clap_is_three_bursts() {
        let len = DrumVoice::new(DrumKind::Clap, 1_000.0).length();
        assert_eq!(len, 30 * 2 + 50);
    }

    #[test]
    fn oscillators_stay_in_range() {
        for wave in [Wave::Sine, Wave::Triangle, Wave::Square] {
            for i in 0..100 {
                let v = oscillator(wave, i as f32 / 100.0);
                assert!((-1.0..=1.0).contains(&v));
            }
        }
    }
}

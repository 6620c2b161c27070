// The smallest unit of audio; one stereo frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn mono(value: f32) -> Self {
        Self { left: value, right: value }
    }

    pub fn add_scaled(&mut self, other: StereoFrame, gain: f32) {
        self.left += other.left * gain;
        self.right += other.right * gain;
    }
}

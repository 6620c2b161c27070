use std::path::Path;

use super::frame::StereoFrame;

#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
}

impl SampleBuffer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Decode a WAV file into stereo frames at the output rate
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                // scale ints into -1.0..1.0
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        // mono is duplicated; anything past two channels is dropped
        let frames: Vec<StereoFrame> = samples
            .chunks_exact(channels)
            .map(|c| StereoFrame { left: c[0], right: if channels > 1 { c[1] } else { c[0] } })
            .collect();

        if frames.is_empty() {
            anyhow::bail!("{} has no audio", path.display());
        }

        Ok(Self { data: resample_linear(&frames, spec.sample_rate, target_rate) })
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || frames.is_empty() {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames.len() - 1;

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx >= last {
                return frames[last];
            }
            let frac = (src_pos - idx as f64) as f32;
            let (a, b) = (frames[idx], frames[idx + 1]);
            StereoFrame {
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn write_wav(path: &Path, channels: u16, rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn mono_int_wav_becomes_stereo_floats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("click.wav");
        write_wav(&path, 1, 44_100, &[0, 16_384, -16_384]);

        let buf = SampleBuffer::load_wav(&path, 44_100).unwrap();
        assert_eq!(buf.len(), 3);
        assert_abs_diff_eq!(buf.data[1].left, 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(buf.data[2].right, -0.5, epsilon = 1e-4);
    }

    #[test]
    fn upsampling_doubles_the_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.wav");
        write_wav(&path, 2, 22_050, &[0, 0, 1000, 1000, 2000, 2000, 3000, 3000]);
        let buf = SampleBuffer::load_wav(&path, 44_100).unwrap();
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn interpolates_between_frames() {
        let frames = [StereoFrame::mono(0.0), StereoFrame::mono(1.0)];
        let out = resample_linear(&frames, 1, 2);
        assert_eq!(out.len(), 4);
        assert_abs_diff_eq!(out[1].left, 0.5);
        assert_eq!(out[3], StereoFrame::mono(1.0));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(SampleBuffer::load_wav(Path::new("/definitely/not/here.wav"), 44_100).is_err());
    }
}

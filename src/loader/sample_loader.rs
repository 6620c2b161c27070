use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::audio::{SampleBuffer, SampleId};

// Load a WAV from disk, prepare for registration with the engine
pub fn load(path: &Path, target_rate: u32) -> anyhow::Result<(SampleId, SampleBuffer)> {
    let buffer = SampleBuffer::load_wav(path, target_rate)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok((SampleId::next(), buffer))
}

/// The `.wav` files directly under `dir`, sorted by file name. A missing
/// directory is just empty.
pub fn index_wav_in_dir(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if is_wav && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        writer.write_sample(1000i16).unwrap();
        writer.finalize().unwrap();
    }

    #[test]
    fn indexes_only_wavs_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        touch_wav(&dir.path().join("b.wav"));
        touch_wav(&dir.path().join("a.WAV"));
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let found = index_wav_in_dir(dir.path()).unwrap();
        let names: Vec<_> = found.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, ["a.WAV", "b.wav"]);
    }

    #[test]
    fn missing_dir_is_empty() {
        assert!(index_wav_in_dir(Path::new("/no/such/uploads")).unwrap().is_empty());
    }

    #[test]
    fn load_hands_out_fresh_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.wav");
        touch_wav(&path);
        let (a, buf) = load(&path, 8_000).unwrap();
        let (b, _) = load(&path, 8_000).unwrap();
        assert_ne!(a, b);
        assert_eq!(buf.len(), 1);
    }
}

// Owns the one clock. Every tick replays the notes sitting on that beat; the
// recorder is never touched from here, so replayed notes can't feed back into
// a recording.

use std::time::Instant;

use log::{debug, warn};

use crate::dispatch::SoundDispatch;
use crate::error::Result;

use super::clock::Clock;
use super::layers::LayerStore;
use super::LoopSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayMode {
    /// The user asked for playback.
    Requested,
    /// Started because a recording began while stopped. Once the recording ends
    /// the loop finishes its current pass and stops at the wrap.
    ForRecording { stop_at_wrap: bool },
}

#[derive(Debug, Default)]
pub struct PlaybackEngine {
    clock: Clock,
    current_beat: usize,
    mode: Option<PlayMode>,
    ticked: bool, // a tick has fired since the clock started
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn current_beat(&self) -> usize {
        self.current_beat
    }

    pub fn mode(&self) -> Option<PlayMode> {
        self.mode
    }

    pub fn cycle_start(&self) -> Option<Instant> {
        self.clock.cycle_start()
    }

    /// No-op while running, except that playback started for a recording
    /// becomes ordinary playback and will no longer stop at the wrap.
    pub fn play(&mut self, settings: &LoopSettings, now: Instant) -> Result<()> {
        if self.clock.is_running() {
            self.mode = Some(PlayMode::Requested);
            return Ok(());
        }
        self.start(settings, now, PlayMode::Requested)
    }

    /// Returns whether the clock had to be started.
    pub fn start_for_recording(&mut self, settings: &LoopSettings, now: Instant) -> Result<bool> {
        if self.clock.is_running() {
            return Ok(false);
        }
        self.start(settings, now, PlayMode::ForRecording { stop_at_wrap: false })?;
        Ok(true)
    }

    /// A new take over record-triggered playback keeps the loop going again.
    pub fn recording_started(&mut self) {
        if let Some(PlayMode::ForRecording { stop_at_wrap }) = self.mode.as_mut() {
            *stop_at_wrap = false;
        }
    }

    pub fn recording_finished(&mut self) {
        if let Some(PlayMode::ForRecording { stop_at_wrap }) = self.mode.as_mut() {
            *stop_at_wrap = true;
            debug!("recording ended; playback stops at the next wrap");
        }
    }

    /// Safe at any time; no tick fires after it returns.
    pub fn stop(&mut self) {
        if self.clock.is_running() {
            debug!("playback stopped at beat {}", self.current_beat);
        }
        self.clock.stop();
        self.mode = None;
        self.current_beat = 0;
        self.ticked = false;
    }

    /// Drains every due tick, replaying the layers. Returns how many ticks fired.
    /// Edits made between calls show up on the next tick.
    pub fn poll(&mut self, now: Instant, layers: &LayerStore, dispatch: &mut dyn SoundDispatch) -> usize {
        let mut fired = 0;
        while let Some(beat) = self.clock.poll(now) {
            // the opening beat 0 is not a wrap
            let wrapped = beat == 0 && self.ticked;
            if wrapped && matches!(self.mode, Some(PlayMode::ForRecording { stop_at_wrap: true })) {
                self.stop();
                break;
            }
            self.on_tick(beat, layers, dispatch);
            fired += 1;
        }
        fired
    }

    fn start(&mut self, settings: &LoopSettings, now: Instant, mode: PlayMode) -> Result<()> {
        self.clock.start(settings.bpm(), settings.total_beats(), now)?;
        self.mode = Some(mode);
        self.current_beat = 0;
        self.ticked = false;
        if let Some(interval) = self.clock.interval() {
            debug!("playback started at {} bpm, {:?} a beat ({:?})", settings.bpm(), interval, mode);
        }
        Ok(())
    }

    fn on_tick(&mut self, beat: usize, layers: &LayerStore, dispatch: &mut dyn SoundDispatch) {
        self.current_beat = beat;
        self.ticked = true;
        for note in layers.notes_at(beat) {
            // one missing sound must not cost the rest of the tick
            if let Err(e) = dispatch.trigger(note.key) {
                warn!("beat {beat}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use crate::looper::{Layer, Note};
    use crate::shared::PadKey;
    use std::time::Duration;

    fn pad(i: u8) -> PadKey {
        PadKey::new(i).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn quiet(_: PadKey) -> std::result::Result<(), DispatchError> {
        Ok(())
    }

    fn store(notes: Vec<Note>) -> LayerStore {
        let mut store = LayerStore::new(64);
        store.append_layer(Layer::new(notes)).unwrap();
        store
    }

    #[test]
    fn replays_only_notes_on_the_current_beat() {
        let layers = store(vec![Note { key: pad(0), beat: 0 }, Note { key: pad(1), beat: 2 }]);
        let t0 = Instant::now();
        let mut engine = PlaybackEngine::new();
        engine.play(&LoopSettings::default(), t0).unwrap();

        let mut hits = Vec::new();
        let mut dispatch = |key: PadKey| -> std::result::Result<(), DispatchError> {
            hits.push(key);
            Ok(())
        };
        assert_eq!(engine.poll(t0 + ms(600), &layers, &mut dispatch), 2);
        assert_eq!(engine.current_beat(), 1);
        engine.poll(t0 + ms(1000), &layers, &mut dispatch);
        assert_eq!(engine.current_beat(), 2);
        assert_eq!(hits, vec![pad(0), pad(1)]);
    }

    #[test]
    fn failing_note_does_not_stop_the_tick() {
        let layers = store(vec![
            Note { key: pad(0), beat: 0 },
            Note { key: pad(1), beat: 0 },
            Note { key: pad(2), beat: 0 },
        ]);
        let t0 = Instant::now();
        let mut engine = PlaybackEngine::new();
        engine.play(&LoopSettings::default(), t0).unwrap();

        let mut played = Vec::new();
        let mut dispatch = |key: PadKey| {
            if key == pad(1) {
                return Err(DispatchError::NoSound(key));
            }
            played.push(key);
            Ok(())
        };
        engine.poll(t0, &layers, &mut dispatch);
        assert_eq!(played, vec![pad(0), pad(2)]);
        assert!(engine.is_running());
    }

    #[test]
    fn play_twice_keeps_one_clock() {
        let t0 = Instant::now();
        let mut engine = PlaybackEngine::new();
        let settings = LoopSettings::default();
        engine.play(&settings, t0).unwrap();
        engine.play(&settings, t0 + ms(250)).unwrap();
        let layers = LayerStore::new(64);
        let mut dispatch = quiet;
        assert_eq!(engine.poll(t0 + ms(1000), &layers, &mut dispatch), 3);
    }

    #[test]
    fn stop_resets_and_is_idempotent() {
        let t0 = Instant::now();
        let mut engine = PlaybackEngine::new();
        engine.play(&LoopSettings::default(), t0).unwrap();
        let layers = LayerStore::new(64);
        let mut dispatch = quiet;
        engine.poll(t0 + ms(2600), &layers, &mut dispatch);
        assert_eq!(engine.current_beat(), 5);
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
        assert_eq!(engine.current_beat(), 0);
        assert_eq!(engine.mode(), None);
        assert_eq!(engine.poll(t0 + ms(9000), &layers, &mut dispatch), 0);
    }

    #[test]
    fn recording_playback_stops_exactly_at_the_wrap() {
        let t0 = Instant::now();
        let mut engine = PlaybackEngine::new();
        let settings = LoopSettings::default();
        assert!(engine.start_for_recording(&settings, t0).unwrap());
        let layers = LayerStore::new(64);
        let mut dispatch = quiet;

        engine.poll(t0 + ms(10_000), &layers, &mut dispatch);
        engine.recording_finished();
        // beats 21..=63 still play out
        assert_eq!(engine.poll(t0 + ms(31_999), &layers, &mut dispatch), 43);
        assert_eq!(engine.current_beat(), 63);
        assert!(engine.is_running());
        assert_eq!(engine.poll(t0 + ms(32_000), &layers, &mut dispatch), 0);
        assert!(!engine.is_running());
        assert_eq!(engine.current_beat(), 0);
    }

    #[test]
    fn a_new_take_cancels_the_pending_stop() {
        let t0 = Instant::now();
        let mut engine = PlaybackEngine::new();
        let settings = LoopSettings::default();
        engine.start_for_recording(&settings, t0).unwrap();
        let layers = LayerStore::new(64);
        let mut dispatch = quiet;

        engine.poll(t0 + ms(5_000), &layers, &mut dispatch);
        engine.recording_finished();
        engine.recording_started();
        assert_eq!(engine.mode(), Some(PlayMode::ForRecording { stop_at_wrap: false }));
        engine.poll(t0 + ms(33_000), &layers, &mut dispatch);
        assert!(engine.is_running());
        assert_eq!(engine.current_beat(), 2);
    }

    #[test]
    fn ending_a_take_before_the_first_tick_still_plays_the_pass() {
        let t0 = Instant::now();
        let mut engine = PlaybackEngine::new();
        let settings = LoopSettings::default();
        let layers = LayerStore::new(64);
        let mut dispatch = quiet;
        engine.start_for_recording(&settings, t0).unwrap();
        engine.recording_finished();

        assert_eq!(engine.poll(t0, &layers, &mut dispatch), 1);
        assert!(engine.is_running());
        assert_eq!(engine.poll(t0 + ms(31_999), &layers, &mut dispatch), 63);
        assert_eq!(engine.poll(t0 + ms(32_000), &layers, &mut dispatch), 0);
        assert!(!engine.is_running());
    }

    #[test]
    fn play_during_recording_playback_cancels_the_auto_stop() {
        let t0 = Instant::now();
        let mut engine = PlaybackEngine::new();
        let settings = LoopSettings::default();
        engine.start_for_recording(&settings, t0).unwrap();
        engine.play(&settings, t0 + ms(100)).unwrap();
        engine.recording_finished();
        let layers = LayerStore::new(64);
        let mut dispatch = quiet;
        engine.poll(t0 + ms(40_000), &layers, &mut dispatch);
        assert!(engine.is_running());
        assert_eq!(engine.mode(), Some(PlayMode::Requested));
    }
}

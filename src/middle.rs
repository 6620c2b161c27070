// Sits between the TUI and the loop engine. Input events come in, audio
// commands go out (for main to forward to the audio thread), and the TUI reads
// back a DisplayState each frame.

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};

use crate::audio_api::AudioCommand;
use crate::config::AppConfig;
use crate::dispatch::CommandDispatch;
use crate::loader::sample_loader;
use crate::looper::{LoopSettings, Looper};
use crate::packs::{self, PackBank, PackKind, SavedPacks};
use crate::persistence::{self, KeyValueStore};
use crate::shared::{DisplayState, InputEvent, NUM_PADS, PadKey};

pub struct Middle {
    looper: Looper,
    bank: PackBank,
    saved: SavedPacks,
    loaded_pack: Option<String>, // saved pack currently on the custom pads
    store: Box<dyn KeyValueStore>,
    sample_rate: u32,
    selected_layer: Option<usize>,
    selected_note: Option<usize>,
    status: String,
}

impl Middle {
    /// Restores the last session and the saved packs from `store`.
    pub fn new(settings: LoopSettings, store: Box<dyn KeyValueStore>, sample_rate: u32) -> Self {
        let mut looper = Looper::new(settings);
        let mut status = String::from("ready");
        if let Some(set) = persistence::load_layers(store.as_ref()) {
            let count = set.layers.len();
            match looper.restore(set) {
                Ok(()) => {
                    info!("restored {count} layers at {} bpm", looper.bpm());
                    status = format!("restored {count} layers");
                }
                Err(e) => warn!("ignoring saved session: {e}"),
            }
        }
        let saved = persistence::load_packs(store.as_ref());
        Self {
            looper,
            bank: PackBank::default(),
            saved,
            loaded_pack: None,
            store,
            sample_rate,
            selected_layer: None,
            selected_note: None,
            status,
        }
    }

    pub fn from_config(config: &AppConfig, store: Box<dyn KeyValueStore>, sample_rate: u32) -> Self {
        let mut middle = Self::new(config.loop_settings(), store, sample_rate);
        middle.bank.set_active(config.pack);
        if let Some(name) = &config.pack_name {
            middle.bank.set_custom_name(name.as_str());
        }
        middle
    }

    pub fn looper(&self) -> &Looper {
        &self.looper
    }

    pub fn bank(&self) -> &PackBank {
        &self.bank
    }

    pub fn saved_packs(&self) -> &SavedPacks {
        &self.saved
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> Vec<AudioCommand> {
        let mut cmds = Vec::new();
        match event {
            InputEvent::Pad(key) => {
                let mut dispatch = CommandDispatch::new(&self.bank, &mut cmds);
                if let Some(note) = self.looper.trigger(key, now, &mut dispatch) {
                    self.status = format!("captured {} on beat {}", self.bank.label(key), note.beat + 1);
                }
            }
            InputEvent::ClearSlot(key) => {
                if self.bank.clear_slot(key) {
                    self.status = format!("cleared pad {}", key.index() + 1);
                }
            }
            InputEvent::TogglePlay => match self.looper.toggle_playback(now) {
                Ok(()) => self.status = if self.looper.is_playing() { "playing" } else { "stopped" }.into(),
                Err(e) => self.status = e.to_string(),
            },
            InputEvent::ToggleRecord => match self.looper.toggle_recording(now) {
                Ok(Some(index)) => {
                    self.select_layer_at(Some(index));
                    self.status = format!("recorded layer {}", index + 1);
                }
                Ok(None) if self.looper.is_recording() => self.status = "recording".into(),
                Ok(None) => self.status = "nothing recorded".into(),
                Err(e) => self.status = e.to_string(),
            },
            InputEvent::AdjustBpm(delta) => {
                let target = (self.looper.bpm() as i64 + delta as i64).max(0) as u32;
                match self.looper.set_bpm(target) {
                    Ok(bpm) => self.status = format!("{bpm} bpm"),
                    Err(e) => self.status = e.to_string(),
                }
            }
            InputEvent::NextPack => {
                self.bank.next_pack();
                self.status = self.bank.pack_label();
            }
            InputEvent::SelectLayer(delta) => {
                let target = step(self.selected_layer, delta, self.looper.layers().len());
                self.select_layer_at(target);
            }
            InputEvent::SelectNote(delta) => {
                if let Some(len) = self.selected_layer_len() {
                    self.selected_note = step(self.selected_note, delta, len);
                }
            }
            InputEvent::NudgeNote(delta) => self.nudge_selected(delta),
            InputEvent::DeleteNote => self.delete_selected_note(),
            InputEvent::DeleteLayer => self.delete_selected_layer(),
            InputEvent::ClearAll => {
                self.looper.clear_all();
                self.select_layer_at(None);
                cmds.push(AudioCommand::Silence);
                self.status = "cleared".into();
            }
            InputEvent::SavePack => self.save_pack(),
            InputEvent::LoadNextSavedPack => cmds.extend(self.load_next_saved_pack()),
            InputEvent::DeleteSavedPack => self.delete_loaded_pack(),
            InputEvent::Quit => {}
        }
        cmds
    }

    /// Replays whatever ticks came due since the last frame.
    pub fn tick(&mut self, now: Instant) -> Vec<AudioCommand> {
        let mut cmds = Vec::new();
        let was_playing = self.looper.is_playing();
        let mut dispatch = CommandDispatch::new(&self.bank, &mut cmds);
        self.looper.poll(now, &mut dispatch);
        if was_playing && !self.looper.is_playing() {
            self.status = "stopped".into();
        }
        cmds
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            playing: self.looper.is_playing(),
            recording: self.looper.is_recording(),
            bpm: self.looper.bpm(),
            current_beat: self.looper.current_beat(),
            pack_label: self.bank.pack_label(),
            pad_labels: PadKey::all().map(|key| self.bank.label(key)).collect(),
            layers: self.looper.layers().layers().to_vec(),
            in_progress: self.looper.captured().to_vec(),
            selected_layer: self.selected_layer,
            selected_note: self.selected_note,
            status: self.status.clone(),
        }
    }

    /// Decodes `path` and binds it to a pad of `kind`'s slots. The returned
    /// command registers the buffer with the engine.
    pub fn load_sample_into_slot(
        &mut self,
        kind: PackKind,
        key: PadKey,
        name: &str,
        path: &Path,
    ) -> anyhow::Result<AudioCommand> {
        let (id, buffer) = sample_loader::load(path, self.sample_rate)?;
        self.bank.assign_to(kind, key, name, Some(path.to_path_buf()), id);
        debug!("{} -> pad {} ({})", path.display(), key.index() + 1, id);
        Ok(AudioCommand::RegisterSample { id, buffer })
    }

    /// Loads whichever files of the fixed sample pack exist under `dir`.
    pub fn load_sample_pack(&mut self, dir: &Path) -> Vec<AudioCommand> {
        let files = packs::sample_pack_files(dir);
        if files.is_empty() {
            info!("no sample pack files under {}", dir.display());
        }
        self.load_all(PackKind::SamplePack, files)
    }

    /// WAVs in `dir` go onto the custom pads in file name order.
    pub fn load_uploads(&mut self, dir: &Path) -> Vec<AudioCommand> {
        let paths = match sample_loader::index_wav_in_dir(dir) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("could not list uploads: {e:#}");
                return Vec::new();
            }
        };
        if paths.len() > NUM_PADS {
            warn!("{} uploads, only the first {NUM_PADS} fit", paths.len());
        }
        let files = PadKey::all()
            .zip(paths)
            .map(|(key, path)| (key, file_name(&path), path))
            .collect();
        self.load_all(PackKind::Custom, files)
    }

    fn load_all(&mut self, kind: PackKind, files: Vec<(PadKey, String, PathBuf)>) -> Vec<AudioCommand> {
        files
            .into_iter()
            .filter_map(|(key, name, path)| match self.load_sample_into_slot(kind, key, &name, &path) {
                Ok(cmd) => Some(cmd),
                Err(e) => {
                    warn!("skipping {}: {e:#}", path.display());
                    None
                }
            })
            .collect()
    }

    /// Ends any recording in progress and writes the layers out.
    pub fn save_session(&mut self) -> anyhow::Result<()> {
        self.looper.stop_recording();
        self.looper.stop();
        persistence::save_layers(self.store.as_mut(), &self.looper.snapshot())
    }

    fn selected_layer_len(&self) -> Option<usize> {
        let index = self.selected_layer?;
        self.looper.layers().layer(index).map(|layer| layer.len())
    }

    fn select_layer_at(&mut self, index: Option<usize>) {
        self.selected_layer = index.filter(|&i| i < self.looper.layers().len());
        self.selected_note = match self.selected_layer_len() {
            Some(len) if len > 0 => Some(0),
            _ => None,
        };
    }

    fn selected(&self) -> Option<(usize, usize)> {
        Some((self.selected_layer?, self.selected_note?))
    }

    // wraps around the loop so a note can be walked past either end
    fn nudge_selected(&mut self, delta: i32) {
        let Some((layer, note)) = self.selected() else { return };
        let Some(current) = self.looper.layers().layer(layer).and_then(|l| l.notes().get(note)) else {
            return;
        };
        let total = self.looper.settings().total_beats() as i64;
        let beat = (current.beat as i64 + delta as i64).rem_euclid(total) as usize;
        match self.looper.move_note(layer, note, beat) {
            Ok(()) => self.status = format!("note moved to beat {}", beat + 1),
            Err(e) => self.status = e.to_string(),
        }
    }

    fn delete_selected_note(&mut self) {
        let Some((layer, note)) = self.selected() else { return };
        match self.looper.delete_note(layer, note) {
            Ok(_) => {
                let len = self.selected_layer_len().unwrap_or(0);
                self.selected_note = if len == 0 { None } else { Some(note.min(len - 1)) };
                self.status = "note deleted".into();
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn delete_selected_layer(&mut self) {
        let Some(layer) = self.selected_layer else { return };
        match self.looper.delete_layer(layer) {
            Ok(_) => {
                let len = self.looper.layers().len();
                self.select_layer_at(if len == 0 { None } else { Some(layer.min(len - 1)) });
                self.status = format!("layer {} deleted", layer + 1);
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn save_pack(&mut self) {
        let pack = match self.bank.to_saved() {
            Ok(pack) => pack,
            Err(e) => {
                self.status = e.to_string();
                return;
            }
        };
        let name = pack.name.clone();
        self.saved.insert(pack);
        self.loaded_pack = Some(name.clone());
        self.status = match persistence::save_packs(self.store.as_mut(), &self.saved) {
            Ok(()) => {
                info!("saved pack \"{name}\"");
                format!("saved \"{name}\"")
            }
            Err(e) => {
                warn!("saving packs: {e:#}");
                format!("could not save \"{name}\"")
            }
        };
    }

    fn load_next_saved_pack(&mut self) -> Vec<AudioCommand> {
        let Some(pack) = self.saved.next_after(self.loaded_pack.as_deref()).cloned() else {
            self.status = "no saved packs".into();
            return Vec::new();
        };
        let reload = self.bank.apply_saved(&pack);
        let missing = pack.sounds.len() - reload.len();
        let cmds = self.load_all(PackKind::Custom, reload);
        self.loaded_pack = Some(pack.name.clone());
        self.status = if missing == 0 {
            format!("loaded \"{}\"", pack.name)
        } else {
            format!("loaded \"{}\" ({missing} sounds need re-uploading)", pack.name)
        };
        cmds
    }

    fn delete_loaded_pack(&mut self) {
        let Some(name) = self.loaded_pack.take() else {
            self.status = "no saved pack loaded".into();
            return;
        };
        if let Err(e) = self.saved.remove(&name) {
            self.status = e.to_string();
            return;
        }
        self.status = match persistence::save_packs(self.store.as_mut(), &self.saved) {
            Ok(()) => format!("deleted \"{name}\""),
            Err(e) => {
                warn!("saving packs: {e:#}");
                format!("could not delete \"{name}\"")
            }
        };
    }
}

// moves a selection by `delta` within 0..len; no selection starts from the near end
fn step(current: Option<usize>, delta: i32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let last = len as i64 - 1;
    let next = match current {
        Some(i) => i as i64 + delta as i64,
        None if delta < 0 => last,
        None => 0,
    };
    Some(next.clamp(0, last) as usize)
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

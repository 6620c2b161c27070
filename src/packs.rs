// Packs map pads to sounds. The drum machine is synthesized in the audio engine;
// the sample pack and the custom pack hold WAVs registered with the engine by id.
//
// Saved packs are metadata only: slot names and the file each came from. The
// audio itself is never persisted, so loading a saved pack re-reads whatever
// files still exist and leaves the rest for the user to supply again.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audio_api::{AudioCommand, DrumKind, SampleId};
use crate::error::PackError;
use crate::shared::{NUM_PADS, PadKey};

pub const CUSTOM_PACK_NAME: &str = "Custom";
const LABEL_LEN: usize = 12;
const SAMPLE_GAIN: f32 = 0.9;

// the fixed sample pack, looked up in the samples dir; the last two pads are open slots
const SAMPLE_PACK: [Option<(&str, &str)>; NUM_PADS] = [
    Some(("Piano 1", "piano1.wav")),
    Some(("Piano 2", "piano2.wav")),
    Some(("Piano 3", "piano3.wav")),
    Some(("Piano 4", "piano4.wav")),
    Some(("Piano 5", "piano5.wav")),
    Some(("Piano 6", "piano6.wav")),
    Some(("Piano 7", "piano7.wav")),
    Some(("Piano 8", "piano8.wav")),
    Some(("Beat", "beat.wav")),
    Some(("Vocal", "vocal.wav")),
    None,
    None,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum PackKind {
    #[value(name = "drums")]
    DrumMachine,
    #[value(name = "samples")]
    SamplePack,
    #[value(name = "custom")]
    Custom,
}

impl PackKind {
    pub fn next(self) -> Self {
        match self {
            PackKind::DrumMachine => PackKind::SamplePack,
            PackKind::SamplePack => PackKind::Custom,
            PackKind::Custom => PackKind::DrumMachine,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PackKind::DrumMachine => "Drum Machine",
            PackKind::SamplePack => "Sample Pack",
            PackKind::Custom => CUSTOM_PACK_NAME,
        }
    }
}

pub fn drum_for_pad(key: PadKey) -> DrumKind {
    DrumKind::KIT[key.index()]
}

/// One sample slot. `sample_id` is set once the buffer is registered with the engine.
#[derive(Clone, Debug, Default)]
pub struct Slot {
    pub name: String,
    pub path: Option<PathBuf>,
    pub sample_id: Option<SampleId>,
}

impl Slot {
    pub fn is_loaded(&self) -> bool {
        self.sample_id.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct PackBank {
    active: PackKind,
    sample_slots: Vec<Slot>,
    custom_slots: Vec<Slot>,
    custom_name: String,
}

impl Default for PackBank {
    fn default() -> Self {
        Self {
            active: PackKind::DrumMachine,
            sample_slots: vec![Slot::default(); NUM_PADS],
            custom_slots: vec![Slot::default(); NUM_PADS],
            custom_name: CUSTOM_PACK_NAME.to_string(),
        }
    }
}

impl PackBank {
    pub fn active(&self) -> PackKind {
        self.active
    }

    pub fn set_active(&mut self, kind: PackKind) {
        self.active = kind;
    }

    pub fn next_pack(&mut self) -> PackKind {
        self.active = self.active.next();
        self.active
    }

    pub fn custom_name(&self) -> &str {
        &self.custom_name
    }

    pub fn set_custom_name(&mut self, name: impl Into<String>) {
        self.custom_name = name.into();
    }

    pub fn pack_label(&self) -> String {
        match self.active {
            PackKind::Custom => self.custom_name.clone(),
            kind => kind.label().to_string(),
        }
    }

    pub fn resolve(&self, key: PadKey) -> Option<AudioCommand> {
        if self.active == PackKind::DrumMachine {
            return Some(AudioCommand::PlayDrum(drum_for_pad(key)));
        }
        let id = self.slot(key)?.sample_id?;
        Some(AudioCommand::PlaySample { id, gain: SAMPLE_GAIN })
    }

    pub fn label(&self, key: PadKey) -> String {
        match self.active {
            PackKind::DrumMachine => drum_for_pad(key).name().to_string(),
            PackKind::SamplePack => {
                let slot = &self.sample_slots[key.index()];
                if slot.is_loaded() {
                    short_label(&slot.name)
                } else if let Some((name, _)) = SAMPLE_PACK[key.index()] {
                    name.to_string()
                } else {
                    "Upload".to_string()
                }
            }
            PackKind::Custom => {
                let slot = &self.custom_slots[key.index()];
                if slot.name.is_empty() { "Empty".to_string() } else { short_label(&slot.name) }
            }
        }
    }

    /// The slot a pad maps to in the active pack; `None` on the drum machine.
    pub fn slot(&self, key: PadKey) -> Option<&Slot> {
        match self.active {
            PackKind::DrumMachine => None,
            PackKind::SamplePack => self.sample_slots.get(key.index()),
            PackKind::Custom => self.custom_slots.get(key.index()),
        }
    }

    // uploads on the drum machine land in the custom pack
    fn editable_slots(&mut self) -> &mut Vec<Slot> {
        match self.active {
            PackKind::SamplePack => &mut self.sample_slots,
            PackKind::DrumMachine | PackKind::Custom => &mut self.custom_slots,
        }
    }

    pub fn assign(&mut self, key: PadKey, name: impl Into<String>, path: Option<PathBuf>, id: SampleId) {
        self.editable_slots()[key.index()] = Slot { name: name.into(), path, sample_id: Some(id) };
    }

    pub fn assign_to(&mut self, kind: PackKind, key: PadKey, name: impl Into<String>, path: Option<PathBuf>, id: SampleId) {
        let slots = match kind {
            PackKind::SamplePack => &mut self.sample_slots,
            PackKind::DrumMachine | PackKind::Custom => &mut self.custom_slots,
        };
        slots[key.index()] = Slot { name: name.into(), path, sample_id: Some(id) };
    }

    /// Returns whether there was anything to clear.
    pub fn clear_slot(&mut self, key: PadKey) -> bool {
        if self.active == PackKind::DrumMachine {
            return false;
        }
        let slot = &mut self.editable_slots()[key.index()];
        let had_sound = slot.is_loaded() || !slot.name.is_empty();
        *slot = Slot::default();
        had_sound
    }

    pub fn to_saved(&self) -> Result<SavedPack, PackError> {
        let name = self.custom_name.trim();
        if name.is_empty() || name == CUSTOM_PACK_NAME {
            return Err(PackError::Unnamed(CUSTOM_PACK_NAME.to_string()));
        }
        let sounds = PadKey::all()
            .filter_map(|key| {
                let slot = &self.custom_slots[key.index()];
                (!slot.name.is_empty()).then(|| {
                    let path = slot.path.as_ref().map(|p| p.to_string_lossy().into_owned());
                    (u8::from(key), SavedSound { name: slot.name.clone(), path })
                })
            })
            .collect();
        Ok(SavedPack { name: name.to_string(), sounds })
    }

    /// Empties the custom pack and takes over the saved names. Returns the
    /// files that still exist so the caller can load them back in.
    pub fn apply_saved(&mut self, pack: &SavedPack) -> Vec<(PadKey, String, PathBuf)> {
        self.custom_name = pack.name.clone();
        self.custom_slots = vec![Slot::default(); NUM_PADS];
        self.active = PackKind::Custom;

        let mut reload = Vec::new();
        for (&index, sound) in &pack.sounds {
            let Some(key) = PadKey::new(index) else { continue };
            let path = sound.path.as_ref().map(PathBuf::from);
            self.custom_slots[key.index()] = Slot { name: sound.name.clone(), path: path.clone(), sample_id: None };
            if let Some(path) = path.filter(|p| p.exists()) {
                reload.push((key, sound.name.clone(), path));
            }
        }
        reload
    }
}

/// The files of the fixed sample pack that are present under `dir`.
pub fn sample_pack_files(dir: &Path) -> Vec<(PadKey, String, PathBuf)> {
    PadKey::all()
        .filter_map(|key| {
            let (name, file) = SAMPLE_PACK[key.index()]?;
            let path = dir.join(file);
            path.exists().then(|| (key, name.to_string(), path))
        })
        .collect()
}

// "my_loop.wav" -> "my_loop", cut to fit on a pad
fn short_label(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };
    stem.chars().take(LABEL_LEN).collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSound {
    pub name: String,
    pub path: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPack {
    pub name: String,
    pub sounds: BTreeMap<u8, SavedSound>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedPacks {
    packs: BTreeMap<String, SavedPack>,
}

impl SavedPacks {
    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packs.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&SavedPack> {
        self.packs.get(name)
    }

    /// Replaces any pack with the same name.
    pub fn insert(&mut self, pack: SavedPack) {
        self.packs.insert(pack.name.clone(), pack);
    }

    pub fn remove(&mut self, name: &str) -> Result<SavedPack, PackError> {
        self.packs.remove(name).ok_or_else(|| PackError::UnknownPack(name.to_string()))
    }

    /// The pack after `current` in name order, wrapping around.
    pub fn next_after(&self, current: Option<&str>) -> Option<&SavedPack> {
        let after = current.and_then(|name| {
            self.packs
                .range::<str, _>((std::ops::Bound::Excluded(name), std::ops::Bound::Unbounded))
                .next()
        });
        after.or_else(|| self.packs.iter().next()).map(|(_, pack)| pack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SampleId;
    use pretty_assertions::assert_eq;

    fn pad(i: u8) -> PadKey {
        PadKey::new(i).unwrap()
    }

    #[test]
    fn drum_machine_labels_and_resolves_every_pad() {
        let bank = PackBank::default();
        assert_eq!(bank.label(pad(0)), "Kick");
        assert_eq!(bank.label(pad(11)), "Perc");
        assert!(PadKey::all().all(|k| bank.resolve(k).is_some()));
    }

    #[test]
    fn sample_pack_needs_loaded_buffers() {
        let mut bank = PackBank::default();
        bank.set_active(PackKind::SamplePack);
        assert!(bank.resolve(pad(0)).is_none());
        assert_eq!(bank.label(pad(0)), "Piano 1");
        assert_eq!(bank.label(pad(10)), "Upload");

        let id = SampleId::next();
        bank.assign(pad(10), "my_great_sample.wav", None, id);
        assert_eq!(bank.label(pad(10)), "my_great_sam");
        assert!(matches!(bank.resolve(pad(10)), Some(AudioCommand::PlaySample { id: got, .. }) if got == id));
    }

    #[test]
    fn clear_slot_only_touches_sample_packs() {
        let mut bank = PackBank::default();
        assert!(!bank.clear_slot(pad(0)));
        bank.set_active(PackKind::Custom);
        bank.assign(pad(1), "snap.wav", None, SampleId::next());
        assert!(bank.clear_slot(pad(1)));
        assert_eq!(bank.label(pad(1)), "Empty");
    }

    #[test]
    fn next_pack_cycles() {
        let mut bank = PackBank::default();
        assert_eq!(bank.next_pack(), PackKind::SamplePack);
        assert_eq!(bank.next_pack(), PackKind::Custom);
        assert_eq!(bank.next_pack(), PackKind::DrumMachine);
    }

    #[test]
    fn saving_needs_a_real_name() {
        let mut bank = PackBank::default();
        assert_eq!(bank.to_saved(), Err(PackError::Unnamed("Custom".into())));
        bank.set_custom_name("  ");
        assert!(bank.to_saved().is_err());
    }

    #[test]
    fn saved_pack_keeps_names_and_paths_only() {
        let mut bank = PackBank::default();
        bank.set_custom_name("Night Set");
        bank.set_active(PackKind::Custom);
        bank.assign(pad(2), "hit.wav", Some(PathBuf::from("/nowhere/hit.wav")), SampleId::next());
        let saved = bank.to_saved().unwrap();
        assert_eq!(saved.name, "Night Set");
        assert_eq!(
            saved.sounds.get(&2),
            Some(&SavedSound { name: "hit.wav".into(), path: Some("/nowhere/hit.wav".into()) })
        );

        let mut fresh = PackBank::default();
        let reload = fresh.apply_saved(&saved);
        assert!(reload.is_empty());
        assert_eq!(fresh.active(), PackKind::Custom);
        assert_eq!(fresh.pack_label(), "Night Set");
        assert_eq!(fresh.label(pad(2)), "hit");
        assert!(fresh.resolve(pad(2)).is_none());
    }

    #[test]
    fn saved_packs_cycle_by_name() {
        let mut packs = SavedPacks::default();
        for name in ["b", "a", "c"] {
            packs.insert(SavedPack { name: name.into(), sounds: BTreeMap::new() });
        }
        assert_eq!(packs.next_after(None).unwrap().name, "a");
        assert_eq!(packs.next_after(Some("a")).unwrap().name, "b");
        assert_eq!(packs.next_after(Some("c")).unwrap().name, "a");
        assert!(packs.remove("zz").is_err());
        packs.remove("b").unwrap();
        assert_eq!(packs.names().collect::<Vec<_>>(), vec!["a", "c"]);
    }
}

// Sole owner of recorded note data. Layers and notes are addressed by position;
// deletes shift everything above down by one, so stale indices must be re-fetched.

use crate::error::{LoopError, Result};

use super::{Layer, Note};

#[derive(Clone, Debug, PartialEq)]
pub struct LayerStore {
    layers: Vec<Layer>,
    total_beats: usize,
}

impl LayerStore {
    pub fn new(total_beats: usize) -> Self {
        Self { layers: Vec::new(), total_beats }
    }

    pub fn total_beats(&self) -> usize {
        self.total_beats
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Every stored note sitting on `beat`, layer by layer.
    pub fn notes_at(&self, beat: usize) -> impl Iterator<Item = &Note> {
        self.layers
            .iter()
            .flat_map(|layer| layer.notes().iter())
            .filter(move |note| note.beat == beat)
    }

    pub fn append_layer(&mut self, layer: Layer) -> Result<usize> {
        if let Some(bad) = layer.notes().iter().find(|n| n.beat >= self.total_beats) {
            return Err(LoopError::BeatOutOfRange { beat: bad.beat, total_beats: self.total_beats });
        }
        self.layers.push(layer);
        Ok(self.layers.len() - 1)
    }

    pub fn delete_layer(&mut self, index: usize) -> Result<Layer> {
        self.check_layer(index)?;
        Ok(self.layers.remove(index))
    }

    pub fn move_note(&mut self, layer: usize, note: usize, new_beat: usize) -> Result<()> {
        if new_beat >= self.total_beats {
            return Err(LoopError::BeatOutOfRange { beat: new_beat, total_beats: self.total_beats });
        }
        self.note_mut(layer, note)?.beat = new_beat;
        Ok(())
    }

    pub fn delete_note(&mut self, layer: usize, note: usize) -> Result<Note> {
        self.note_mut(layer, note)?;
        Ok(self.layers[layer].notes.remove(note))
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    fn check_layer(&self, index: usize) -> Result<()> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(LoopError::LayerOutOfRange { index, len: self.layers.len() })
        }
    }

    fn note_mut(&mut self, layer: usize, note: usize) -> Result<&mut Note> {
        self.check_layer(layer)?;
        let notes = &mut self.layers[layer].notes;
        let len = notes.len();
        notes.get_mut(note).ok_or(LoopError::NoteOutOfRange { layer, note, len })
    }
}

pub use crate::audio::{SampleBuffer, SampleId};

/// The synthesized kit of the drum machine pack, one voice per pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrumKind {
    Kick,
    Snare,
    HiHatClosed,
    HiHatOpen,
    TomLow,
    TomMid,
    TomHigh,
    Clap,
    Cymbal,
    Rim,
    Cowbell,
    Perc,
}

impl DrumKind {
    pub const KIT: [DrumKind; 12] = [
        DrumKind::Kick,
        DrumKind::Snare,
        DrumKind::HiHatClosed,
        DrumKind::HiHatOpen,
        DrumKind::TomLow,
        DrumKind::TomMid,
        DrumKind::TomHigh,
        DrumKind::Clap,
        DrumKind::Cymbal,
        DrumKind::Rim,
        DrumKind::Cowbell,
        DrumKind::Perc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DrumKind::Kick => "Kick",
            DrumKind::Snare => "Snare",
            DrumKind::HiHatClosed => "Hi-Hat Closed",
            DrumKind::HiHatOpen => "Hi-Hat Open",
            DrumKind::TomLow => "Tom Low",
            DrumKind::TomMid => "Tom Mid",
            DrumKind::TomHigh => "Tom High",
            DrumKind::Clap => "Clap",
            DrumKind::Cymbal => "Cymbal",
            DrumKind::Rim => "Rim",
            DrumKind::Cowbell => "Cowbell",
            DrumKind::Perc => "Perc",
        }
    }
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't load files (that would stall the audio thread), so a
    // buffer is decoded up front (see sample_loader.rs) and registered here
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    // ...and later played by id
    PlaySample { id: SampleId, gain: f32 },

    PlayDrum(DrumKind),

    // cut every sounding voice
    Silence,
}

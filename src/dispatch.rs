use crate::audio_api::AudioCommand;
use crate::error::DispatchError;
use crate::packs::PackBank;
use crate::shared::PadKey;

/// Plays the sound bound to a pad. Must not block; failures are the caller's to log.
pub trait SoundDispatch {
    fn trigger(&mut self, key: PadKey) -> Result<(), DispatchError>;
}

impl<F> SoundDispatch for F
where
    F: FnMut(PadKey) -> Result<(), DispatchError>,
{
    fn trigger(&mut self, key: PadKey) -> Result<(), DispatchError> {
        self(key)
    }
}

// resolves pads through the active pack and queues the commands for the audio thread;
// main drains the queue once per frame
pub struct CommandDispatch<'a> {
    bank: &'a PackBank,
    out: &'a mut Vec<AudioCommand>,
}

impl<'a> CommandDispatch<'a> {
    pub fn new(bank: &'a PackBank, out: &'a mut Vec<AudioCommand>) -> Self {
        Self { bank, out }
    }
}

impl SoundDispatch for CommandDispatch<'_> {
    fn trigger(&mut self, key: PadKey) -> Result<(), DispatchError> {
        let cmd = self.bank.resolve(key).ok_or(DispatchError::NoSound(key))?;
        self.out.push(cmd);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_api::DrumKind;
    use crate::packs::PackKind;

    #[test]
    fn drum_machine_always_resolves() {
        let bank = PackBank::default();
        let mut out = Vec::new();
        let key = PadKey::new(0).unwrap();
        CommandDispatch::new(&bank, &mut out).trigger(key).unwrap();
        assert!(matches!(out.as_slice(), [AudioCommand::PlayDrum(DrumKind::Kick)]));
    }

    #[test]
    fn empty_custom_slot_is_no_sound() {
        let mut bank = PackBank::default();
        bank.set_active(PackKind::Custom);
        let mut out = Vec::new();
        let key = PadKey::new(5).unwrap();
        let err = CommandDispatch::new(&bank, &mut out).trigger(key).unwrap_err();
        assert_eq!(err, DispatchError::NoSound(key));
        assert!(out.is_empty());
    }

    #[test]
    fn closures_dispatch() {
        let mut hits = Vec::new();
        let mut dispatch = |key: PadKey| -> Result<(), DispatchError> {
            hits.push(key);
            Ok(())
        };
        dispatch.trigger(PadKey::new(2).unwrap()).unwrap();
        assert_eq!(hits, vec![PadKey::new(2).unwrap()]);
    }
}

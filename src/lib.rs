pub mod audio;
pub mod audio_api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod looper;
pub mod middle;
pub mod packs;
pub mod persistence;
pub mod shared;

pub use dispatch::SoundDispatch;
pub use error::{DispatchError, ErrorKind, LoopError, PackError};
pub use looper::{Layer, LayerSet, LoopSettings, Looper, Note};
pub use middle::Middle;
pub use shared::{InputEvent, PadKey};

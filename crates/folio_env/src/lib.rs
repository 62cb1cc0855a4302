//! Folio Environment
//!
//! Host introspection and device classification for the adaptive background.

pub mod memory;
pub mod probe;
pub mod profile;
pub mod watcher;

pub use probe::{EnvironmentProbe, HostProbe, ProbeReadings, StaticProbe};
pub use profile::{detect, Budget, DeviceProfile};
pub use watcher::ProfileWatcher;

// Shared helpers

pub mod clock;
pub mod constants;
pub mod format;
pub mod storage;

pub use clock::{Clock, SystemClock};
pub use constants::*;
pub use format::*;
pub use storage::{MemoryTokenStore, MirroredTokenStore, StorageError, TokenStore};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalTokenStore;

pub mod format;
pub mod mem;
pub mod traits;

pub use format::{parse_assignment, render_entries, render_entry};
pub use mem::MemStateStore;
pub use traits::StateStore;

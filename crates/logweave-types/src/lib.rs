pub mod entry;
pub mod extract;
pub mod options;
pub mod stats;
pub mod timestamp;

pub use entry::*;
pub use extract::*;
pub use options::*;
pub use stats::*;

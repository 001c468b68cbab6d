pub mod trello;
pub mod snapshot;

pub use trello::*;
pub use snapshot::*;

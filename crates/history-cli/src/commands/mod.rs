//! Command implementations

mod export;
mod list;
mod show;
mod stats;
mod walk;

pub use export::cmd_export;
pub use list::cmd_list;
pub use show::cmd_show;
pub use stats::cmd_stats;
pub use walk::{cmd_walk, WalkArgs};

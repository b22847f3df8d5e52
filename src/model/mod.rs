mod models;
mod table;

pub use models::{RankedUserStats, UserStats};
pub use table::Table;

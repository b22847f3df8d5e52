pub use self::{
    path::get_path,
    types::{ConnectOptions, DBRow, DataBase, PoolOption, PoolType, QueryResult},
};

mod path;
mod types;
mod user_stats;

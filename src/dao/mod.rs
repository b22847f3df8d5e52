mod sqlite;

pub use sqlite::{
    get_path, ConnectOptions, DBRow, DataBase, PoolOption, PoolType,
    QueryResult,
};

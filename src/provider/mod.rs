pub use self::{
    database::DatabasePool,
    http::{BridgeApi, HTTP},
};

mod database;
mod http;

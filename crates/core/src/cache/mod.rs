//! Read model cache - typed keys, freshness policy, and the shared cache.

mod query_config;
mod query_key;
mod read_model_cache;


pub use query_config::QueryConfig;
pub use query_key::{QueryKey, QueryValue};
pub use read_model_cache::{EntryState, ReadModelCache};

pub(crate) use read_model_cache::unexpected_value;

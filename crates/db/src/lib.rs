pub mod connection;
pub mod indexes;
pub mod models;

pub use connection::connect;
pub use indexes::ensure_indexes;

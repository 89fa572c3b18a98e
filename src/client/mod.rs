//! Backend clients - one per workflow
//!
//! Each client owns no state beyond its transport handle. Every operation is a
//! single suspension point and converts transport failures into a displayable
//! outcome instead of returning an error.

pub mod connection;
pub mod ingestion;
pub mod query;

pub use connection::ConnectionClient;
pub use ingestion::IngestionClient;
pub use query::QueryClient;

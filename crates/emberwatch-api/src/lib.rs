// emberwatch-api: Async Rust client for the Firestore document store and the
// Realtime Database key-value feed.

pub mod document_store;
pub mod error;
pub mod realtime;
pub mod transport;

pub use document_store::{Document, DocumentStoreClient, Fields, MapValue, NullValue, Value};
pub use error::Error;
pub use realtime::RealtimeClient;
pub use transport::TransportConfig;

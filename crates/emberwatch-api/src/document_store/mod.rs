// Firestore REST (v1) document store client.
//
// `models` holds the typed-value wire encoding; `client` wraps reqwest with
// project-scoped URL construction and Google error envelope unwrapping.

mod client;
mod models;

pub use client::DocumentStoreClient;
pub use models::{Document, Fields, MapValue, NullValue, Value};

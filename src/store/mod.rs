//! Record service boundary
//!
//! - `engine.rs` - `RecordStore` trait and wire envelope types
//! - `memory.rs` - in-process implementation with fault injection
//! - `http.rs` - client for the hosted service

mod engine;
mod http;
mod memory;

pub use engine::{
    DeleteRequest, FetchQuery, FieldName, FieldSelector, RecordBatch, RecordResult, RecordStore,
    StoreResponse,
};
pub use self::http::{HttpRecordStore, PROJECT_HEADER, PUBLIC_KEY_HEADER};
pub use memory::{FaultMode, MemoryRecordStore};

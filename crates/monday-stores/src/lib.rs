//! Token & Meeting Stores (C4): durable key-value stores over local
//! `rusqlite` files in WAL mode.

pub mod db;
pub mod error;
pub mod manager;
pub mod types;

pub use error::StoreError;
pub use manager::{MeetingStore, TokenStore};
pub use types::{MeetingRecord, MeetingStatus, TokenRecord};

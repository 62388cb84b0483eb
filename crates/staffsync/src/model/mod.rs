//! Domain records stored in the remote record store.

pub mod application;
pub mod client;
pub mod index;
pub mod registration;

pub use application::JobApplication;
pub use client::Client;
pub use index::{FlatIndexRecord, ReverseIndexEntry};
pub use registration::{ManagerRef, Priority, Registration, RegistrationKey, ServiceKind};

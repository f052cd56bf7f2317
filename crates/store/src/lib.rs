pub mod account;
pub mod json_store;
pub mod repositories;

pub use account::{Account, EntityKind, LastPulledDates};
pub use json_store::JsonFileStore;
pub use repositories::AccountStore;

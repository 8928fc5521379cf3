pub mod fixtures;
pub mod locks;
pub mod sessions;

pub use fixtures::{
    offer_catalog, offer_rate, rate_slabs, CustomerDataset, FixtureGateways, RateSlab,
};
pub use locks::SessionLocks;
pub use sessions::{InMemorySessionStore, SessionStore, StoreError};

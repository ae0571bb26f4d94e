//! Mock storage implementations for testing.
//!
//! Both mocks evaluate pipeline queries in memory with the same predicate
//! and ordering rules the real backends translate, and can be told to fail
//! to simulate an unavailable store.

mod catalog;
mod legacy;

pub use catalog::MockCatalogStore;
pub use legacy::MockLegacyStore;

#[cfg(test)]
mod tests;

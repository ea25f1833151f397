//! Non-persistent store implementations

mod memory;

pub use memory::{
    InMemoryFleetTransaction, InMemoryRepositoryProvider, InMemoryScooterRepository,
    InMemoryUserRepository,
};

//! Synchronization integration tests.

mod controller;
mod state;
mod support;

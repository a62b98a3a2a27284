//! The application layer: shared state, commands, and the events they emit.

pub mod commands;
pub mod confirm;
pub mod events;
pub mod export;
pub mod helpers;
pub mod proxy;
pub mod state;
pub mod tasks;

//! Domain layer - Core business objects with no external dependencies
//! 
//! This layer contains:
//! - Entities: Messages, events and users the bot sees
//! - Traits: Abstractions for platform adapters

pub mod entities;
pub mod traits;

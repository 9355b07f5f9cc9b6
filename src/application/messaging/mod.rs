//! Message handling - Event-driven message processing

pub mod context;
pub mod dispatcher;
pub mod parser;

pub use context::{Context, Handler, HandlerResult, Trigger};
pub use dispatcher::MessageDispatcher;
pub use parser::{Input, MessageParser};

//! Chat side of the relay: one upstream session at a time, plus the
//! formatter that turns its chat lines into display markup.

pub mod backoff;
pub mod format;
pub mod relay;
pub mod session;
pub mod state;

pub use format::Formatter;
pub use relay::ChatRelay;

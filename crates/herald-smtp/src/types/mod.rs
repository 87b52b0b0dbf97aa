//! Core SMTP types.

mod reply;

pub use reply::{NO_RESPONSE, Reply, ReplyCode};

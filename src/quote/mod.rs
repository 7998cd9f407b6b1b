// src/quote/mod.rs
//! Quote lifecycle: debounced fetch, 5 second validity, countdown and expiry

mod lifecycle;
mod manager;
mod types;

pub use lifecycle::{QuoteLifecycle, QuoteState, QuoteTicket, QuoteUpdate};
pub use manager::QuoteManager;
pub use types::*;

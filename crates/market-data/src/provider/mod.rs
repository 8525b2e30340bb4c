//! Quote provider abstraction and the Yahoo Finance implementation.
//!
//! The rest of the crate only knows about [`QuoteProvider`]; the concrete
//! provider is chosen when the service is built.

mod traits;

pub mod yahoo;

pub use traits::QuoteProvider;

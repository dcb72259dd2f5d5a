//! DID method implementations.

mod errors;
mod key;
mod web;

pub use errors::DidMethodError;
pub use key::DidKeyMethod;
pub use web::DidWebResolver;

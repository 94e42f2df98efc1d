//! bsvrates Common Types
//!
//! Shared types for the bsvrates workspace: currencies, rate providers,
//! satoshi amounts and the fixed-point conversion engine.

pub mod conversion;
pub mod currency;
pub mod error;
pub mod monetary;
pub mod provider;

pub use conversion::*;
pub use currency::*;
pub use error::*;
pub use monetary::*;
pub use provider::*;

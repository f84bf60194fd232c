//! # minifence-adapter-virtual
//!
//! Virtual/demo adapter for testing and demonstration purposes.
//!
//! ## Provided components
//!
//! | Component | Port | Behaviour |
//! |-----------|------|-----------|
//! | [`VirtualLocationProvider`] | `LocationProvider` | Returns whatever position was last set by hand |
//! | [`LoggingActionExecutor`] | `ActionExecutor` | Logs each action and keeps a record of it |
//!
//! ## Dependency rule
//!
//! Depends on `minifence-app` (port traits) and `minifence-domain` only.

mod executor;
mod location;

pub use executor::{ExecutedAction, LoggingActionExecutor};
pub use location::VirtualLocationProvider;

//! # minifence-app
//!
//! Application layer — the rule-evaluation loop and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `LocationProvider` — last known position, never blocking
//!   - `Clock` — wall-clock time
//!   - `ActionExecutor` — side effects of a fired rule
//!   - `EventPublisher` — publish domain events
//! - Drive the **rule engine**: poll every enabled rule's trigger, run the
//!   actions of the ones that fire, and advance their debounce clock
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `minifence-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod rule_engine;

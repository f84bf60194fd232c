//! # minifence-domain
//!
//! Pure domain model for the minifence rule engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Parameters** (bounded, user-editable values with display metadata)
//! - Define **Triggers** (conditions evaluated against time and position)
//!   and the type-tagged JSON envelope they persist as
//! - Define the **Trigger registry** that turns an envelope back into the
//!   right variant
//! - Define **Rules** (trigger tree → actions) and **Events**
//! - Describe the edit form handed to a rendering layer
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod form;
pub mod geo;
pub mod i18n;
pub mod parameter;
pub mod rule;
pub mod trigger;

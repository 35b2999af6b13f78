//! # plantrigger-domain
//!
//! Pure domain model for the experiment plan trigger engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Decimal-safe numerics for threshold and interval decisions ([`numeric`])
//! - Define **Trigger definitions** (name + condition kind + payload)
//! - Define **Conditions** (the per-kind evaluation state machines)
//! - Define **Trigger events** (the record of one firing)
//! - Define **Payloads** (opaque units of scientific work)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or an async runtime.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod numeric;
pub mod time;

pub mod event;
pub mod payload;
pub mod trigger;

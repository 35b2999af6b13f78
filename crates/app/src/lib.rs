//! # plantrigger-app
//!
//! Application layer — the trigger engine and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** for the collaborators the engine depends on:
//!   - `SignalSource` / `SignalListener` — the sample environment variable
//!     and its push callback
//!   - `PlanRegistrar` — told when a trigger fires and when handling completes
//!   - `PayloadDispatcher` — executes payloads
//! - Provide the **trigger engine** (`Trigger`): enable/disable lifecycle,
//!   serialized signal intake, single-worker asynchronous payload dispatch
//!
//! ## Dependency rule
//! Depends on `plantrigger-domain` only (plus `tokio` for the worker task and
//! its queue). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

mod dispatch_worker;
pub mod ports;
pub mod trigger_engine;

pub use trigger_engine::{SignalOutcome, Trigger};

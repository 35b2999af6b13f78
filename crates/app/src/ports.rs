//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the trigger engine and the outside world.
//! They are defined here (in `app`) so that both the engine and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod payload_dispatcher;
pub mod plan_registrar;
pub mod signal_source;

pub use payload_dispatcher::PayloadDispatcher;
pub use plan_registrar::PlanRegistrar;
pub use signal_source::{SignalListener, SignalSource};

//! # plantrigger-adapter-virtual
//!
//! In-memory implementations of the engine's ports, for demonstration and
//! end-to-end tests.
//!
//! ## Provided adapters
//!
//! | Adapter | Port | Behaviour |
//! |---------|------|-----------|
//! | [`VirtualSignal`] | `SignalSource` | Holds a value; `set` pushes it to listeners |
//! | [`SignalRamp`] | – | Steps a `VirtualSignal` on a timer |
//! | [`RecordingRegistrar`] | `PlanRegistrar` | Records and logs notifications |
//! | [`SimulatedDispatcher`] | `PayloadDispatcher` | Sleeps, then succeeds or fails by payload kind |
//!
//! ## Dependency rule
//!
//! Depends on `plantrigger-app` (port traits) and `plantrigger-domain` only.

mod dispatcher;
mod ramp;
mod registrar;
mod signal;

pub use dispatcher::SimulatedDispatcher;
pub use ramp::SignalRamp;
pub use registrar::{Record, RecordingRegistrar};
pub use signal::VirtualSignal;

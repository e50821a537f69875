//! Simulated SCPI instruments for testing instrument-control code without
//! physical hardware.
//!
//! This crate provides a text-command dispatch engine that emulates the
//! request/response contract of instruments speaking the SCPI protocol.
//! Callers submit a command string; the engine matches it against the
//! instrument's registered regex patterns, coerces captured groups to the
//! handler's declared argument types, applies any configured artificial
//! latency, and returns the handler's reply as text.
//!
//! # Defining an instrument
//!
//! An instrument is an ordinary struct plus a shared command table:
//!
//! ```
//! use once_cell::sync::Lazy;
//! use scpi_mock::{CommandSet, Mocker};
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct Dmm {
//!     range: f64,
//!     call_delay: Duration,
//! }
//!
//! impl Dmm {
//!     fn write_range(&mut self, value: f64) {
//!         self.range = value;
//!     }
//!
//!     fn read_range(&mut self) -> f64 {
//!         self.range
//!     }
//! }
//!
//! static DMM_COMMANDS: Lazy<CommandSet<Dmm>> = Lazy::new(|| {
//!     CommandSet::define(|commands| {
//!         commands.command(r":RANGE (.*)", Dmm::write_range)?;
//!         commands.command(r":RANGE\?", Dmm::read_range)?;
//!         Ok(())
//!     })
//!     .expect("dmm command table is well formed")
//! });
//!
//! impl Mocker for Dmm {
//!     fn commands() -> &'static CommandSet<Self> {
//!         &DMM_COMMANDS
//!     }
//!
//!     fn call_delay(&self) -> Duration {
//!         self.call_delay
//!     }
//!
//!     fn call_delay_mut(&mut self) -> &mut Duration {
//!         &mut self.call_delay
//!     }
//! }
//!
//! let mut dmm = Dmm::default();
//! dmm.send(":RANGE 10").unwrap();
//! assert_eq!(dmm.send(":RANGE?").unwrap(), "10.0");
//! ```
//!
//! # Submodules
//!
//! A handler that resolves a nested instrument registers through
//! [`CommandSetBuilder::submodule`]; the nested table is flattened into the
//! outer one by pattern concatenation, to any depth. See
//! [`instruments::ChannelBank`] and [`instruments::SourceRack`] for a worked
//! two- and three-level example.
//!
//! # Latency
//!
//! Every instrument carries an instance-level turnaround delay (zero by
//! default), and individual commands can be given an override through
//! [`Mocker::set_call_delay`]. Delays block the calling thread, the way a real
//! instrument stalls its bus.
//!
//! # Shipped instruments
//!
//! The [`instruments`] module provides ready-made simulated devices:
//! voltage sources ([`instruments::VoltageSource`],
//! [`instruments::AmplifiedVoltageSource`]), submodule-composed variants
//! ([`instruments::ChannelBank`], [`instruments::SourceRack`]), and a power
//! meter with a seeded noise model ([`instruments::SimulatedPowerMeter`]).

pub mod error;
pub mod handler;
pub mod instruments;
pub mod mocker;
pub mod registry;
pub mod value;

pub use error::{MockError, MockResult};
pub use handler::{HandlerSpec, IntoCommandHandler, IntoSubmoduleAccessor, Signature};
pub use mocker::Mocker;
pub use registry::{CommandSet, CommandSetBuilder};
pub use value::{ArgType, ReplyType, ScpiArg, ScpiReply, ScpiValue};

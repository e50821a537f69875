//! Ready-made simulated instruments.
//!
//! These devices exist so that instrument-control code has something realistic
//! to talk to without hardware on the bench:
//!
//! - [`VoltageSource`] - multi-channel voltage source, flat command table
//! - [`AmplifiedVoltageSource`] - voltage source whose readback applies a gain
//! - [`SourceChannel`] / [`ChannelBank`] / [`SourceRack`] - the same source
//!   built from nested submodules, two and three levels deep
//! - [`SimulatedPowerMeter`] - optical power meter with a seeded noise model
//!   and serde-deserializable configuration
//!
//! Each instrument owns its state fields and an instance-level call delay; the
//! command tables are shared per type, so per-command delays configured on one
//! instance are seen by all of them.

mod channel_bank;
mod noise;
mod power_meter;
mod voltage_source;

pub use channel_bank::{ChannelBank, SourceChannel, SourceRack};
pub use noise::NoiseSource;
pub use power_meter::{PowerMeterConfig, SimulatedPowerMeter};
pub use voltage_source::{AmplifiedVoltageSource, VoltageSource};

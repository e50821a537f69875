//! Multi-channel voltage sources with a flat command table.

use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::mocker::Mocker;
use crate::registry::CommandSet;

static VOLTAGE_SOURCE_COMMANDS: Lazy<CommandSet<VoltageSource>> = Lazy::new(|| {
    CommandSet::define(|commands| {
        commands.command(
            r":INSTR:CHANNEL(\d+):VOLT (.*)",
            VoltageSource::write_voltage,
        )?;
        commands.command(r":INSTR:CHANNEL(\d+):VOLT\?", VoltageSource::read_voltage)?;
        Ok(())
    })
    .expect("voltage source command table is well formed")
});

/// Simulated multi-channel voltage source.
///
/// Channels spring into existence on first write; unwritten channels read back
/// as zero.
///
/// ```
/// use scpi_mock::instruments::VoltageSource;
/// use scpi_mock::Mocker;
///
/// let mut source = VoltageSource::new();
/// source.send(":INSTR:CHANNEL1:VOLT 12").unwrap();
/// assert_eq!(source.send(":INSTR:CHANNEL1:VOLT?").unwrap(), "12.0");
/// ```
#[derive(Debug, Default)]
pub struct VoltageSource {
    voltages: HashMap<i64, f64>,
    call_delay: Duration,
}

impl VoltageSource {
    /// Create a source with all channels at zero volts.
    pub fn new() -> Self {
        Self::default()
    }

    fn write_voltage(&mut self, channel: i64, value: f64) {
        self.voltages.insert(channel, value);
    }

    fn read_voltage(&mut self, channel: i64) -> f64 {
        self.voltages.get(&channel).copied().unwrap_or(0.0)
    }
}

impl Mocker for VoltageSource {
    fn commands() -> &'static CommandSet<Self> {
        &VOLTAGE_SOURCE_COMMANDS
    }

    fn call_delay(&self) -> Duration {
        self.call_delay
    }

    fn call_delay_mut(&mut self) -> &mut Duration {
        &mut self.call_delay
    }
}

static AMPLIFIED_SOURCE_COMMANDS: Lazy<CommandSet<AmplifiedVoltageSource>> = Lazy::new(|| {
    CommandSet::define(|commands| {
        commands.command(
            r":INSTR:CHANNEL(\d+):VOLT (.*)",
            AmplifiedVoltageSource::write_voltage,
        )?;
        commands.command(
            r":INSTR:CHANNEL(\d+):VOLT\?",
            AmplifiedVoltageSource::read_voltage,
        )?;
        Ok(())
    })
    .expect("amplified voltage source command table is well formed")
});

/// Voltage source whose readback applies an output gain.
///
/// Setpoints are stored as written; reads report `gain * setpoint`, the way an
/// instrument with an output amplifier stage would.
#[derive(Debug)]
pub struct AmplifiedVoltageSource {
    voltages: HashMap<i64, f64>,
    gain: f64,
    call_delay: Duration,
}

impl AmplifiedVoltageSource {
    /// Create a source with the default 2x output gain.
    pub fn new() -> Self {
        Self::with_gain(2.0)
    }

    /// Create a source with a specific output gain.
    pub fn with_gain(gain: f64) -> Self {
        Self {
            voltages: HashMap::new(),
            gain,
            call_delay: Duration::ZERO,
        }
    }

    fn write_voltage(&mut self, channel: i64, value: f64) {
        self.voltages.insert(channel, value);
    }

    fn read_voltage(&mut self, channel: i64) -> f64 {
        self.gain * self.voltages.get(&channel).copied().unwrap_or(0.0)
    }
}

impl Default for AmplifiedVoltageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Mocker for AmplifiedVoltageSource {
    fn commands() -> &'static CommandSet<Self> {
        &AMPLIFIED_SOURCE_COMMANDS
    }

    fn call_delay(&self) -> Duration {
        self.call_delay
    }

    fn call_delay_mut(&mut self) -> &mut Duration {
        &mut self.call_delay
    }
}

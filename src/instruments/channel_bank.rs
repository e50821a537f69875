//! The same voltage source built from nested submodules.
//!
//! [`SourceChannel`] is a complete single-channel instrument in its own right.
//! [`ChannelBank`] exposes two of them under `:CHANNELn` prefixes by
//! registering the channel as a submodule, and [`SourceRack`] stacks a third
//! level on top — its command table is the bank's, flattened again under
//! `:INSTn`. No level knows how deep it sits: composition is just pattern
//! concatenation plus accessor chaining.

use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::error::MockError;
use crate::mocker::Mocker;
use crate::registry::CommandSet;

static SOURCE_CHANNEL_COMMANDS: Lazy<CommandSet<SourceChannel>> = Lazy::new(|| {
    CommandSet::define(|commands| {
        commands.command(r":VOLT (.*)", SourceChannel::write_voltage)?;
        commands.command(r":VOLT\?", SourceChannel::read_voltage)?;
        Ok(())
    })
    .expect("source channel command table is well formed")
});

/// One output channel of a segmented voltage source.
#[derive(Debug, Default)]
pub struct SourceChannel {
    voltage: f64,
    call_delay: Duration,
}

impl SourceChannel {
    /// Create a channel at zero volts.
    pub fn new() -> Self {
        Self::default()
    }

    fn write_voltage(&mut self, value: f64) {
        self.voltage = value;
    }

    fn read_voltage(&mut self) -> f64 {
        self.voltage
    }
}

impl Mocker for SourceChannel {
    fn commands() -> &'static CommandSet<Self> {
        &SOURCE_CHANNEL_COMMANDS
    }

    fn call_delay(&self) -> Duration {
        self.call_delay
    }

    fn call_delay_mut(&mut self) -> &mut Duration {
        &mut self.call_delay
    }
}

static CHANNEL_BANK_COMMANDS: Lazy<CommandSet<ChannelBank>> = Lazy::new(|| {
    CommandSet::define(|commands| {
        commands.submodule(r":CHANNEL(\d+)", ChannelBank::channel)?;
        Ok(())
    })
    .expect("channel bank command table is well formed")
});

/// Two-channel voltage source addressed through `:CHANNELn` prefixes.
#[derive(Debug)]
pub struct ChannelBank {
    channels: HashMap<i64, SourceChannel>,
    call_delay: Duration,
}

impl ChannelBank {
    /// Create a bank with channels 1 and 2.
    pub fn new() -> Self {
        let mut channels = HashMap::new();
        channels.insert(1, SourceChannel::new());
        channels.insert(2, SourceChannel::new());
        Self {
            channels,
            call_delay: Duration::ZERO,
        }
    }

    fn channel(&mut self, index: i64) -> Result<&mut SourceChannel, MockError> {
        self.channels
            .get_mut(&index)
            .ok_or_else(|| MockError::Instrument(format!("no channel {index}")))
    }
}

impl Default for ChannelBank {
    fn default() -> Self {
        Self::new()
    }
}

impl Mocker for ChannelBank {
    fn commands() -> &'static CommandSet<Self> {
        &CHANNEL_BANK_COMMANDS
    }

    fn call_delay(&self) -> Duration {
        self.call_delay
    }

    fn call_delay_mut(&mut self) -> &mut Duration {
        &mut self.call_delay
    }
}

static SOURCE_RACK_COMMANDS: Lazy<CommandSet<SourceRack>> = Lazy::new(|| {
    CommandSet::define(|commands| {
        commands.submodule(r":INST(\d+)", SourceRack::slot)?;
        Ok(())
    })
    .expect("source rack command table is well formed")
});

/// A rack of two channel banks, three pattern levels deep.
#[derive(Debug)]
pub struct SourceRack {
    slots: HashMap<i64, ChannelBank>,
    call_delay: Duration,
}

impl SourceRack {
    /// Create a rack with banks in slots 1 and 2.
    pub fn new() -> Self {
        let mut slots = HashMap::new();
        slots.insert(1, ChannelBank::new());
        slots.insert(2, ChannelBank::new());
        Self {
            slots,
            call_delay: Duration::ZERO,
        }
    }

    fn slot(&mut self, index: i64) -> Result<&mut ChannelBank, MockError> {
        self.slots
            .get_mut(&index)
            .ok_or_else(|| MockError::Instrument(format!("no instrument in slot {index}")))
    }
}

impl Default for SourceRack {
    fn default() -> Self {
        Self::new()
    }
}

impl Mocker for SourceRack {
    fn commands() -> &'static CommandSet<Self> {
        &SOURCE_RACK_COMMANDS
    }

    fn call_delay(&self) -> Duration {
        self.call_delay
    }

    fn call_delay_mut(&mut self) -> &mut Duration {
        &mut self.call_delay
    }
}

//! Simulated optical power meter.
//!
//! Answers the usual query set of a bench power meter: identity, a power
//! reading with configurable measurement noise, and wavelength calibration.
//! The noise is drawn from a seeded generator, so tests that pin the seed get
//! reproducible readings.

use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;

use super::noise::NoiseSource;
use crate::error::MockError;
use crate::mocker::Mocker;
use crate::registry::CommandSet;

fn default_base_power() -> f64 {
    1.0
}

fn default_noise() -> f64 {
    0.01
}

/// Configuration for the simulated power meter.
#[derive(Debug, Clone, Deserialize)]
pub struct PowerMeterConfig {
    /// Base power reading in Watts (default: 1.0).
    #[serde(default = "default_base_power")]
    pub base_power: f64,
    /// Relative noise magnitude on readings (default: 1%).
    #[serde(default = "default_noise")]
    pub noise: f64,
    /// Seed for the noise generator; absent means seeded from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PowerMeterConfig {
    fn default() -> Self {
        Self {
            base_power: 1.0,
            noise: 0.01,
            seed: None,
        }
    }
}

static POWER_METER_COMMANDS: Lazy<CommandSet<SimulatedPowerMeter>> = Lazy::new(|| {
    CommandSet::define(|commands| {
        commands.command(r"\*IDN\?", SimulatedPowerMeter::identify)?;
        commands.command(r":POW\?", SimulatedPowerMeter::read_power)?;
        commands.command(r":WAV (.*)", SimulatedPowerMeter::write_wavelength)?;
        commands.command(r":WAV\?", SimulatedPowerMeter::read_wavelength)?;
        Ok(())
    })
    .expect("power meter command table is well formed")
});

/// Simulated optical power meter with a seeded noise model.
#[derive(Debug)]
pub struct SimulatedPowerMeter {
    base_power: f64,
    noise: f64,
    wavelength_nm: f64,
    rng: NoiseSource,
    call_delay: Duration,
}

impl SimulatedPowerMeter {
    /// Create a meter with the given base power and default noise.
    pub fn new(base_power: f64) -> Self {
        Self::from_config(PowerMeterConfig {
            base_power,
            ..PowerMeterConfig::default()
        })
    }

    /// Create a meter from a configuration.
    pub fn from_config(config: PowerMeterConfig) -> Self {
        Self {
            base_power: config.base_power,
            noise: config.noise,
            wavelength_nm: 800.0,
            rng: NoiseSource::new(config.seed),
            call_delay: Duration::ZERO,
        }
    }

    /// Create a meter from a TOML configuration value.
    pub fn from_toml(value: toml::Value) -> Result<Self, MockError> {
        let config: PowerMeterConfig = value.try_into()?;
        Ok(Self::from_config(config))
    }

    fn identify(&mut self) -> String {
        "Mock Instruments,PM-100,0,0.1".to_string()
    }

    fn read_power(&mut self) -> f64 {
        self.base_power * (1.0 + self.rng.jitter(self.noise))
    }

    fn write_wavelength(&mut self, nm: f64) {
        self.wavelength_nm = nm.clamp(300.0, 1100.0);
    }

    fn read_wavelength(&mut self) -> f64 {
        self.wavelength_nm
    }
}

impl Default for SimulatedPowerMeter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Mocker for SimulatedPowerMeter {
    fn commands() -> &'static CommandSet<Self> {
        &POWER_METER_COMMANDS
    }

    fn call_delay(&self) -> Duration {
        self.call_delay
    }

    fn call_delay_mut(&mut self) -> &mut Duration {
        &mut self.call_delay
    }
}

//! Command tables: pattern-to-handler registries built once per instrument type.
//!
//! A [`CommandSet`] is assembled in two phases, the way an instrument defines
//! its command surface: registrations are collected on a [`CommandSetBuilder`],
//! then frozen with [`CommandSetBuilder::finish`]. The frozen table is meant to
//! live in a `once_cell::sync::Lazy` static and be shared by every instance of
//! the instrument type; only per-entry latency overrides stay mutable after the
//! freeze.
//!
//! Submodule registrations are flattened at build time: for every entry already
//! finalized in the submodule's own table, a concatenated-pattern entry is
//! inserted into the outer table, with the accessor and the inner handler
//! chained into a single callable. Touching the submodule's `Lazy` static forces
//! its table to finish first, so nesting order takes care of itself; mutually
//! recursive submodules are a definition error and will hang the initializer.

use std::time::Duration;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::MockError;
use crate::handler::{combine, HandlerSpec, IntoCommandHandler, IntoSubmoduleAccessor};
use crate::mocker::Mocker;

struct Entry<S> {
    pattern: String,
    regex: Regex,
    spec: HandlerSpec<S>,
}

/// Frozen pattern-to-handler table shared by every instance of one instrument
/// type.
pub struct CommandSet<S> {
    entries: Vec<Entry<S>>,
}

impl<S: 'static> CommandSet<S> {
    /// Start collecting registrations for a new command set.
    pub fn builder() -> CommandSetBuilder<S> {
        CommandSetBuilder::new()
    }

    /// Build a command set from a registration closure.
    ///
    /// Convenience wrapper for the common `Lazy` static shape:
    ///
    /// ```rust,ignore
    /// static COMMANDS: Lazy<CommandSet<VoltageSource>> = Lazy::new(|| {
    ///     CommandSet::define(|commands| {
    ///         commands.command(r":VOLT (.*)", VoltageSource::write_voltage)?;
    ///         commands.command(r":VOLT\?", VoltageSource::read_voltage)?;
    ///         Ok(())
    ///     })
    ///     .expect("voltage source command table is well formed")
    /// });
    /// ```
    pub fn define(
        register: impl FnOnce(&mut CommandSetBuilder<S>) -> Result<(), MockError>,
    ) -> Result<Self, MockError> {
        let mut builder = CommandSetBuilder::new();
        register(&mut builder)?;
        Ok(builder.finish())
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered pattern strings, in declaration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.pattern.as_str())
    }

    /// The latency override currently set on the handler registered under
    /// exactly `pattern`.
    pub fn delay_override(&self, pattern: &str) -> Result<Option<Duration>, MockError> {
        self.entry(pattern).map(|entry| entry.spec.delay())
    }

    pub(crate) fn set_pattern_delay(
        &self,
        pattern: &str,
        delay: Duration,
    ) -> Result<(), MockError> {
        let entry = self.entry(pattern)?;
        debug!(pattern, ?delay, "setting per-command delay");
        entry.spec.set_delay(Some(delay));
        Ok(())
    }

    fn entry(&self, pattern: &str) -> Result<&Entry<S>, MockError> {
        self.entries
            .iter()
            .find(|entry| entry.pattern == pattern)
            .ok_or_else(|| MockError::UnknownPattern {
                pattern: pattern.to_string(),
            })
    }

    /// Match, coerce, delay, invoke.
    ///
    /// Patterns are searched as substrings, not anchored matches, and a command
    /// must match at most one of them: a second match aborts the dispatch before
    /// any handler runs. Coercion also happens before the handler is invoked, so
    /// a failed dispatch leaves instrument state untouched.
    pub(crate) fn dispatch(&self, instrument: &mut S, command: &str) -> Result<String, MockError>
    where
        S: Mocker,
    {
        let mut matched: Option<(&Entry<S>, regex::Captures<'_>)> = None;
        for entry in &self.entries {
            if let Some(captures) = entry.regex.captures(command) {
                if matched.is_some() {
                    return Err(MockError::Ambiguous {
                        command: command.to_string(),
                    });
                }
                matched = Some((entry, captures));
            }
        }

        let (entry, captures) = matched.ok_or_else(|| MockError::UnknownCommand {
            command: command.to_string(),
        })?;
        trace!(command, pattern = %entry.pattern, "dispatching command");

        let values = entry.spec.signature().coerce(&captures)?;

        let delay = entry
            .spec
            .delay()
            .unwrap_or_else(|| instrument.call_delay());
        if !delay.is_zero() {
            debug!(command, ?delay, "simulating instrument turnaround");
            std::thread::sleep(delay);
        }

        let reply = entry.spec.invoke(instrument, &values)?;
        Ok(reply.map(|value| value.to_string()).unwrap_or_default())
    }
}

impl<S> std::fmt::Debug for CommandSet<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| &entry.pattern))
            .finish()
    }
}

/// Staging table for command registrations, frozen into a [`CommandSet`] with
/// [`finish`](CommandSetBuilder::finish).
pub struct CommandSetBuilder<S> {
    entries: Vec<Entry<S>>,
}

impl<S: 'static> CommandSetBuilder<S> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a leaf command handler under `pattern`.
    ///
    /// The pattern must be a valid regex whose capture-group count equals the
    /// handler's argument count. Registering a pattern string that is already
    /// present replaces the earlier handler in place.
    pub fn command<F, Args>(&mut self, pattern: &str, handler: F) -> Result<(), MockError>
    where
        F: IntoCommandHandler<S, Args>,
    {
        self.insert(pattern.to_string(), handler.into_spec())
    }

    /// Register a submodule under `pattern`.
    ///
    /// For every entry in `Sub`'s finished command set, inserts an entry whose
    /// pattern is `pattern` followed by the sub-pattern, and whose handler
    /// chains the accessor with the sub-handler. An empty submodule table adds
    /// nothing.
    pub fn submodule<Sub, F, Args>(&mut self, pattern: &str, accessor: F) -> Result<(), MockError>
    where
        Sub: Mocker,
        F: IntoSubmoduleAccessor<S, Sub, Args>,
    {
        let (accessor, accessor_args) = accessor.into_accessor();

        // Validate the prefix on its own so mistakes point at the registration
        // that made them, not at a concatenated pattern.
        let prefix = Regex::new(pattern).map_err(|source| MockError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let captured = prefix.captures_len() - 1;
        if captured != accessor_args.len() {
            return Err(MockError::Signature {
                pattern: pattern.to_string(),
                declared: accessor_args.len(),
                captured,
            });
        }

        for sub_entry in &Sub::commands().entries {
            let combined_pattern = format!("{pattern}{}", sub_entry.pattern);
            let spec = combine(accessor.clone(), accessor_args.clone(), &sub_entry.spec);
            self.insert(combined_pattern, spec)?;
        }
        Ok(())
    }

    fn insert(&mut self, pattern: String, spec: HandlerSpec<S>) -> Result<(), MockError> {
        let regex = Regex::new(&pattern).map_err(|source| MockError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        let captured = regex.captures_len() - 1;
        let declared = spec.signature().args.len();
        if captured != declared {
            return Err(MockError::Signature {
                pattern,
                declared,
                captured,
            });
        }

        trace!(%pattern, ?declared, "registering command");
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|entry| entry.pattern == pattern)
        {
            existing.spec = spec;
        } else {
            self.entries.push(Entry {
                pattern,
                regex,
                spec,
            });
        }
        Ok(())
    }

    /// Freeze the staging table into an immutable command set.
    pub fn finish(self) -> CommandSet<S> {
        CommandSet {
            entries: self.entries,
        }
    }
}

impl<S: 'static> Default for CommandSetBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

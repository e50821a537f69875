//! Error types for the mock instrument engine.
//!
//! `MockError` consolidates everything that can go wrong across the lifetime of a
//! simulated instrument, from command registration to dispatch:
//!
//! - **Registration errors** (`Pattern`, `Signature`) are definition bugs in an
//!   instrument's command table. They are fatal to the registration that raised
//!   them and cannot be recovered from at run time.
//! - **Dispatch errors** (`Ambiguous`, `UnknownCommand`, `Coercion`) surface to
//!   the caller of `send` exactly as a real instrument would reject a malformed
//!   request. A failed dispatch never leaves partially-applied state behind.
//! - **Configuration errors** (`UnknownPattern`, `Config`) come from the latency
//!   and instrument-construction entry points.
//! - **`Instrument`** carries failures raised inside handlers themselves, such as
//!   a submodule accessor addressing a channel that does not exist.
//!
//! All errors propagate synchronously with `?`; nothing is logged-and-swallowed
//! and nothing is retried.

use thiserror::Error;

/// Convenience alias for results using the engine error type.
pub type MockResult<T> = std::result::Result<T, MockError>;

/// Primary error type for the mock instrument engine.
#[derive(Error, Debug)]
pub enum MockError {
    /// A registered command pattern is not a valid regular expression.
    #[error("invalid command pattern '{pattern}': {source}")]
    Pattern {
        /// The offending pattern string as registered.
        pattern: String,
        /// The underlying regex parse error.
        #[source]
        source: regex::Error,
    },

    /// A handler's declared argument count does not match the capture groups of
    /// the pattern it was registered under.
    #[error(
        "handler for pattern '{pattern}' takes {declared} argument(s) \
         but the pattern captures {captured} group(s)"
    )]
    Signature {
        /// The pattern the handler was registered under.
        pattern: String,
        /// Number of non-receiver arguments the handler declares.
        declared: usize,
        /// Number of capture groups in the compiled pattern.
        captured: usize,
    },

    /// A command matched more than one registered pattern. Overlapping patterns
    /// are a command-table design defect, never resolved by priority.
    #[error("command '{command}' matches more than one registered pattern")]
    Ambiguous {
        /// The command string that matched ambiguously.
        command: String,
    },

    /// A command matched no registered pattern.
    #[error("unknown command '{command}'")]
    UnknownCommand {
        /// The command string that failed to match.
        command: String,
    },

    /// `set_call_delay` was given a pattern that is not in the command table.
    #[error("no handler registered under pattern '{pattern}'")]
    UnknownPattern {
        /// The pattern string that was looked up.
        pattern: String,
    },

    /// A captured group could not be converted to the declared argument type.
    #[error("argument {position}: cannot convert '{value}' to {expected}")]
    Coercion {
        /// Zero-based argument position, in capture-group order.
        position: usize,
        /// Label of the declared argument type.
        expected: &'static str,
        /// The captured text that failed to convert.
        value: String,
    },

    /// Instrument configuration failed to deserialize.
    #[error("invalid instrument configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// An error raised by a handler or submodule accessor.
    #[error("instrument error: {0}")]
    Instrument(String),
}

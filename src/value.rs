//! Typed command arguments and replies.
//!
//! Captured regex groups are always text; before a handler runs they are coerced
//! into [`ScpiValue`]s according to the handler's declared argument types. The set
//! of supported types is deliberately closed — integer, float, text — so that an
//! unsupported handler signature is rejected by the compiler rather than
//! discovered on first use.

use std::fmt;

use crate::error::MockError;

/// Declared type of one handler argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    /// Signed 64-bit integer, e.g. a channel index.
    Integer,
    /// 64-bit float, e.g. a voltage setpoint.
    Float,
    /// Raw captured text, passed through untouched.
    Text,
}

impl ArgType {
    /// Short label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            ArgType::Integer => "integer",
            ArgType::Float => "float",
            ArgType::Text => "text",
        }
    }

    /// Coerce one captured group into a typed value.
    ///
    /// Numeric conversions tolerate surrounding whitespace; text is passed
    /// through verbatim.
    pub fn coerce(self, position: usize, raw: &str) -> Result<ScpiValue, MockError> {
        let coercion_error = || MockError::Coercion {
            position,
            expected: self.label(),
            value: raw.to_string(),
        };

        match self {
            ArgType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(ScpiValue::Integer)
                .map_err(|_| coercion_error()),
            ArgType::Float => raw
                .trim()
                .parse::<f64>()
                .map(ScpiValue::Float)
                .map_err(|_| coercion_error()),
            ArgType::Text => Ok(ScpiValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Declared reply type of a handler.
///
/// Descriptive only: submodule handlers are tagged explicitly at registration,
/// so the reply type never drives dispatch decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyType {
    /// The handler replies with nothing (a write command).
    None,
    /// The handler replies with an integer.
    Integer,
    /// The handler replies with a float.
    Float,
    /// The handler replies with text.
    Text,
}

/// A coerced command argument or reply value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScpiValue {
    /// An integer value.
    Integer(i64),
    /// A float value.
    Float(f64),
    /// A text value.
    Text(String),
}

impl fmt::Display for ScpiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScpiValue::Integer(v) => write!(f, "{v}"),
            // Floats keep at least one fractional digit on the wire, so a
            // setpoint written as "12" reads back as "12.0" through a float
            // handler.
            ScpiValue::Float(v) => write!(f, "{v:?}"),
            ScpiValue::Text(v) => f.write_str(v),
        }
    }
}

/// Types usable as handler arguments.
///
/// Implemented for `i64`, `f64` and `String` only; this is the registration-time
/// guarantee that every argument has a supported coercion.
pub trait ScpiArg: Sized + Send + 'static {
    /// The [`ArgType`] this Rust type coerces from.
    fn arg_type() -> ArgType;

    /// Extract a typed argument from an already-coerced value.
    ///
    /// Returns `None` on a variant mismatch, which dispatch treats as an
    /// internal invariant breach rather than a caller error.
    fn from_value(value: &ScpiValue) -> Option<Self>;
}

impl ScpiArg for i64 {
    fn arg_type() -> ArgType {
        ArgType::Integer
    }

    fn from_value(value: &ScpiValue) -> Option<Self> {
        match value {
            ScpiValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl ScpiArg for f64 {
    fn arg_type() -> ArgType {
        ArgType::Float
    }

    fn from_value(value: &ScpiValue) -> Option<Self> {
        match value {
            ScpiValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl ScpiArg for String {
    fn arg_type() -> ArgType {
        ArgType::Text
    }

    fn from_value(value: &ScpiValue) -> Option<Self> {
        match value {
            ScpiValue::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// Types usable as handler replies.
pub trait ScpiReply: 'static {
    /// The declared [`ReplyType`].
    fn reply_type() -> ReplyType;

    /// Convert the handler's return value into an optional reply value.
    fn into_reply(self) -> Result<Option<ScpiValue>, MockError>;
}

impl ScpiReply for () {
    fn reply_type() -> ReplyType {
        ReplyType::None
    }

    fn into_reply(self) -> Result<Option<ScpiValue>, MockError> {
        Ok(None)
    }
}

impl ScpiReply for i64 {
    fn reply_type() -> ReplyType {
        ReplyType::Integer
    }

    fn into_reply(self) -> Result<Option<ScpiValue>, MockError> {
        Ok(Some(ScpiValue::Integer(self)))
    }
}

impl ScpiReply for f64 {
    fn reply_type() -> ReplyType {
        ReplyType::Float
    }

    fn into_reply(self) -> Result<Option<ScpiValue>, MockError> {
        Ok(Some(ScpiValue::Float(self)))
    }
}

impl ScpiReply for String {
    fn reply_type() -> ReplyType {
        ReplyType::Text
    }

    fn into_reply(self) -> Result<Option<ScpiValue>, MockError> {
        Ok(Some(ScpiValue::Text(self)))
    }
}

impl<T: ScpiReply> ScpiReply for Result<T, MockError> {
    fn reply_type() -> ReplyType {
        T::reply_type()
    }

    fn into_reply(self) -> Result<Option<ScpiValue>, MockError> {
        self.and_then(ScpiReply::into_reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_coercion() {
        let value = ArgType::Integer.coerce(0, "42").unwrap();
        assert_eq!(value, ScpiValue::Integer(42));
    }

    #[test]
    fn test_integer_coercion_trims_whitespace() {
        let value = ArgType::Integer.coerce(0, " 7 ").unwrap();
        assert_eq!(value, ScpiValue::Integer(7));
    }

    #[test]
    fn test_float_coercion() {
        let value = ArgType::Float.coerce(0, "13.4").unwrap();
        assert_eq!(value, ScpiValue::Float(13.4));
    }

    #[test]
    fn test_float_coercion_accepts_integer_text() {
        let value = ArgType::Float.coerce(0, "12").unwrap();
        assert_eq!(value, ScpiValue::Float(12.0));
    }

    #[test]
    fn test_text_coercion_is_verbatim() {
        let value = ArgType::Text.coerce(0, " raw ").unwrap();
        assert_eq!(value, ScpiValue::Text(" raw ".to_string()));
    }

    #[test]
    fn test_failed_coercion_reports_position_and_value() {
        let err = ArgType::Float.coerce(1, "abc").unwrap_err();
        match err {
            MockError::Coercion {
                position,
                expected,
                value,
            } => {
                assert_eq!(position, 1);
                assert_eq!(expected, "float");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_float_display_keeps_fractional_digit() {
        assert_eq!(ScpiValue::Float(12.0).to_string(), "12.0");
        assert_eq!(ScpiValue::Float(13.4).to_string(), "13.4");
    }

    #[test]
    fn test_integer_and_text_display() {
        assert_eq!(ScpiValue::Integer(5).to_string(), "5");
        assert_eq!(ScpiValue::Text("IDN".to_string()).to_string(), "IDN");
    }

    #[test]
    fn test_result_reply_flattens() {
        let ok: Result<f64, MockError> = Ok(1.5);
        assert_eq!(ok.into_reply().unwrap(), Some(ScpiValue::Float(1.5)));

        let err: Result<f64, MockError> = Err(MockError::Instrument("boom".into()));
        assert!(err.into_reply().is_err());
    }

    #[test]
    fn test_unit_reply_is_empty() {
        assert_eq!(().into_reply().unwrap(), None);
    }
}

//! The dispatcher trait implemented by every simulated instrument.
//!
//! Implementing [`Mocker`] takes three pieces: a `Lazy` static holding the
//! type's [`CommandSet`], a `Duration` field for the instance-level turnaround
//! delay, and the two accessor methods wiring them up. In exchange the type
//! gains [`send`](Mocker::send) — the single data-path entry point — and
//! [`set_call_delay`](Mocker::set_call_delay).

use std::time::Duration;

use crate::error::MockError;
use crate::registry::CommandSet;

/// A simulated instrument that answers text commands.
pub trait Mocker: Sized + 'static {
    /// The command set shared by every instance of this instrument type.
    ///
    /// By convention this returns a `once_cell::sync::Lazy` static; the set is
    /// built on first touch and never rebuilt.
    fn commands() -> &'static CommandSet<Self>;

    /// The instance-level default turnaround delay. Starts at zero.
    fn call_delay(&self) -> Duration;

    /// Mutable access to the instance-level default turnaround delay.
    fn call_delay_mut(&mut self) -> &mut Duration;

    /// Submit a command and receive the instrument's reply.
    ///
    /// The command is searched against every registered pattern; exactly one
    /// must match. Captured groups are coerced to the handler's declared
    /// argument types, the applicable delay blocks the calling thread, and the
    /// handler's reply is rendered as text. Write commands reply with an empty
    /// string.
    fn send(&mut self, command: &str) -> Result<String, MockError> {
        Self::commands().dispatch(self, command)
    }

    /// Configure artificial latency.
    ///
    /// With `pattern` absent, sets this instance's default delay. With a
    /// pattern, sets the override on the handler registered under exactly that
    /// pattern string in the type-shared command set — visible to every
    /// instance of the type from that point on. Fails if the pattern is not
    /// registered.
    fn set_call_delay(
        &mut self,
        delay: Duration,
        pattern: Option<&str>,
    ) -> Result<(), MockError> {
        match pattern {
            None => {
                *self.call_delay_mut() = delay;
                Ok(())
            }
            Some(pattern) => Self::commands().set_pattern_delay(pattern, delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CommandSetBuilder;
    use once_cell::sync::Lazy;

    #[derive(Default)]
    struct Counter {
        count: i64,
        label: String,
        call_delay: Duration,
    }

    impl Counter {
        fn bump(&mut self, by: i64) {
            self.count += by;
        }

        fn total(&mut self) -> i64 {
            self.count
        }

        fn tag(&mut self, label: String) -> String {
            self.label = label;
            self.label.clone()
        }
    }

    static COUNTER_COMMANDS: Lazy<CommandSet<Counter>> = Lazy::new(|| {
        let mut commands = CommandSetBuilder::new();
        commands
            .command(r":COUNT:ADD (\d+)", Counter::bump)
            .unwrap();
        commands.command(r":COUNT\?", Counter::total).unwrap();
        commands.command(r":TAG (\w+)", Counter::tag).unwrap();
        // Both of these match ":FREQ 50"; dispatch must refuse to pick one.
        commands.command(r":FREQ (\d+)", Counter::bump).unwrap();
        commands.command(r":FREQ (.*)", Counter::bump).unwrap();
        commands.finish()
    });

    impl Mocker for Counter {
        fn commands() -> &'static CommandSet<Self> {
            &COUNTER_COMMANDS
        }

        fn call_delay(&self) -> Duration {
            self.call_delay
        }

        fn call_delay_mut(&mut self) -> &mut Duration {
            &mut self.call_delay
        }
    }

    #[test]
    fn test_send_invokes_matching_handler() {
        let mut counter = Counter::default();
        assert_eq!(counter.send(":COUNT:ADD 3").unwrap(), "");
        assert_eq!(counter.send(":COUNT:ADD 4").unwrap(), "");
        assert_eq!(counter.send(":COUNT?").unwrap(), "7");
    }

    #[test]
    fn test_text_reply_passes_through() {
        let mut counter = Counter::default();
        assert_eq!(counter.send(":TAG dmm1").unwrap(), "dmm1");
    }

    #[test]
    fn test_unknown_command() {
        let mut counter = Counter::default();
        let err = counter.send(":NOPE?").unwrap_err();
        assert!(matches!(err, MockError::UnknownCommand { .. }));
    }

    #[test]
    fn test_ambiguous_command_invokes_no_handler() {
        let mut counter = Counter::default();
        let err = counter.send(":FREQ 50").unwrap_err();
        assert!(matches!(err, MockError::Ambiguous { .. }));
        // Neither bump handler ran.
        assert_eq!(counter.send(":COUNT?").unwrap(), "0");
    }

    #[test]
    fn test_matching_is_substring_search() {
        let mut counter = Counter::default();
        // A prefix the pattern never mentions does not prevent the match.
        counter.send("*TRG;:COUNT:ADD 2").unwrap();
        assert_eq!(counter.send(":COUNT?").unwrap(), "2");
    }

    #[test]
    fn test_failed_coercion_leaves_state_untouched() {
        let mut counter = Counter::default();
        counter.send(":COUNT:ADD 5").unwrap();
        let err = counter.send(":COUNT:ADD 99999999999999999999").unwrap_err();
        assert!(matches!(err, MockError::Coercion { .. }));
        assert_eq!(counter.send(":COUNT?").unwrap(), "5");
    }

    #[test]
    fn test_set_call_delay_rejects_unknown_pattern() {
        let mut counter = Counter::default();
        let err = counter
            .set_call_delay(Duration::from_millis(1), Some(":MISSING"))
            .unwrap_err();
        assert!(matches!(err, MockError::UnknownPattern { .. }));
    }

    #[test]
    fn test_instance_delay_starts_at_zero() {
        let counter = Counter::default();
        assert_eq!(counter.call_delay(), Duration::ZERO);
    }
}

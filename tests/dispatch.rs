//! End-to-end dispatch behaviour of the shipped voltage sources.

use scpi_mock::instruments::{AmplifiedVoltageSource, VoltageSource};
use scpi_mock::{MockError, Mocker};

#[test]
fn set_then_read_roundtrip() {
    let mut source = VoltageSource::new();
    source.send(":INSTR:CHANNEL1:VOLT 12").unwrap();
    source.send(":INSTR:CHANNEL2:VOLT 13.4").unwrap();

    assert_eq!(source.send(":INSTR:CHANNEL1:VOLT?").unwrap(), "12.0");
    assert_eq!(source.send(":INSTR:CHANNEL2:VOLT?").unwrap(), "13.4");
}

#[test]
fn two_instances_of_same_kind_do_not_share_state() {
    let mut a = VoltageSource::new();
    let mut b = VoltageSource::new();

    a.send(":INSTR:CHANNEL1:VOLT 12").unwrap();
    b.send(":INSTR:CHANNEL1:VOLT 13.4").unwrap();

    assert_eq!(a.send(":INSTR:CHANNEL1:VOLT?").unwrap(), "12.0");
    assert_eq!(b.send(":INSTR:CHANNEL1:VOLT?").unwrap(), "13.4");
}

#[test]
fn one_of_each_kind() {
    let mut plain = VoltageSource::new();
    let mut amplified = AmplifiedVoltageSource::new();

    plain.send(":INSTR:CHANNEL1:VOLT 12").unwrap();
    assert_eq!(plain.send(":INSTR:CHANNEL1:VOLT?").unwrap(), "12.0");

    amplified.send(":INSTR:CHANNEL1:VOLT 13.4").unwrap();
    assert_eq!(amplified.send(":INSTR:CHANNEL1:VOLT?").unwrap(), "26.8");
}

#[test]
fn unknown_command_is_rejected() {
    let mut source = VoltageSource::new();
    let err = source.send(":INSTR:CHANNEL1:CURR?").unwrap_err();
    match err {
        MockError::UnknownCommand { command } => {
            assert_eq!(command, ":INSTR:CHANNEL1:CURR?");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_value_leaves_state_untouched() {
    let mut source = VoltageSource::new();
    source.send(":INSTR:CHANNEL1:VOLT 12").unwrap();

    let err = source.send(":INSTR:CHANNEL1:VOLT abc").unwrap_err();
    assert!(matches!(err, MockError::Coercion { .. }));

    assert_eq!(source.send(":INSTR:CHANNEL1:VOLT?").unwrap(), "12.0");
}

#[test]
fn matching_is_substring_search() {
    // The engine searches patterns anywhere in the command, so leading tokens
    // a pattern never mentions do not prevent the match.
    let mut source = VoltageSource::new();
    source.send("*TRG;:INSTR:CHANNEL1:VOLT 7").unwrap();
    assert_eq!(source.send(":INSTR:CHANNEL1:VOLT?").unwrap(), "7.0");
}

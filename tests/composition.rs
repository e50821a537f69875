//! Submodule composition resolved end-to-end through `send`.

use scpi_mock::instruments::{ChannelBank, SourceRack};
use scpi_mock::{MockError, Mocker};

#[test]
fn bank_routes_to_the_addressed_channel() {
    let mut bank = ChannelBank::new();
    bank.send(":CHANNEL1:VOLT 5.5").unwrap();
    bank.send(":CHANNEL2:VOLT 1.25").unwrap();

    assert_eq!(bank.send(":CHANNEL1:VOLT?").unwrap(), "5.5");
    assert_eq!(bank.send(":CHANNEL2:VOLT?").unwrap(), "1.25");
}

#[test]
fn rack_resolves_three_levels_deep() {
    let mut rack = SourceRack::new();
    rack.send(":INST1:CHANNEL2:VOLT 7.25").unwrap();

    // The leaf handler sees arguments drawn from every level: slot, channel,
    // value, in declaration order.
    assert_eq!(rack.send(":INST1:CHANNEL2:VOLT?").unwrap(), "7.25");

    // Sibling banks and channels are untouched.
    assert_eq!(rack.send(":INST1:CHANNEL1:VOLT?").unwrap(), "0.0");
    assert_eq!(rack.send(":INST2:CHANNEL2:VOLT?").unwrap(), "0.0");
}

#[test]
fn rack_instances_are_independent() {
    let mut a = SourceRack::new();
    let mut b = SourceRack::new();

    a.send(":INST1:CHANNEL1:VOLT 12").unwrap();
    b.send(":INST1:CHANNEL1:VOLT 13.4").unwrap();

    assert_eq!(a.send(":INST1:CHANNEL1:VOLT?").unwrap(), "12.0");
    assert_eq!(b.send(":INST1:CHANNEL1:VOLT?").unwrap(), "13.4");
}

#[test]
fn missing_submodule_surfaces_instrument_error() {
    let mut rack = SourceRack::new();

    let err = rack.send(":INST9:CHANNEL1:VOLT?").unwrap_err();
    assert!(matches!(err, MockError::Instrument(_)));

    let err = rack.send(":INST1:CHANNEL9:VOLT?").unwrap_err();
    assert!(matches!(err, MockError::Instrument(_)));
}

#[test]
fn composed_patterns_preserve_declaration_order() {
    let patterns: Vec<_> = SourceRack::commands().patterns().collect();
    assert_eq!(
        patterns,
        vec![
            r":INST(\d+):CHANNEL(\d+):VOLT (.*)",
            r":INST(\d+):CHANNEL(\d+):VOLT\?"
        ]
    );
}

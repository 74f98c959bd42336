//! Integration tests for SS 4.4 switch control
//!
//! These tests drive a `SwitchController` against the simulated switcher:
//! - Status requests and single connect/mute round trips
//! - The compound connect-and-settle operation, including stuck crosspoints
//! - Framing loss, link loss and resynchronization
//! - Encoding/parsing properties across all crosspoints

use ss44_control::{
    ControlError, ControllerConfig, ProtocolMismatch, StaleMute, SwitchController,
    VerificationFailure,
};
use ss44_protocol::{CrosspointMatrix, Input, Output, Unit};
use ss44_sim::{SimTransport, VirtualSwitcher, VirtualSwitcherConfig};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    pub fn input(n: u8) -> Input {
        Input::new(n).unwrap()
    }

    pub fn output(n: u8) -> Output {
        Output::new(n).unwrap()
    }

    /// Controller for unit 0 attached to a fresh, fully muted switcher
    pub fn controller() -> SwitchController<SimTransport> {
        controller_with_state(CrosspointMatrix::new())
    }

    /// Controller attached to a switcher starting in `state`
    pub fn controller_with_state(state: CrosspointMatrix) -> SwitchController<SimTransport> {
        let switcher = VirtualSwitcher::from_config(VirtualSwitcherConfig {
            initial_state: state,
            ..Default::default()
        });
        SwitchController::new(SimTransport::new(switcher), ControllerConfig::default())
    }

    /// Commands written so far, as text
    pub fn writes(c: &SwitchController<SimTransport>) -> Vec<String> {
        c.transport()
            .writes()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }
}

use helpers::{input, output};

// ============================================================================
// Status and Single Command Tests
// ============================================================================

mod status_tests {
    use super::*;

    #[test]
    fn fresh_switcher_reports_all_muted() {
        let mut c = helpers::controller();
        let state = c.request_full_state().unwrap();

        assert!(state.is_all_muted());
        assert_eq!(helpers::writes(&c), vec!["*0SL"]);
        assert_eq!(c.transport().lines_read(), 4);
    }

    #[test]
    fn request_full_state_matches_device() {
        let initial = CrosspointMatrix::new()
            .with(input(2), output(1), true)
            .with(input(4), output(2), true);
        let mut c = helpers::controller_with_state(initial);

        assert_eq!(c.request_full_state().unwrap(), initial);
        let bits = c.request_full_state().unwrap().to_bit_string();
        assert_eq!(bits, "0100000100000000");
    }

    #[test]
    fn connect_alone_keeps_previous_source() {
        let initial = CrosspointMatrix::new().with(input(1), output(3), true);
        let mut c = helpers::controller_with_state(initial);

        let state = c.connect(input(2), output(3)).unwrap();
        assert_eq!(state.inputs_on(output(3)), vec![input(1), input(2)]);
    }

    #[test]
    fn mute_reports_new_state() {
        let initial = CrosspointMatrix::new().with(input(1), output(3), true);
        let mut c = helpers::controller_with_state(initial);

        let state = c.mute(input(1), output(3)).unwrap();
        assert!(state.is_all_muted());
        assert_eq!(helpers::writes(&c), vec!["*001M3"]);
    }

    #[test]
    fn controller_addresses_its_own_unit() {
        let switcher = VirtualSwitcher::new(Unit(3));
        let config = ControllerConfig {
            unit: Unit(3),
            ..Default::default()
        };
        let mut c = SwitchController::new(SimTransport::new(switcher), config);

        c.connect(input(4), output(4)).unwrap();
        assert_eq!(helpers::writes(&c), vec!["*3044"]);
    }

    #[test]
    fn wrong_unit_gets_no_reply() {
        let transport = SimTransport::new(VirtualSwitcher::new(Unit(1)));
        let mut c = SwitchController::new(transport, ControllerConfig::default());

        let err = c.request_full_state().unwrap_err();
        assert!(matches!(
            err,
            ControlError::ProtocolMismatch(ProtocolMismatch::IncompleteStatus { received: 0 })
        ));
    }
}

// ============================================================================
// Connect and Settle Tests
// ============================================================================

mod settle_tests {
    use super::*;

    #[test]
    fn switch_onto_empty_output() {
        let mut c = helpers::controller();

        let outcome = c.connect_and_settle(input(3), output(2)).unwrap();

        assert!(outcome.is_success());
        assert!(outcome.stale.is_empty());
        assert_eq!(outcome.final_state.inputs_on(output(2)), vec![input(3)]);
        assert_eq!(helpers::writes(&c), vec!["*0032"]);
    }

    #[test]
    fn switch_replaces_previous_source() {
        let initial = CrosspointMatrix::new().with(input(1), output(1), true);
        let mut c = helpers::controller_with_state(initial);

        let outcome = c.connect_and_settle(input(2), output(1)).unwrap();

        assert!(outcome.is_success());
        assert_eq!(
            outcome.stale,
            vec![StaleMute {
                input: input(1),
                muted: true
            }]
        );
        assert_eq!(helpers::writes(&c), vec!["*0021", "*001M1"]);
        assert_eq!(c.transport().lines_read(), 8);
        let device = c.transport().switcher().state();
        assert_eq!(device.inputs_on(output(1)), vec![input(2)]);
    }

    #[test]
    fn switch_to_current_source_sends_no_mute() {
        let initial = CrosspointMatrix::new().with(input(4), output(4), true);
        let mut c = helpers::controller_with_state(initial);

        let outcome = c.connect_and_settle(input(4), output(4)).unwrap();

        assert!(outcome.is_success());
        assert_eq!(helpers::writes(&c), vec!["*0044"]);
    }

    #[test]
    fn other_outputs_untouched() {
        let initial = CrosspointMatrix::new()
            .with(input(1), output(1), true)
            .with(input(1), output(2), true);
        let mut c = helpers::controller_with_state(initial);

        let outcome = c.connect_and_settle(input(3), output(1)).unwrap();

        assert_eq!(outcome.final_state.inputs_on(output(2)), vec![input(1)]);
    }

    #[test]
    fn every_stale_input_muted() {
        let initial = CrosspointMatrix::new()
            .with(input(1), output(2), true)
            .with(input(2), output(2), true)
            .with(input(4), output(2), true);
        let mut c = helpers::controller_with_state(initial);

        let outcome = c.connect_and_settle(input(3), output(2)).unwrap();

        let stale: Vec<u8> = outcome.stale.iter().map(|s| s.input.get()).collect();
        assert_eq!(stale, vec![1, 2, 4]);
        assert!(outcome.is_success());
        assert_eq!(
            helpers::writes(&c),
            vec!["*0032", "*001M2", "*002M2", "*004M2"]
        );
    }

    #[test]
    fn stuck_connect_short_circuits() {
        let initial = CrosspointMatrix::new().with(input(1), output(1), true);
        let mut c = helpers::controller_with_state(initial);
        c.transport_mut().switcher_mut().stick(input(2), output(1));

        let outcome = c.connect_and_settle(input(2), output(1)).unwrap();

        assert!(!outcome.connected);
        assert_eq!(
            outcome.failures(),
            vec![VerificationFailure::NotConnected {
                input: input(2),
                output: output(1)
            }]
        );
        assert_eq!(helpers::writes(&c), vec!["*0021"]);
        assert_eq!(outcome.final_state.inputs_on(output(1)), vec![input(1)]);
    }

    #[test]
    fn stuck_mute_does_not_stop_siblings() {
        let initial = CrosspointMatrix::new()
            .with(input(1), output(1), true)
            .with(input(2), output(1), true);
        let mut c = helpers::controller_with_state(initial);
        c.transport_mut().switcher_mut().stick(input(1), output(1));

        let outcome = c.connect_and_settle(input(3), output(1)).unwrap();

        assert!(outcome.connected);
        assert_eq!(
            outcome.stale,
            vec![
                StaleMute {
                    input: input(1),
                    muted: false
                },
                StaleMute {
                    input: input(2),
                    muted: true
                },
            ]
        );
        assert_eq!(
            outcome.failures(),
            vec![VerificationFailure::NotMuted {
                input: input(1),
                output: output(1)
            }]
        );
    }

    #[test]
    fn exercise_sequence_leaves_last_input_everywhere() {
        let mut c = helpers::controller();

        for o in Output::all() {
            for i in Input::all() {
                let outcome = c.connect_and_settle(i, o).unwrap();
                assert!(outcome.is_success(), "switch {i}->{o} failed");
            }
        }

        let state = c.request_full_state().unwrap();
        assert_eq!(state.to_bit_string(), "0001000100010001");
    }
}

// ============================================================================
// Error and Recovery Tests
// ============================================================================

mod recovery_tests {
    use super::*;

    #[test]
    fn truncated_report_is_protocol_mismatch() {
        let mut c = helpers::controller();
        c.transport_mut().switcher_mut().truncate_next_status(3);

        let err = c.request_full_state().unwrap_err();
        assert!(matches!(
            err,
            ControlError::ProtocolMismatch(ProtocolMismatch::IncompleteStatus { received: 3 })
        ));
        assert!(err.needs_resync());
    }

    #[test]
    fn truncated_report_aborts_switch() {
        let initial = CrosspointMatrix::new().with(input(1), output(1), true);
        let mut c = helpers::controller_with_state(initial);
        c.transport_mut().switcher_mut().truncate_next_status(2);

        let err = c.connect_and_settle(input(2), output(1)).unwrap_err();

        assert!(err.needs_resync());
        assert_eq!(helpers::writes(&c), vec!["*0021"]);
        assert_eq!(c.resynchronize().unwrap(), 0);
    }

    #[test]
    fn closed_link_is_transport_error() {
        let mut c = helpers::controller();
        c.transport_mut().close();

        let err = c.connect_and_settle(input(1), output(1)).unwrap_err();
        assert!(matches!(err, ControlError::Transport(_)));
        assert!(!err.needs_resync());
    }

    #[test]
    fn mute_all_then_resynchronize() {
        let initial = CrosspointMatrix::new().with(input(2), output(2), true);
        let mut c = helpers::controller_with_state(initial);

        c.mute_all_outputs().unwrap();
        assert_eq!(c.transport().lines_read(), 0);

        assert_eq!(c.resynchronize().unwrap(), 4);
        assert!(c.request_full_state().unwrap().is_all_muted());
    }

    #[test]
    fn resynchronize_recovers_from_noise() {
        let mut c = helpers::controller();
        let tail = b"S0L3,0,0,0,0\r\nS0L4,0,0,0,0\r\n";
        c.transport_mut().inject(tail);

        assert_eq!(c.resynchronize().unwrap(), 2);
        assert!(c.request_full_state().unwrap().is_all_muted());
        assert_eq!(c.resynchronize().unwrap(), 0);
    }

    #[test]
    fn unread_lines_corrupt_next_parse() {
        let initial = CrosspointMatrix::new().with(input(1), output(1), true);
        let mut c = helpers::controller_with_state(initial);
        // Left over from a mute-all acknowledgment nobody drained
        c.transport_mut()
            .inject(b"S0L1,0,0,0,0\r\nS0L2,0,0,0,0\r\nS0L3,0,0,0,0\r\nS0L4,0,0,0,0\r\n");

        let state = c.request_full_state().unwrap();
        assert!(state.is_all_muted());
        assert_eq!(c.resynchronize().unwrap(), 4);
    }

    #[test]
    fn validation_rejects_before_sending() {
        let mut c = helpers::controller();

        assert!(matches!(
            c.switch_output(0, 1),
            Err(ControlError::Validation(_))
        ));
        assert!(matches!(
            c.switch_output(1, 5),
            Err(ControlError::Validation(_))
        ));
        assert!(c.transport().writes().is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use ss44_protocol::{parse_status, Command, EncodeCommand, StatusBlock};

    fn crosspoint() -> impl Strategy<Value = (Input, Output)> {
        (1u8..=4, 1u8..=4).prop_map(|(i, o)| (input(i), output(o)))
    }

    fn matrix() -> impl Strategy<Value = CrosspointMatrix> {
        prop::array::uniform4(prop::array::uniform4(any::<bool>()))
            .prop_map(CrosspointMatrix::from_rows)
    }

    fn is_connect_grammar(s: &str) -> bool {
        let Some(body) = s.strip_prefix('*') else {
            return false;
        };
        body.len() >= 4 && body.bytes().all(|b| b.is_ascii_digit())
    }

    proptest! {
        #[test]
        fn connect_encoding_matches_grammar(unit in 0u8..=9, (i, o) in crosspoint()) {
            let cmd = Command::Connect { unit: Unit(unit), input: i, output: o };
            let text = String::from_utf8(cmd.encode()).unwrap();

            prop_assert!(is_connect_grammar(&text), "bad encoding {}", text);
            prop_assert_eq!(text, format!("*{}{:02}{}", unit, i.get(), o.get()));
        }

        #[test]
        fn single_crosspoint_block_parses(unit in 0u8..=9, (i, o) in crosspoint()) {
            let expected = CrosspointMatrix::new().with(i, o, true);
            let report = String::from_utf8(StatusBlock::encode(Unit(unit), &expected)).unwrap();
            let lines: Vec<&str> = report.split_inclusive('\n').collect();
            let lines: [&str; 4] = lines.try_into().unwrap();

            let parsed = parse_status(&lines);
            prop_assert_eq!(parsed, expected);
            for oo in Output::all() {
                for ii in Input::all() {
                    prop_assert_eq!(parsed.is_connected(ii, oo), ii == i && oo == o);
                }
            }
        }

        #[test]
        fn settle_leaves_single_source(initial in matrix(), (i, o) in crosspoint()) {
            let mut c = helpers::controller_with_state(initial);

            let outcome = c.connect_and_settle(i, o).unwrap();

            prop_assert!(outcome.is_success());
            prop_assert_eq!(outcome.final_state.inputs_on(o), vec![i]);
            let expected_stale = initial.inputs_on(o).into_iter().filter(|&x| x != i).count();
            prop_assert_eq!(outcome.stale.len(), expected_stale);
            prop_assert_eq!(c.transport().writes().len(), 1 + expected_stale);
            prop_assert_eq!(c.transport().lines_read(), 4 * (1 + expected_stale));
        }

        #[test]
        fn settle_never_touches_other_outputs(initial in matrix(), (i, o) in crosspoint()) {
            let mut c = helpers::controller_with_state(initial);

            let outcome = c.connect_and_settle(i, o).unwrap();

            for other in Output::all().filter(|&x| x != o) {
                prop_assert_eq!(outcome.final_state.row(other), initial.row(other));
            }
        }
    }
}

// tests/signals.rs

use proptest::prelude::*;

use watchrun::exec::parse_signal;

#[test]
fn named_signals_parse() {
    assert_eq!(format!("{:?}", parse_signal("TERM").unwrap()), "SIGTERM");
    assert_eq!(format!("{:?}", parse_signal("KILL").unwrap()), "SIGKILL");
    assert_eq!(format!("{:?}", parse_signal("INT").unwrap()), "SIGINT");
    assert_eq!(format!("{:?}", parse_signal("HUP").unwrap()), "SIGHUP");
    assert_eq!(format!("{:?}", parse_signal("QUIT").unwrap()), "SIGQUIT");
    assert_eq!(format!("{:?}", parse_signal("TRAP").unwrap()), "SIGTRAP");
}

#[test]
fn sig_prefix_and_case_are_accepted() {
    assert_eq!(parse_signal("SIGTERM").unwrap(), parse_signal("TERM").unwrap());
    assert_eq!(parse_signal("term").unwrap(), parse_signal("TERM").unwrap());
    assert_eq!(parse_signal(" sigkill ").unwrap(), parse_signal("KILL").unwrap());
}

#[test]
fn numeric_signals_parse() {
    assert_eq!(parse_signal("9").unwrap(), parse_signal("KILL").unwrap());
    assert_eq!(parse_signal("15").unwrap(), parse_signal("TERM").unwrap());
}

#[test]
fn unknown_signals_are_rejected() {
    assert!(parse_signal("BOGUS").is_err());
    assert!(parse_signal("").is_err());
    assert!(parse_signal("0").is_err());
    assert!(parse_signal("99").is_err());
}

proptest! {
    /// Every standard low signal number parses, and its debug name keeps the
    /// conventional SIG prefix.
    #[test]
    fn low_signal_numbers_parse(n in 1i32..=15) {
        let sig = parse_signal(&n.to_string()).unwrap();
        let debug_name = format!("{:?}", sig);
        prop_assert!(debug_name.starts_with("SIG"));
    }
}

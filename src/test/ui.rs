use super::{parse_confirmation, parse_port};

#[test]
fn empty_port_entry_selects_the_ssh_default() {
    assert_eq!(parse_port(""), Some(22));
    assert_eq!(parse_port("  \n"), Some(22));
}

#[test]
fn accepts_valid_ports() {
    assert_eq!(parse_port("22"), Some(22));
    assert_eq!(parse_port(" 2222 "), Some(2222));
    assert_eq!(parse_port("65535"), Some(65535));
}

#[test]
fn rejects_zero_and_unparsable_ports() {
    assert_eq!(parse_port("0"), None);
    assert_eq!(parse_port("65536"), None);
    assert_eq!(parse_port("-1"), None);
    assert_eq!(parse_port("ssh"), None);
}

#[test]
fn confirmation_accepts_y_and_yes_case_insensitively() {
    assert!(parse_confirmation("y"));
    assert!(parse_confirmation("Y\n"));
    assert!(parse_confirmation("yes"));
    assert!(parse_confirmation(" YES "));
}

#[test]
fn confirmation_rejects_everything_else() {
    assert!(!parse_confirmation(""));
    assert!(!parse_confirmation("n"));
    assert!(!parse_confirmation("no"));
    assert!(!parse_confirmation("yep"));
    assert!(!parse_confirmation("all"));
}

use super::map_exit_code;
use std::process::ExitCode;

#[test]
fn zero_status_maps_to_success() {
    assert_eq!(map_exit_code(0), ExitCode::from(0));
}

#[test]
fn preserves_non_zero_status_in_u8_range() {
    assert_eq!(map_exit_code(23), ExitCode::from(23));
}

#[test]
fn clamps_out_of_range_statuses() {
    assert_eq!(map_exit_code(300), ExitCode::from(255));
    assert_eq!(map_exit_code(-1), ExitCode::from(255));
}

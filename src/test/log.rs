use super::{LogLevel, format_entry};

#[test]
fn entries_carry_a_level_tag_and_the_message() {
    let entry = format_entry(LogLevel::Debug, "starting selector");
    assert!(entry.contains("[DEBUG]"));
    assert!(entry.ends_with("starting selector"));
}

#[test]
fn each_level_formats_with_its_own_tag() {
    assert!(format_entry(LogLevel::Info, "x").contains("[INFO]"));
    assert!(format_entry(LogLevel::Warning, "x").contains("[WARN]"));
    assert!(format_entry(LogLevel::Error, "x").contains("[ERROR]"));
}

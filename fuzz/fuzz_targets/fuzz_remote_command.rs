//! Fuzz target: `parse_command_line`
//!
//! Feeds arbitrary text to the remote protocol parser.  It must never
//! panic, and anything it accepts must map to a known command.
//!
//! cargo fuzz run fuzz_remote_command

#![no_main]

use libfuzzer_sys::fuzz_target;
use pikite::adapters::remote::parse_command_line;
use pikite::input::InputCommand;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(cmd) = parse_command_line(line) {
        assert!(InputCommand::ALL.contains(&cmd.command));
        let _ = cmd.into_event();
    }
});

//! File logging runs in its own test binary: the writer channel can be
//! installed only once per process.

use std::fs;
use tempfile::tempdir;

use dashsunrise::logger::Log;
use dashsunrise::{log_block_start, log_info, log_warning};

#[test]
fn test_file_logging_writes_plain_lines() {
    Log::set_enabled(true);
    let dir = tempdir().unwrap();
    let path = dir.path().join("dashsunrise.log");

    let guard = Log::start_file_logging(&path).unwrap();
    log_block_start!("Update cycle");
    log_info!("Using simulated time source");
    log_warning!("Last-known fix is {} minutes old", 12);

    // The channel is already installed
    assert!(Log::start_file_logging(dir.path().join("second.log")).is_err());
    drop(guard);

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "┃\n┣ Update cycle\n\
         ┣[INFO] Using simulated time source\n\
         ┣[WARNING] Last-known fix is 12 minutes old\n"
    );
    assert!(!content.contains('\x1b'));
    assert!(!dir.path().join("second.log").exists());
}

//! Fuzz target: `LineAssembler::feed`
//!
//! Drives arbitrary byte chunks into the inbound line splitter and checks
//! that queued lines stay bounded and never contain the terminator.
//!
//! cargo fuzz run fuzz_line_assembler

#![no_main]

use libfuzzer_sys::fuzz_target;
use watersensor::adapters::bt_serial::{LineAssembler, RX_QUEUE_DEPTH};
use watersensor::app::ports::LINE_CAP;

fuzz_target!(|data: &[u8]| {
    let mut rx = LineAssembler::new();

    // Split on the first byte so chunk boundaries vary between runs.
    let split = data.first().map_or(0, |&b| usize::from(b)).min(data.len());
    let (a, b) = data.split_at(split);
    rx.feed(a, 0);
    rx.feed(b, 1);

    assert!(rx.pending_lines() <= RX_QUEUE_DEPTH);
    // Far enough out that any partial line is flushed too.
    while let Some(line) = rx.pop_line(u64::from(u32::MAX)) {
        assert!(line.len() <= LINE_CAP);
        assert!(!line.contains('\n'));
    }

    rx.clear();
    assert_eq!(rx.pending_lines(), 0);
});

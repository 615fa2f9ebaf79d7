#![no_main]

use libfuzzer_sys::fuzz_target;
use scriptprof::{Source, SourceRange, SourceRef};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let start = u16::from_le_bytes([data[0], data[1]]) as usize;
    let end = u16::from_le_bytes([data[2], data[3]]) as usize;
    let text = String::from_utf8_lossy(&data[4..]).into_owned();

    let source = SourceRef::new(Source::new("fuzz.script", text));
    let range = SourceRange::new(source.clone(), start, end);

    // Line lookups and slicing must stay in bounds for any offsets
    let lines = range.lines();
    assert!(lines.start() <= lines.end());
    assert!(*lines.end() <= source.line_count());
    let _ = range.text();
    for line in lines {
        let _ = source.line_text(line);
    }
});

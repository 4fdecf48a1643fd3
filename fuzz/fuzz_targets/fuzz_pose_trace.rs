#![no_main]
use libfuzzer_sys::fuzz_target;
use repcount_config::{PoseTrace, TraceRow};

fuzz_target!(|rows: Vec<(u64, String, f32, f32, f32)>| {
    let rows = rows
        .into_iter()
        .map(|(frame, keypoint, x, y, score)| TraceRow {
            frame,
            keypoint,
            x,
            y,
            score,
        })
        .collect();
    // Grouping must reject bad rows without panicking, and span must not
    // overflow on accepted traces.
    if let Ok(trace) = PoseTrace::from_rows(rows) {
        let _ = trace.span();
    }
});

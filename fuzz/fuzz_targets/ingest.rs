#![no_main]

use libfuzzer_sys::fuzz_target;
use scuttle_core::{Change, Timeline, TimelineError, TimelineOptions};
use std::sync::{Arc, Mutex};

// Input layout: byte 0 selects options, then per add one name byte, one
// predecessor count byte and that many predecessor bytes. Names live in a
// 16-symbol alphabet so duplicates, forward references and cycles all occur.
fuzz_target!(|data: &[u8]| {
    let Some((&flags, mut rest)) = data.split_first() else {
        return;
    };
    let mirror: Arc<Mutex<Vec<u8>>> = Arc::default();
    let mut timeline: Timeline<u8> = Timeline::with_options(TimelineOptions {
        coalesce: flags & 1 == 1,
    });
    timeline.set_notifier({
        let mirror = Arc::clone(&mirror);
        move |change: &Change<u8>| change.apply(&mut mirror.lock().unwrap())
    });

    while let Some((&name, tail)) = rest.split_first() {
        let Some((&count, tail)) = tail.split_first() else {
            break;
        };
        let count = usize::from(count % 4).min(tail.len());
        let (after, tail) = tail.split_at(count);
        rest = tail;

        let name = name % 16;
        match timeline.add(name, after.iter().map(|b| b % 16)) {
            Ok(()) => {}
            Err(TimelineError::DuplicateName(_)) => continue,
            // The timeline must be discarded after a cycle.
            Err(_) => return,
        }

        assert_eq!(*mirror.lock().unwrap(), timeline.iter().copied().collect::<Vec<_>>());
        for event in timeline.entries() {
            for cause in event.predecessors() {
                assert!(cause.position() < event.position());
                assert!(cause.rank() < event.rank());
            }
        }
    }
});

use super::*;
use std::sync::Arc;

#[test]
fn snapshot_returns_last_published_position() {
    let cell = AudioClockCell::new();
    assert_eq!(cell.snapshot(), Some(AudioPosition::default()));

    let pos = AudioPosition {
        sample: 48_000,
        sample_rate: 48_000,
        stream_active: true,
    };
    cell.publish(pos);
    assert_eq!(cell.snapshot(), Some(pos));
}

#[test]
fn secs_since_rejects_rewound_positions() {
    let pos = AudioPosition {
        sample: 100,
        sample_rate: 50,
        stream_active: true,
    };
    assert_eq!(pos.secs_since(0), Some(2.0));
    assert_eq!(pos.secs_since(100), Some(0.0));
    assert_eq!(pos.secs_since(101), None);

    let silent = AudioPosition {
        sample_rate: 0,
        ..pos
    };
    assert_eq!(silent.secs_since(0), None);
}

#[test]
fn concurrent_reads_never_observe_torn_positions() {
    let cell = Arc::new(AudioClockCell::new());
    let writer = {
        let cell = Arc::clone(&cell);
        std::thread::spawn(move || {
            for i in 1..=20_000u64 {
                // Rate and activity derive from the sample, so a torn read is detectable.
                cell.publish(AudioPosition {
                    sample: i,
                    sample_rate: (i % 1_000) as u32 + 1,
                    stream_active: i % 2 == 0,
                });
            }
        })
    };

    for _ in 0..20_000 {
        if let Some(pos) = cell.snapshot() {
            if pos.sample == 0 {
                continue;
            }
            assert_eq!(pos.sample_rate, (pos.sample % 1_000) as u32 + 1);
            assert_eq!(pos.stream_active, pos.sample % 2 == 0);
        }
    }
    writer.join().unwrap();
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn system_clock_does_not_go_backwards() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 >= t1);
}

#[test]
fn fake_clock_stays_frozen_until_advanced() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = FakeClock::at(start);
    assert_eq!(clock.now(), start);

    clock.advance(Duration::from_secs(300));
    assert_eq!((clock.now() - start).num_seconds(), 300);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(Duration::from_secs(30));
    assert_eq!((clock1.now() - t1).num_seconds(), 30);
}

#[test]
fn fake_clock_can_be_set() {
    let clock = FakeClock::new();
    let target = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
    clock.set(target);
    assert_eq!(clock.now(), target);
}

//! Benchmark tests for playtrace-core dispatch operations
//!
//! Run with: cargo bench -p playtrace-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use playtrace_core::timing::content_table;
use playtrace_core::types::Attributes;
use playtrace_core::VideoTracker;

// ============================================================================
// Helpers
// ============================================================================

fn full_lifecycle(tracker: &mut VideoTracker) {
    tracker.send_request();
    tracker.send_start();
    tracker.send_pause();
    tracker.send_resume();
    tracker.send_buffer_start();
    tracker.send_buffer_end();
    tracker.send_seek_start();
    tracker.send_seek_end();
    tracker.send_heartbeat();
    tracker.send_end();
    tracker.take_events();
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_full_lifecycle(c: &mut Criterion) {
    c.bench_function("full_lifecycle_dispatch", |b| {
        let mut tracker = VideoTracker::content();
        b.iter(|| full_lifecycle(black_box(&mut tracker)));
    });
}

fn bench_heartbeat_dispatch(c: &mut Criterion) {
    c.bench_function("heartbeat_dispatch", |b| {
        let mut tracker = VideoTracker::content();
        tracker.send_request();
        tracker.send_start();
        b.iter(|| {
            tracker.send_heartbeat();
            black_box(tracker.take_events());
        });
    });
}

fn bench_time_since_apply(c: &mut Criterion) {
    c.bench_function("time_since_table_apply", |b| {
        let mut table = content_table();
        b.iter(|| {
            let mut attrs = Attributes::new();
            table.apply(black_box("CONTENT_BUFFER_END"), &mut attrs);
            black_box(attrs);
        });
    });
}

fn bench_dispatch_with_custom_attributes(c: &mut Criterion) {
    c.bench_function("dispatch_with_custom_attributes", |b| {
        let mut tracker = VideoTracker::content();
        tracker.set_attribute("contentTitle", "Benchmark Asset");
        tracker
            .set_attribute_for("contentIsLive", false, "^CONTENT_[A-Z_]+$")
            .unwrap();
        tracker.send_request();
        tracker.send_start();
        b.iter(|| {
            tracker.send_heartbeat();
            black_box(tracker.take_events());
        });
    });
}

criterion_group!(
    benches,
    bench_full_lifecycle,
    bench_heartbeat_dispatch,
    bench_time_since_apply,
    bench_dispatch_with_custom_attributes
);
criterion_main!(benches);

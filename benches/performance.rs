//! Performance benchmarks for topic delivery.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use topic_overlay::host::memory::{OverlayState, StaticFrames};
use topic_overlay::{
    Bus, DisplayContext, FilteredSubscriber, FrameFilter, HostEvent, Message, OverflowPolicy,
    QueueOptions, SignalHub, SubscriberConfig,
};

struct Cloud {
    frame: &'static str,
    points: usize,
}

impl Message for Cloud {
    const DATATYPE: &'static str = "sensor/Cloud";

    fn frame_id(&self) -> &str {
        self.frame
    }
}

/// Benchmark fan-out of one publish to many subscriptions
fn bench_publish_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish_fanout");

    for subscribers in [1, 10, 100] {
        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            &subscribers,
            |b, &count| {
                let bus = Bus::new();
                let inboxes: Vec<_> = (0..count)
                    .map(|_| {
                        bus.subscribe::<Cloud>("/cloud", QueueOptions::default())
                            .unwrap()
                    })
                    .collect();
                let publisher = bus.advertise::<Cloud>("/cloud").unwrap();

                b.iter(|| {
                    publisher.publish(Cloud {
                        frame: "map",
                        points: 1,
                    });
                    for inbox in &inboxes {
                        black_box(inbox.drain());
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark releasing a full pending queue once its frame resolves
fn bench_filter_release(c: &mut Criterion) {
    c.bench_function("filter_release_full_queue", |b| {
        let frames = StaticFrames::new("map");
        frames.add_transform("map", "laser");
        let unresolved = StaticFrames::new("map");

        b.iter(|| {
            let mut filter = FrameFilter::new("Cloud", "map", 10, OverflowPolicy::DropOldest);
            for _ in 0..10 {
                filter.add(
                    std::sync::Arc::new(Cloud {
                        frame: "laser",
                        points: 1,
                    }),
                    &unresolved,
                );
            }
            black_box(filter.release(&frames));
        });
    });
}

/// Benchmark a full spin: drain, filter, admit, callback
fn bench_spin_once(c: &mut Criterion) {
    c.bench_function("spin_once_ten_messages", |b| {
        let overlay = OverlayState::new(true);
        let frames = StaticFrames::new("map");
        let signals = SignalHub::new();
        let bus = Bus::new();
        let ctx = DisplayContext::new(&overlay, &frames, &signals);
        let mut total = 0usize;
        let mut sub = FilteredSubscriber::<Cloud>::with_config(
            "Cloud topic",
            ctx,
            &bus,
            SubscriberConfig::default(),
            |cloud| total += cloud.points,
        );
        signals.emit(HostEvent::topic_edited("Cloud topic", "/cloud"));
        sub.spin_once();
        let publisher = bus.advertise::<Cloud>("/cloud").unwrap();

        b.iter(|| {
            for _ in 0..10 {
                publisher.publish(Cloud {
                    frame: "map",
                    points: 1,
                });
            }
            black_box(sub.spin_once());
        });
    });
}

criterion_group!(
    benches,
    bench_publish_fanout,
    bench_filter_release,
    bench_spin_once
);
criterion_main!(benches);

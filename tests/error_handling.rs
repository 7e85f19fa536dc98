//! Error handling and edge case tests.

use std::cell::Cell;

use topic_overlay::host::memory::{OverlayState, StaticFrames};
use topic_overlay::{
    Bus, DisplayContext, FilteredSubscriber, HostEvent, Message, SignalHub, Status, StatusLevel,
    SubscriberConfig,
};

struct Detection {
    frame: &'static str,
    valid: bool,
}

impl Message for Detection {
    const DATATYPE: &'static str = "tracking/Detection";

    fn frame_id(&self) -> &str {
        self.frame
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

struct Marker;

impl Message for Marker {
    const DATATYPE: &'static str = "viz/Marker";

    fn frame_id(&self) -> &str {
        "map"
    }
}

const LABEL: &str = "Detections topic";

fn detection(valid: bool) -> Detection {
    Detection { frame: "map", valid }
}

// --- Subscription Failures ---

#[test]
fn test_invalid_topic_reports_error() {
    let overlay = OverlayState::new(true);
    let frames = StaticFrames::new("map");
    let signals = SignalHub::new();
    let bus = Bus::new();
    let ctx = DisplayContext::new(&overlay, &frames, &signals);
    let mut sub = FilteredSubscriber::<Detection>::new(LABEL, ctx, &bus, |_| {});

    signals.emit(HostEvent::topic_edited(LABEL, "2detections"));
    sub.spin_once();

    let status = overlay.status(LABEL).unwrap();
    assert_eq!(status.level, StatusLevel::Error);
    assert_eq!(
        status.detail,
        "Error subscribing: Invalid topic name '2detections': must start with a letter"
    );
    assert!(!sub.is_subscribed());
}

#[test]
fn test_type_mismatch_reports_error_without_retry() {
    let overlay = OverlayState::new(true);
    let frames = StaticFrames::new("map");
    let signals = SignalHub::new();
    let bus = Bus::new();
    let ctx = DisplayContext::new(&overlay, &frames, &signals);
    let mut sub = FilteredSubscriber::<Detection>::new(LABEL, ctx, &bus, |_| {});

    let markers = bus.advertise::<Marker>("/detections").unwrap();
    signals.emit(HostEvent::topic_edited(LABEL, "/detections"));
    sub.spin_once();

    let status = overlay.status(LABEL).unwrap();
    assert!(!status.is_ok());
    assert!(status.detail.contains("viz/Marker"));

    // The conflict goes away, but nothing retries on its own
    drop(markers);
    sub.spin_once();
    sub.spin_once();
    assert!(!sub.is_subscribed());

    // Toggling visibility does
    overlay.set_enabled(false);
    signals.emit(HostEvent::OverlayChanged);
    overlay.set_enabled(true);
    signals.emit(HostEvent::OverlayChanged);
    sub.spin_once();

    assert!(sub.is_subscribed());
    assert_eq!(overlay.status(LABEL), Some(Status::ok("OK")));
}

#[test]
fn test_empty_topic_is_not_an_error() {
    let overlay = OverlayState::new(true);
    let frames = StaticFrames::new("map");
    let signals = SignalHub::new();
    let bus = Bus::new();
    let ctx = DisplayContext::new(&overlay, &frames, &signals);
    let sub = FilteredSubscriber::<Detection>::new(LABEL, ctx, &bus, |_| {});

    assert!(!sub.is_subscribed());
    assert_eq!(overlay.status(LABEL), Some(Status::ok("OK")));
}

// --- Invalid Payloads ---

#[test]
fn test_invalid_payload_is_dropped_silently() {
    let overlay = OverlayState::new(true);
    let frames = StaticFrames::new("map");
    let signals = SignalHub::new();
    let bus = Bus::new();
    let calls = Cell::new(0);
    let ctx = DisplayContext::new(&overlay, &frames, &signals);
    let mut sub =
        FilteredSubscriber::<Detection>::new(LABEL, ctx, &bus, |_| calls.set(calls.get() + 1));

    signals.emit(HostEvent::topic_edited(LABEL, "/detections"));
    sub.spin_once();

    let publisher = bus.advertise::<Detection>("/detections").unwrap();
    publisher.publish(detection(false));
    publisher.publish(detection(true));
    publisher.publish(detection(false));

    assert_eq!(sub.spin_once(), 1);
    assert_eq!(calls.get(), 1);
    assert_eq!(sub.messages_received(), 1);
    assert_eq!(overlay.status(LABEL), Some(Status::ok("1 messages received")));
}

#[test]
fn test_null_handle_is_dropped_silently() {
    let overlay = OverlayState::new(true);
    let frames = StaticFrames::new("map");
    let signals = SignalHub::new();
    let bus = Bus::new();
    let calls = Cell::new(0);
    let ctx = DisplayContext::new(&overlay, &frames, &signals);
    let mut sub =
        FilteredSubscriber::<Detection>::new(LABEL, ctx, &bus, |_| calls.set(calls.get() + 1));

    signals.emit(HostEvent::topic_edited(LABEL, "/detections"));
    sub.spin_once();

    // A publisher of another type shows up after the subscription was made
    let markers = bus.advertise::<Marker>("/detections").unwrap();
    markers.publish(Marker);
    markers.publish(Marker);

    assert_eq!(sub.spin_once(), 0);
    assert_eq!(calls.get(), 0);
    assert_eq!(sub.messages_received(), 0);
    assert_eq!(overlay.status(LABEL), Some(Status::ok("OK")));
}

// --- Idempotence ---

#[test]
fn test_unsubscribe_twice() {
    let overlay = OverlayState::new(true);
    let frames = StaticFrames::new("map");
    let signals = SignalHub::new();
    let bus = Bus::new();
    let ctx = DisplayContext::new(&overlay, &frames, &signals);
    let mut sub = FilteredSubscriber::<Detection>::new(LABEL, ctx, &bus, |_| {});

    signals.emit(HostEvent::topic_edited(LABEL, "/detections"));
    sub.spin_once();
    assert!(sub.is_subscribed());

    sub.unsubscribe();
    sub.unsubscribe();
    assert!(!sub.is_subscribed());
    assert_eq!(bus.subscription_count("/detections"), 0);
    assert_eq!(overlay.status(LABEL), Some(Status::ok("OK")));
}

#[test]
fn test_subscribe_twice_keeps_one_binding() {
    let overlay = OverlayState::new(true);
    let frames = StaticFrames::new("map");
    let signals = SignalHub::new();
    let bus = Bus::new();
    let ctx = DisplayContext::new(&overlay, &frames, &signals);
    let mut sub = FilteredSubscriber::<Detection>::new(LABEL, ctx, &bus, |_| {});

    signals.emit(HostEvent::topic_edited(LABEL, "detections"));
    sub.spin_once();

    sub.subscribe();
    sub.set_enabled(true);
    assert_eq!(bus.subscription_count("/detections"), 1);
    assert_eq!(sub.subscribed_topic(), Some("/detections"));
}

// --- Configuration ---

#[test]
fn test_small_filter_reports_transform_failures() {
    let overlay = OverlayState::new(true);
    let frames = StaticFrames::new("map");
    let signals = SignalHub::new();
    let bus = Bus::new();
    let ctx = DisplayContext::new(&overlay, &frames, &signals);
    let config = SubscriberConfig::from_json(r#"{"filter_capacity": 2}"#).unwrap();
    let mut sub = FilteredSubscriber::<Detection>::with_config(LABEL, ctx, &bus, config, |_| {});

    signals.emit(HostEvent::topic_edited(LABEL, "/detections"));
    sub.spin_once();

    let publisher = bus.advertise::<Detection>("/detections").unwrap();
    for _ in 0..5 {
        publisher.publish(Detection {
            frame: "camera",
            valid: true,
        });
    }
    sub.spin_once();

    assert_eq!(sub.pending(), 2);
    assert_eq!(sub.filter_stats().overflowed, 3);
    assert_eq!(frames.failures().len(), 3);
    assert_eq!(frames.failures()[0].0, LABEL);
}

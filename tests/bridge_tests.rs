//! End-to-end tests for generated bridges over an in-process channel.
//!
//! These tests exercise the full protocol: proxy construction (bootstrap
//! script + result sink), invocation encoding, callback registration, and
//! inbound envelope dispatch.

use goldengate::{
    BridgeError, BridgeResult, CallbackHandle, ResultSink, ScriptChannel, bridge,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// Records everything the bridge sends and lets tests play the script side.
#[derive(Default)]
struct RecordingChannel {
    evaluated: Mutex<Vec<String>>,
    sinks: Mutex<HashMap<String, Arc<dyn ResultSink>>>,
}

impl ScriptChannel for RecordingChannel {
    fn evaluate(&self, expression: &str) {
        self.evaluated.lock().unwrap().push(expression.to_owned());
    }

    fn register_result_sink(&self, name: &str, sink: Arc<dyn ResultSink>) {
        self.sinks.lock().unwrap().insert(name.to_owned(), sink);
    }
}

impl RecordingChannel {
    fn evaluated(&self) -> Vec<String> {
        self.evaluated.lock().unwrap().clone()
    }

    fn sink_names(&self) -> Vec<String> {
        self.sinks.lock().unwrap().keys().cloned().collect()
    }

    /// Post an envelope to the sink registered under `interface`, the way
    /// script code would.
    fn deliver(&self, interface: &str, envelope: &str) {
        let sink = self.sinks.lock().unwrap().get(interface).cloned();
        sink.expect("no sink registered").on_result(envelope);
    }
}

fn collecting_handle<T: Send + 'static>() -> (CallbackHandle<T>, Arc<Mutex<Vec<T>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handle = CallbackHandle::new(move |value: T| {
        sink.lock().unwrap().push(value);
    });
    (handle, seen)
}

// =============================================================================
// Interfaces under test
// =============================================================================

#[bridge]
pub trait Foo {
    fn bar(&self, x: i32, cb: &CallbackHandle<String>) -> BridgeResult<()>;
}

#[bridge]
pub trait Logger {
    fn log(&self, line: String) -> BridgeResult<()>;
    fn clear(&self);
}

#[bridge]
pub trait Downloads {
    fn download(&self, url: String, #[callback] progress: &CallbackHandle<u32>)
    -> BridgeResult<()>;
}

#[bridge(debug)]
pub trait Player {
    #[bridge(name = "playTrack")]
    fn play(&self, track_id: u64) -> BridgeResult<()>;

    #[bridge(property, name = "title")]
    fn title(&self, result: &CallbackHandle<String>) -> BridgeResult<()>;

    #[bridge(property, name = "volume")]
    fn set_volume(&self, volume: f32) -> BridgeResult<()>;
}

#[bridge]
pub trait Exporter {
    fn export(&self, table: BTreeMap<(u8, u8), u8>);
    fn export_strict(&self, table: BTreeMap<(u8, u8), u8>) -> BridgeResult<()>;
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_callback_interface_bootstraps_before_any_call() {
    let channel = Arc::new(RecordingChannel::default());
    let foo = FooBridge::new(channel.clone());

    let (cb, _seen) = collecting_handle::<String>();
    foo.bar(5, &cb).unwrap();

    let evaluated = channel.evaluated();
    assert_eq!(evaluated.len(), 2);
    assert!(evaluated[0].starts_with("function GoldenGate$$CreateCallback(receiver)"));
    assert_eq!(channel.sink_names(), ["Foo"]);
}

#[test]
fn test_pure_fire_and_forget_interface_installs_no_result_path() {
    let channel = Arc::new(RecordingChannel::default());
    let logger = LoggerBridge::new(channel.clone());

    assert!(!LoggerBridge::descriptor().needs_callbacks());

    logger.log("ready".to_string()).unwrap();
    logger.clear();

    // No bootstrap script, no sink: just the two calls.
    assert_eq!(
        channel.evaluated(),
        [r#"log("ready")"#.to_string(), "clear()".to_string()]
    );
    assert!(channel.sink_names().is_empty());
}

// =============================================================================
// Encoding and correlation
// =============================================================================

#[test]
fn test_call_expression_embeds_serialized_args_and_callback_ref() {
    let channel = Arc::new(RecordingChannel::default());
    let foo = FooBridge::new(channel.clone());

    let (cb, _seen) = collecting_handle::<String>();
    foo.bar(5, &cb).unwrap();

    assert_eq!(
        channel.evaluated()[1],
        "bar(5, GoldenGate$$CreateCallback(1))"
    );
}

#[test]
fn test_ids_are_distinct_and_increasing_across_calls() {
    let channel = Arc::new(RecordingChannel::default());
    let foo = FooBridge::new(channel.clone());

    let (cb, _seen) = collecting_handle::<String>();
    for _ in 0..3 {
        foo.bar(1, &cb).unwrap();
    }

    let evaluated = channel.evaluated();
    assert_eq!(evaluated[1], "bar(1, GoldenGate$$CreateCallback(1))");
    assert_eq!(evaluated[2], "bar(1, GoldenGate$$CreateCallback(2))");
    assert_eq!(evaluated[3], "bar(1, GoldenGate$$CreateCallback(3))");
}

#[test]
fn test_result_round_trip_delivers_typed_payload_exactly_once() {
    let channel = Arc::new(RecordingChannel::default());
    let foo = FooBridge::new(channel.clone());

    let (cb, seen) = collecting_handle::<String>();
    foo.bar(5, &cb).unwrap();

    channel.deliver("Foo", r#"{"receiver":1,"result":"\"done\""}"#);
    assert_eq!(seen.lock().unwrap().as_slice(), ["done"]);
}

#[test]
fn test_unknown_receiver_is_a_no_op() {
    let channel = Arc::new(RecordingChannel::default());
    let foo = FooBridge::new(channel.clone());

    let (cb, seen) = collecting_handle::<String>();
    foo.bar(5, &cb).unwrap();

    channel.deliver("Foo", r#"{"receiver":999,"result":"\"lost\""}"#);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_dropped_handle_silently_cancels_delivery() {
    let channel = Arc::new(RecordingChannel::default());
    let foo = FooBridge::new(channel.clone());

    let (cb, seen) = collecting_handle::<String>();
    foo.bar(5, &cb).unwrap();
    drop(cb);

    channel.deliver("Foo", r#"{"receiver":1,"result":"\"late\""}"#);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_malformed_envelopes_do_not_affect_later_deliveries() {
    let channel = Arc::new(RecordingChannel::default());
    let foo = FooBridge::new(channel.clone());

    let (cb, seen) = collecting_handle::<String>();
    foo.bar(5, &cb).unwrap();

    channel.deliver("Foo", "not json at all");
    channel.deliver("Foo", r#"{"result":"\"missing receiver\""}"#);
    channel.deliver("Foo", r#"{"receiver":"one","result":"1"}"#);
    channel.deliver("Foo", r#"{"receiver":1,"result":"\"done\""}"#);

    assert_eq!(seen.lock().unwrap().as_slice(), ["done"]);
}

// =============================================================================
// Script-invocable callback parameters
// =============================================================================

#[test]
fn test_invocable_parameter_can_receive_many_results() {
    let channel = Arc::new(RecordingChannel::default());
    let downloads = DownloadsBridge::new(channel.clone());

    let (progress, seen) = collecting_handle::<u32>();
    downloads
        .download("https://example.com/archive".to_string(), &progress)
        .unwrap();

    assert_eq!(
        channel.evaluated()[1],
        r#"download("https://example.com/archive", GoldenGate$$CreateCallback(1))"#
    );

    channel.deliver("Downloads", r#"{"receiver":1,"result":"10"}"#);
    channel.deliver("Downloads", r#"{"receiver":1,"result":"55"}"#);
    channel.deliver("Downloads", r#"{"receiver":1,"result":"100"}"#);

    assert_eq!(seen.lock().unwrap().as_slice(), [10, 55, 100]);
}

// =============================================================================
// Properties and renamed methods
// =============================================================================

#[test]
fn test_renamed_method_uses_script_name_in_the_expression() {
    let channel = Arc::new(RecordingChannel::default());
    let player = PlayerBridge::new(channel.clone());

    player.play(9).unwrap();
    assert_eq!(channel.evaluated()[1], "playTrack(9)");
}

#[test]
fn test_property_read_applies_the_callback_to_the_property() {
    let channel = Arc::new(RecordingChannel::default());
    let player = PlayerBridge::new(channel.clone());

    let (title, seen) = collecting_handle::<String>();
    player.title(&title).unwrap();

    assert_eq!(
        channel.evaluated()[1],
        "GoldenGate$$CreateCallback(1)(title)"
    );

    channel.deliver("Player", r#"{"receiver":1,"result":"\"Night Drive\""}"#);
    assert_eq!(seen.lock().unwrap().as_slice(), ["Night Drive"]);
}

#[test]
fn test_property_write_assigns_the_serialized_value() {
    let channel = Arc::new(RecordingChannel::default());
    let player = PlayerBridge::new(channel.clone());

    player.set_volume(0.5).unwrap();
    assert_eq!(channel.evaluated()[1], "volume = 0.5");
}

// =============================================================================
// Encode failures
// =============================================================================

fn unserializable() -> BTreeMap<(u8, u8), u8> {
    // Non-string map keys cannot become JSON object keys.
    let mut table = BTreeMap::new();
    table.insert((1, 2), 3);
    table
}

#[test]
fn test_encode_failure_propagates_to_the_caller() {
    let channel = Arc::new(RecordingChannel::default());
    let exporter = ExporterBridge::new(channel.clone());

    let err = exporter.export_strict(unserializable()).unwrap_err();
    assert!(matches!(err, BridgeError::Encode(_)));
    assert!(channel.evaluated().is_empty());
}

#[test]
fn test_encode_failure_in_fire_and_forget_method_drops_the_call() {
    let channel = Arc::new(RecordingChannel::default());
    let exporter = ExporterBridge::new(channel.clone());

    exporter.export(unserializable());
    assert!(channel.evaluated().is_empty());
}

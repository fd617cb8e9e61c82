//! Minimal end-to-end demo: a bridged trait over an in-process script host.
//!
//! The fake engine below stands in for whatever hosts script execution in a
//! real deployment (a WebView, an embedded JS runtime). It understands a
//! single call shape, `add(a, b, <callback>)`, and replies through the
//! registered result sink exactly the way the script-side callback factory
//! would.
//!
//! Run with `RUST_LOG=goldengate=debug cargo run --example basic` to see the
//! generated invocations.

use goldengate::{
    BridgeResult, CallbackHandle, ResultEnvelope, ResultSink, ScriptChannel, bridge,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[bridge(debug)]
pub trait Calculator {
    fn add(&self, a: i64, b: i64, result: &CallbackHandle<i64>) -> BridgeResult<()>;
}

#[derive(Default)]
struct FakeScriptEngine {
    sinks: Mutex<HashMap<String, Arc<dyn ResultSink>>>,
}

impl FakeScriptEngine {
    /// "Execute" an add call and produce the reply envelope.
    fn run(&self, expression: &str) -> Option<String> {
        let args = expression.strip_prefix("add(")?.strip_suffix(")")?;
        let mut parts = args.split(", ");
        let a: i64 = parts.next()?.parse().ok()?;
        let b: i64 = parts.next()?.parse().ok()?;
        let receiver: u64 = parts
            .next()?
            .strip_prefix("GoldenGate$$CreateCallback(")?
            .strip_suffix(")")?
            .parse()
            .ok()?;

        let envelope = ResultEnvelope::from_value(receiver, &(a + b)).ok()?;
        envelope.to_wire().ok()
    }
}

impl ScriptChannel for FakeScriptEngine {
    fn evaluate(&self, expression: &str) {
        // The bootstrap script defines the script-side callback factory;
        // an in-process host has nothing to install.
        if expression.starts_with("function") {
            return;
        }
        if let Some(reply) = self.run(expression) {
            let sink = self.sinks.lock().unwrap().get("Calculator").cloned();
            if let Some(sink) = sink {
                sink.on_result(&reply);
            }
        }
    }

    fn register_result_sink(&self, name: &str, sink: Arc<dyn ResultSink>) {
        self.sinks.lock().unwrap().insert(name.to_owned(), sink);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("goldengate=debug")),
        )
        .init();

    let engine = Arc::new(FakeScriptEngine::default());
    let calculator = CalculatorBridge::new(engine);

    let result = CallbackHandle::new(|sum: i64| println!("2 + 3 = {sum}"));
    calculator.add(2, 3, &result).expect("encode add call");
}

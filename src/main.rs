//! Quick Actions Bridge - latency showcase
//!
//! Mengukur:
//! - Encode/decode payload `setShortcutItems`
//! - Round-trip call lewat `LocalMessenger` (in-process)

use std::sync::Arc;
use std::time::Instant;

use quick_actions_bridge::api::{
    HandlerError, IosQuickActionsApi, IosQuickActionsApiClient, IosQuickActionsApiSetup,
};
use quick_actions_bridge::core::LocalMessenger;
use quick_actions_bridge::protocol::{
    messages_codec, Encoder, MessageCodec, ShortcutItemMessage, Value,
};

fn main() {
    println!("🚀 Quick Actions Bridge - Showcase");
    println!("==================================\n");

    benchmark_codec();
    benchmark_loopback();

    println!("\n✅ All benchmarks complete!");
    println!("\nTo start a host: cargo run --release --bin quick_actions_host");
}

fn sample_items(n: usize) -> Vec<ShortcutItemMessage> {
    (0..n)
        .map(|i| {
            ShortcutItemMessage::new(
                format!("action_{i}"),
                format!("Action {i}"),
                (i % 2 == 0).then(|| format!("icon_{i}")),
            )
        })
        .collect()
}

fn benchmark_codec() {
    println!("📊 Codec Benchmark (setShortcutItems payload, 4 items)");
    println!("------------------------------------------------------");

    const ITERATIONS: usize = 200_000;
    let codec = messages_codec();
    let items: Vec<Value> = sample_items(4).into_iter().map(Value::from).collect();
    let message = Value::List(vec![Value::List(items)]);

    // Encoder dipakai ulang, tidak ada alokasi setelah warm up
    let mut encoder = Encoder::new(1024);
    let start = Instant::now();
    for _ in 0..ITERATIONS {
        encoder.reset();
        if let Err(e) = codec.encode_into(&mut encoder, &message) {
            eprintln!("❌ Encode failed: {}", e);
            return;
        }
    }
    let encode_duration = start.elapsed();
    let encoded = encoder.as_bytes().to_vec();

    let start = Instant::now();
    for _ in 0..ITERATIONS {
        if codec.decode_message(Some(encoded.as_slice())).is_err() {
            eprintln!("❌ Decode failed");
            return;
        }
    }
    let decode_duration = start.elapsed();

    let encode_ns = encode_duration.as_nanos() as f64 / ITERATIONS as f64;
    let decode_ns = decode_duration.as_nanos() as f64 / ITERATIONS as f64;

    println!("  Message size:   {} bytes", encoded.len());
    println!("  Operations:     {}", ITERATIONS);
    println!(
        "  Encode latency: {:.2} ns/op ({:.3} μs/op)",
        encode_ns,
        encode_ns / 1000.0
    );
    println!(
        "  Decode latency: {:.2} ns/op ({:.3} μs/op)\n",
        decode_ns,
        decode_ns / 1000.0
    );
}

/// Host API yang tidak melakukan apa-apa
struct NoopApi;

impl IosQuickActionsApi for NoopApi {
    fn set_shortcut_items(
        &self,
        _items_list: Vec<ShortcutItemMessage>,
    ) -> Result<(), HandlerError> {
        Ok(())
    }

    fn clear_shortcut_items(&self) -> Result<(), HandlerError> {
        Ok(())
    }
}

fn benchmark_loopback() {
    println!("📊 Loopback Call Benchmark (LocalMessenger)");
    println!("-------------------------------------------");

    const ITERATIONS: usize = 100_000;
    let messenger = Arc::new(LocalMessenger::new());
    IosQuickActionsApiSetup::set_up(messenger.clone(), Some(Arc::new(NoopApi)), "");
    let client = IosQuickActionsApiClient::new(messenger, "");
    let items = sample_items(4);

    let start = Instant::now();
    for _ in 0..ITERATIONS {
        if let Err(e) = client.set_shortcut_items_sync(&items) {
            eprintln!("❌ Call failed: {}", e);
            return;
        }
    }
    let duration = start.elapsed();

    let call_ns = duration.as_nanos() as f64 / ITERATIONS as f64;
    println!("  Calls:          {}", ITERATIONS);
    println!(
        "  Call latency:   {:.2} ns/call ({:.3} μs/call)",
        call_ns,
        call_ns / 1000.0
    );
    println!(
        "  Throughput:     {:.2} K calls/sec",
        ITERATIONS as f64 / duration.as_secs_f64() / 1_000.0
    );
}

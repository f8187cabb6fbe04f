//! End-to-end smoke run over embedded fixtures: declare a signature set,
//! push realistic documents through it, and double-check the textual
//! round trip plus default construction. `cargo run -p dev-test-runner`.

use runtype::{NewOptions, Signatures, Value};
use serde_json::json;

fn event_signatures() -> Signatures {
    let source = r#"{
        "event.id": "Integer",
        "event.tags": "Array[String]",
        "event.points": "Array[Array[Float]]",
        "event.payload": "Map[String, Untyped]",
        "event.batch": "Array[Union[Integer, Nil]]",
        "event.raw": "Array[Untyped]"
    }"#;
    Signatures::from_json(source).expect("embedded signature file must parse")
}

/// Event-feed samples: (signature, document, should it validate).
fn samples() -> Vec<(&'static str, serde_json::Value, bool)> {
    vec![
        ("event.id", json!(42), true),
        ("event.id", json!("42"), false),
        ("event.tags", json!(["alpha", "beta"]), true),
        ("event.tags", json!([]), true),
        ("event.tags", json!(["alpha", 7]), false),
        ("event.tags", json!("alpha"), false),
        ("event.points", json!([[37.4219, -122.0840], [37.0, -122.0]]), true),
        ("event.points", json!([[37.4219, "x"]]), false),
        ("event.payload", json!({"seen": true, "retries": 3}), true),
        ("event.payload", json!(["not", "a", "mapping"]), false),
        ("event.batch", json!([1, null, 3]), true),
        ("event.batch", json!([1, 2.5]), false),
        ("event.raw", json!([1, "mixed", null, [2]]), true),
        ("event.raw", json!({"k": 1}), false),
    ]
}

fn main() {
    let sigs = event_signatures();
    let mut failures = 0usize;

    // 1) validation matrix over the embedded samples
    for (name, doc, want) in samples() {
        let descriptor = sigs.get(name).expect("sample names a declared signature");
        let got = descriptor.validate(&Value::from(&doc));
        if got == want {
            println!("ok   {name}: {} vs {doc}", descriptor.name());
        } else {
            failures += 1;
            println!("BAD  {name}: {} vs {doc} (want {want}, got {got})", descriptor.name());
        }
    }

    // 2) rendered names parse back to the same descriptor
    for (name, descriptor) in sigs.iter() {
        let rendered = descriptor.name();
        match runtype::parse_type(&rendered) {
            Ok(back) if &back == descriptor => println!("ok   {name}: `{rendered}` round-trips"),
            _ => {
                failures += 1;
                println!("BAD  {name}: `{rendered}` does not round-trip");
            }
        }
    }

    // 3) defaults of concrete shapes validate out of the box
    for name in ["event.tags", "event.points", "event.payload"] {
        let descriptor = sigs.get(name).expect("name is declared above");
        match descriptor.empty_instance(&NewOptions::default()) {
            Ok(built) if descriptor.validate(&built) => {
                println!("ok   {name}: default is {}", built.to_json());
            }
            other => {
                failures += 1;
                println!("BAD  {name}: unexpected default {other:?}");
            }
        }
    }

    if failures > 0 {
        eprintln!("{failures} smoke check(s) failed");
        std::process::exit(1);
    }
    println!("all smoke checks passed");
}

use chrono::{TimeZone, Utc};
use json_gen::{
    encode, Coder, EncodeOptions, Error, Extension, RawWriter, Repr, Result, Shared,
    UnsupportedPolicy, Value,
};
use std::fmt;

/// Declines every representation.
#[derive(Debug)]
struct Socket(u16);

impl fmt::Display for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Socket port={}>", self.0)
    }
}

impl Extension for Socket {
    fn type_name(&self) -> &'static str {
        "Socket"
    }
}

/// Writes itself directly.
#[derive(Debug)]
struct Money {
    cents: i64,
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}c", self.cents)
    }
}

impl Extension for Money {
    fn to_json(&self, out: &mut RawWriter<'_>) -> Result<Repr> {
        out.write_f64(self.cents as f64 / 100.0)?;
        Ok(Repr::Written)
    }
}

/// Hands back a substitute tree.
#[derive(Debug)]
struct Point {
    x: i64,
    y: i64,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Extension for Point {
    fn to_json(&self, _out: &mut RawWriter<'_>) -> Result<Repr> {
        let mut map = json_gen::Map::new();
        map.insert("x".to_string(), self.x.into());
        map.insert("y".to_string(), self.y.into());
        Ok(Repr::Value(Value::Object(map)))
    }
}

/// Starts writing, then changes its mind.
#[derive(Debug)]
struct Fickle;

impl fmt::Display for Fickle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fickle")
    }
}

impl Extension for Fickle {
    fn to_json(&self, out: &mut RawWriter<'_>) -> Result<Repr> {
        out.write_str("half-written");
        Ok(Repr::Unsupported)
    }
}

/// Claims to have written but did not.
#[derive(Debug)]
struct Liar;

impl fmt::Display for Liar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("liar")
    }
}

impl Extension for Liar {
    fn to_json(&self, _out: &mut RawWriter<'_>) -> Result<Repr> {
        Ok(Repr::Written)
    }
}

/// Carries raw bytes that may not be UTF-8.
#[derive(Debug)]
struct RawText(Vec<u8>);

impl fmt::Display for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.0.len())
    }
}

impl Extension for RawText {
    fn to_json(&self, out: &mut RawWriter<'_>) -> Result<Repr> {
        out.write_text_bytes(&self.0)?;
        Ok(Repr::Written)
    }
}

fn with_policy(policy: UnsupportedPolicy) -> EncodeOptions {
    EncodeOptions::new().with_unsupported_policy(policy)
}

#[test]
fn test_fail_policy_still_runs_hooks() {
    let options = with_policy(UnsupportedPolicy::Fail);
    let value = Value::Array(vec![
        Value::extension(Money { cents: 1 }),
        Value::extension(Point { x: 1, y: 2 }),
    ]);
    assert_eq!(encode(&value, &options).unwrap(), br#"[0.01,{"x":1,"y":2}]"#);

    let err = encode(&Value::extension(Socket(80)), &options).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(_)));
}

#[test]
fn test_fail_policy_uses_coder_fallback() {
    let coder = Coder::new(with_policy(UnsupportedPolicy::Fail))
        .with_fallback(|_: &dyn Extension| Some(Value::from("fb")));
    assert_eq!(coder.dump(&Value::extension(Socket(80))).unwrap(), br#""fb""#);
    assert_eq!(coder.dump(&Value::extension(Fickle)).unwrap(), br#""fb""#);
}

#[test]
fn test_call_extension_written_and_substituted() {
    let options = EncodeOptions::default();
    let value = Value::Array(vec![
        Value::extension(Money { cents: 1999 }),
        Value::extension(Point { x: 1, y: -2 }),
    ]);
    let json = encode(&value, &options).unwrap();
    assert_eq!(json, br#"[19.99,{"x":1,"y":-2}]"#);
}

#[test]
fn test_call_extension_rejects_unrepresentable() {
    let options = EncodeOptions::default();
    let err = encode(&Value::extension(Socket(80)), &options).unwrap_err();
    match err {
        Error::UnsupportedType(name) => assert_eq!(name, "Socket"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_stringify_uses_display() {
    let options = with_policy(UnsupportedPolicy::Stringify);
    let value = Value::Array(vec![Value::extension(Socket(8080)), Value::extension(Fickle)]);
    let json = encode(&value, &options).unwrap();
    assert_eq!(json, br##"["#<Socket port=8080>","fickle"]"##);
}

#[test]
fn test_partial_write_is_discarded() {
    let options = EncodeOptions::default();
    let err = encode(&Value::extension(Fickle), &options).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(_)));
}

#[test]
fn test_written_without_output_is_rejected() {
    let options = with_policy(UnsupportedPolicy::Stringify);
    let err = encode(&Value::extension(Liar), &options).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(_)));
}

#[test]
fn test_invalid_bytes_from_hook() {
    let options = EncodeOptions::default();
    let good = encode(&Value::extension(RawText(b"ok".to_vec())), &options).unwrap();
    assert_eq!(good, b"\"ok\"");

    let bad = Value::Array(vec![
        Value::from("before"),
        Value::extension(RawText(vec![b'a', 0xC3, 0x28])),
    ]);
    let err = encode(&bad, &options).unwrap_err();
    assert!(matches!(err, Error::InvalidEncoding { offset: 1 }));
}

#[test]
fn test_hook_errors_propagate() {
    let options = EncodeOptions::default();
    let large = encode(&Value::extension(Money { cents: i64::MAX }), &options);
    assert!(large.is_ok());

    #[derive(Debug)]
    struct NotANumber;

    impl fmt::Display for NotANumber {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("nan")
        }
    }

    impl Extension for NotANumber {
        fn to_json(&self, out: &mut RawWriter<'_>) -> Result<Repr> {
            out.write_f64(f64::NAN)?;
            Ok(Repr::Written)
        }
    }

    let err = encode(&Value::extension(NotANumber), &options).unwrap_err();
    assert!(matches!(err, Error::NonFiniteFloat { .. }));
}

#[test]
fn test_coder_fallback_order() {
    let coder = Coder::new(EncodeOptions::default()).with_fallback(|ext: &dyn Extension| {
        (ext.type_name() == "Socket").then(|| Value::from(ext.to_string()))
    });

    // The node's own hook wins over the fallback.
    let json = coder.dump(&Value::extension(Point { x: 0, y: 0 })).unwrap();
    assert_eq!(json, br#"{"x":0,"y":0}"#);

    let json = coder.dump(&Value::extension(Socket(22))).unwrap();
    assert_eq!(json, br##""#<Socket port=22>""##);

    assert!(coder.dump(&Value::extension(Fickle)).is_err());
}

#[test]
fn test_datetime_extension() {
    let ts = Utc.with_ymd_and_hms(2023, 11, 5, 8, 0, 30).unwrap();
    let json = encode(&Value::from(vec![Value::from(ts)]), &EncodeOptions::default()).unwrap();
    assert_eq!(json, br#"["2023-11-05T08:00:30+00:00"]"#);
}

#[test]
fn test_substitute_depth_and_cycles() {
    #[derive(Debug)]
    struct Pointer(Value);

    impl fmt::Display for Pointer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("pointer")
        }
    }

    impl Extension for Pointer {
        fn to_json(&self, _out: &mut RawWriter<'_>) -> Result<Repr> {
            Ok(Repr::Value(self.0.clone()))
        }
    }

    let options = EncodeOptions::new().with_max_nesting_depth(2);
    let ok = Value::extension(Pointer(Value::Array(vec![Value::from(1)])));
    assert_eq!(encode(&ok, &options).unwrap(), b"[1]");

    let too_deep = Value::extension(Pointer(Value::Array(vec![Value::Array(vec![])])));
    assert!(matches!(
        encode(&too_deep, &options),
        Err(Error::DepthExceeded { .. })
    ));

    let slot = Shared::new(Value::Null);
    let looped = Value::extension(Pointer(Value::Shared(slot.clone())));
    slot.replace(looped.clone());
    let err = encode(&looped, &EncodeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::CyclicStructure { .. }));
    slot.replace(Value::Null);
}

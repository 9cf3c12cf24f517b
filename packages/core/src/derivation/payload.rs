//! Typed accessors over schema-less RPC payloads.
//!
//! Nodes are loose about number encodings (floats for counts, strings for
//! large atomic amounts), so numeric accessors accept any of them.

use serde_json::Value;

pub trait PayloadExt {
    /// Walk nested object members.
    fn at(&self, path: &[&str]) -> Option<&Value>;

    fn f64_at(&self, path: &[&str]) -> Option<f64> {
        self.at(path).and_then(lenient_f64)
    }

    fn u64_at(&self, path: &[&str]) -> Option<u64> {
        self.at(path).and_then(lenient_u64)
    }

    fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.at(path).and_then(Value::as_str)
    }

    fn bool_at(&self, path: &[&str]) -> Option<bool> {
        self.at(path).and_then(Value::as_bool)
    }
}

impl PayloadExt for Value {
    fn at(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |node, key| node.get(*key))
    }
}

/// Number, or a string holding one.
pub fn lenient_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Non-negative integer; floats are truncated, numeric strings parsed.
pub fn lenient_u64(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    if let Value::String(s) = value {
        if let Ok(n) = s.trim().parse::<u64>() {
            return Some(n);
        }
    }
    lenient_f64(value)
        .filter(|v| *v >= 0.0)
        .map(|v| v.trunc() as u64)
}

//! Tolerant decoding for document data written by hand, by older clients, or by the AI.
//!
//! `null` is treated as "absent" so serde defaults apply, and numeric fields accept any
//! JSON number (rounded), a numeric string, or anything else as zero.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Removes every `null`-valued object key, recursively.
pub fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

fn whole_number(value: &Value) -> Option<i64> {
    let float = match value {
        Value::Number(n) => match n.as_i64() {
            Some(int) => return Some(int),
            None => n.as_f64()?,
        },
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    float.is_finite().then(|| float.round() as i64)
}

fn to_u32(n: i64) -> u32 {
    n.clamp(0, i64::from(u32::MAX)) as u32
}

fn to_i32(n: i64) -> i32 {
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

pub fn u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(whole_number(&value).map(to_u32).unwrap_or_default())
}

pub fn i32_or_zero<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(whole_number(&value).map(to_i32).unwrap_or_default())
}

/// For partial updates: unusable values mean "leave the field alone".
pub fn optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(whole_number(&value).map(to_u32))
}

//! Core types for the bookmark tree engine.

use chrono::Utc;
use uuid::Uuid;

/// NodeId: opaque, globally unique identifier of a folder or link
pub type NodeId = String;

/// Parent id sentinel for nodes living at the top level
pub const ROOT: &str = "";

/// Epoch-millisecond timestamp; `0` means "never"
pub type Millis = i64;

/// Current wall clock time in epoch milliseconds
pub fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

/// Generate a fresh node id that `taken` reports as unused.
///
/// The id is a base-36 millisecond timestamp followed by eight random hex
/// digits, so ids sort roughly by creation time and two ids minted in the same
/// millisecond still differ.
pub fn generate_node_id(mut taken: impl FnMut(&str) -> bool) -> NodeId {
    loop {
        let random = Uuid::new_v4().simple().to_string();
        let id = format!("{}{}", to_base36(now_millis().max(0) as u64), &random[..8]);
        if !taken(&id) {
            return id;
        }
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

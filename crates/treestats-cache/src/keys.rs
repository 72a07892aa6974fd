use treestats_core::StatKind;

// Bytes that pass through unescaped besides ASCII alphanumerics; the
// URI-reserved set item keys are normalized against.
const SAFE: &[u8] = b"/#[]=:;$&()+,!?*@'~-_.";

/// Builds the store key for one statistic on one node:
/// `<item key>:<statistic name>`, escaped so any item key maps to a
/// store-safe string.
pub fn stat_cache_key(item_key: &str, stat: StatKind) -> String {
    encode_key(&format!("{}:{}", item_key, stat.as_str()))
}

fn encode_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for &byte in raw.as_bytes() {
        if byte.is_ascii_alphanumeric() || SAFE.contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

//! Deterministic checksum over a canonicalized archive entry enumeration
//! (§4.6), excluding the checksum entry itself. Entries are fed in
//! path-sorted order so the result doesn't depend on archive iteration
//! order, matching P1 ("entry contents must match after per-file
//! canonicalization").

/// `entries` is `(canonicalized relative path, raw bytes)`; the caller has
/// already excluded the checksum entry (§4.6).
#[must_use]
pub fn compute(entries: &[(String, Vec<u8>)]) -> String {
    let mut sorted: Vec<&(String, Vec<u8>)> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut ctx = md5::Context::new();
    for (path, bytes) in sorted {
        ctx.consume(path.as_bytes());
        ctx.consume([0u8]);
        ctx.consume(bytes);
    }

    format!("{:x}", ctx.compute())
}

pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

// 2^64 is exactly representable as an f64; u64::MAX is not.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Converts a size in megabytes to a byte count, truncating any fraction of
/// a byte.
///
/// Sizes that are negative, not finite, or whose byte count would not fit in
/// a `u64` are rejected rather than wrapped.
pub fn bytes_from_megabytes(megabytes: f64) -> anyhow::Result<u64> {
    if !megabytes.is_finite() {
        anyhow::bail!("size {megabytes} MB is not a finite number");
    }
    if megabytes < 0.0 {
        anyhow::bail!("size {megabytes} MB is negative");
    }
    let bytes = (megabytes * BYTES_PER_MEGABYTE).trunc();
    if bytes >= U64_LIMIT {
        anyhow::bail!("size {megabytes} MB does not fit in a 64-bit byte count");
    }
    Ok(bytes as u64)
}

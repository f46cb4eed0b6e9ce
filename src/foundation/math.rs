/// Deterministic per-pixel hash, used for procedural grain.
pub(crate) fn hash_xy(seed: u64, x: u32, y: u32) -> u32 {
    let key = (u64::from(x) << 32) | u64::from(y);
    let v = xxhash_rust::xxh3::xxh3_64_with_seed(&key.to_le_bytes(), seed);
    (v ^ (v >> 32)) as u32
}

/// `x * y / 255`, rounded to nearest.
pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u8
}

/// Clamp a float to `[0, 1]`, treating non-finite input as `0`.
pub(crate) fn unit(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

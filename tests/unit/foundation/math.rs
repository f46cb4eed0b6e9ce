use super::*;

#[test]
fn hash_xy_is_deterministic_and_position_sensitive() {
    assert_eq!(hash_xy(7, 3, 4), hash_xy(7, 3, 4));
    assert_ne!(hash_xy(7, 3, 4), hash_xy(7, 4, 3));
    assert_ne!(hash_xy(7, 3, 4), hash_xy(8, 3, 4));
}

#[test]
fn hash_xy_spreads_low_bytes() {
    let distinct: std::collections::BTreeSet<u32> =
        (0..64).map(|x| hash_xy(1, x, 0) & 0xff).collect();
    assert!(distinct.len() > 32);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(0, 200), 0);
    assert_eq!(mul_div255_u8(1, 128), 1);
}

#[test]
fn unit_clamps_and_rejects_nan() {
    assert_eq!(unit(1.5), 1.0);
    assert_eq!(unit(-0.5), 0.0);
    assert_eq!(unit(f64::NAN), 0.0);
}

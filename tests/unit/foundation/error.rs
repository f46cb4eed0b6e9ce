use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BackdropError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        BackdropError::precondition("x")
            .to_string()
            .contains("precondition failed:")
    );
    assert!(BackdropError::asset("x").to_string().contains("asset error:"));
    assert!(
        BackdropError::capture("x")
            .to_string()
            .contains("capture error:")
    );
    assert!(BackdropError::encode("x").to_string().contains("encode error:"));
    assert!(
        BackdropError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BackdropError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_precondition_reports_precondition() {
    assert!(BackdropError::precondition("no card").is_precondition());
    assert!(!BackdropError::capture("no card").is_precondition());
}

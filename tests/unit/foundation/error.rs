use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PlasmaError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(PlasmaError::spawn("x").to_string().contains("spawn error:"));
    assert!(
        PlasmaError::connection("x")
            .to_string()
            .contains("connection error:")
    );
    assert!(
        PlasmaError::protocol("x")
            .to_string()
            .contains("protocol error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PlasmaError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_connection_errors_poison_a_stream() {
    assert!(PlasmaError::connection("eof").is_connection());
    assert!(!PlasmaError::protocol("size").is_connection());
    assert!(!PlasmaError::validation("fps").is_connection());
}

//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("queue submission failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("queue submission failed"));
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("copy from default back buffer".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("copy from default back buffer"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("glow target".to_string());
    assert_eq!(format!("{}", err), "Initialization failed: glow target");
}

#[test]
fn test_not_found_display() {
    let err = Error::NotFound("RenderQueue 'Opaque'".to_string());
    assert_eq!(format!("{}", err), "Not found: RenderQueue 'Opaque'");
}

#[test]
fn test_invalid_range_display() {
    let err = Error::InvalidRange("end queue 'Missing' not found".to_string());
    let display = format!("{}", err);
    assert!(display.starts_with("Invalid range"));
    assert!(display.contains("Missing"));
}

#[test]
fn test_degenerate_geometry_display() {
    let err = Error::DegenerateGeometry("up parallel to forward".to_string());
    assert!(format!("{}", err).contains("Degenerate geometry"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::NotFound("x".to_string());
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let debug = format!("{:?}", Error::InvalidRange("r".to_string()));
    assert!(debug.contains("InvalidRange"));

    let debug = format!("{:?}", Error::DegenerateGeometry("g".to_string()));
    assert!(debug.contains("DegenerateGeometry"));
}

#[test]
fn test_error_clone_and_eq() {
    let err1 = Error::BackendError("test".to_string());
    let err2 = err1.clone();
    assert_eq!(err1, err2);
    assert_ne!(err1, Error::NotFound("test".to_string()));
}

// ============================================================================
// RESULT ALIAS
// ============================================================================

#[test]
fn test_result_question_mark_propagation() {
    fn inner() -> Result<u32> {
        Err(Error::NotFound("inner".to_string()))
    }
    fn outer() -> Result<u32> {
        let value = inner()?;
        Ok(value + 1)
    }

    assert_eq!(outer(), Err(Error::NotFound("inner".to_string())));
}

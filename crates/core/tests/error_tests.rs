// ═══════════════════════════════════════════════════════════════════
// Error type tests — display messages and conversions
// ═══════════════════════════════════════════════════════════════════

use stockfolio_core::errors::CoreError;

mod display {
    use super::*;

    #[test]
    fn validation_carries_the_reason() {
        let err = CoreError::Validation("Quantity must be positive, got -1".into());
        assert_eq!(
            err.to_string(),
            "Validation failed: Quantity must be positive, got -1"
        );
    }

    #[test]
    fn holding_not_found_carries_the_id() {
        let err = CoreError::HoldingNotFound("12345".into());
        assert_eq!(err.to_string(), "Holding not found: 12345");
    }

    #[test]
    fn quote_unavailable_names_the_symbol() {
        let err = CoreError::QuoteUnavailable("AAPL".into());
        assert_eq!(err.to_string(), "Quote unavailable for AAPL");
    }

    #[test]
    fn api_error_names_the_provider() {
        let err = CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: "timeout".into(),
        };
        assert_eq!(err.to_string(), "API error (Yahoo Finance): timeout");
    }

    #[test]
    fn unsupported_version_shows_the_version() {
        assert_eq!(
            CoreError::UnsupportedVersion(7).to_string(),
            "Unsupported file version: 7"
        );
    }
}

mod conversions {
    use super::*;

    #[test]
    fn io_error_becomes_file_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn serde_json_error_becomes_deserialization() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: CoreError = parse_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn bincode_error_becomes_serialization() {
        let decode_err = bincode::deserialize::<String>(&[0xFF]).unwrap_err();
        let err: CoreError = decode_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}

//! Unit tests for the Identifiers module
//!
//! Tests cover creation, parsing, conversion, and display formatting
//! of the session and analysis run identifiers.

use core_kernel::{AnalysisRunId, SessionId};
use proptest::prelude::*;
use uuid::Uuid;

mod session_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_display_format() {
        assert!(SessionId::new().to_string().starts_with("SES-"));
    }

    #[test]
    fn test_from_str_with_prefix() {
        let original = SessionId::new();
        let parsed: SessionId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_from_str_without_prefix() {
        let uuid = Uuid::now_v7();
        let parsed: SessionId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("SES-not-a-uuid".parse::<SessionId>().is_err());
    }
}

mod analysis_run_id_tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let id = AnalysisRunId::new();
        assert!(id.to_string().starts_with("RUN-"));
    }

    #[test]
    fn test_prefix_of_another_type_is_not_stripped() {
        let uuid = Uuid::now_v7();
        let foreign = format!("SES-{}", uuid);
        assert!(foreign.parse::<AnalysisRunId>().is_err());
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::now_v7();
        let id = AnalysisRunId::from(uuid);
        let back: Uuid = id.into();
        assert_eq!(uuid, back);
    }
}

proptest! {
    #[test]
    fn prop_any_uuid_parses_back_through_display(bytes in any::<[u8; 16]>()) {
        let id = AnalysisRunId::from(Uuid::from_bytes(bytes));
        let parsed: AnalysisRunId = id.to_string().parse().unwrap();
        prop_assert_eq!(id, parsed);
    }
}

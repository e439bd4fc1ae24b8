//! Comprehensive unit tests for the Identifiers module
//!
//! Tests cover all identifier types, their creation, parsing,
//! conversion, and display formatting.

use core_kernel::{
    UserId, ProjectId, ContractId, ActivityTrackId,
    InvoiceId, InvoiceEntryId, DocumentId,
};
use uuid::Uuid;

mod invoice_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = InvoiceId::new();
        let id2 = InvoiceId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = InvoiceId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = InvoiceId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = InvoiceId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_display_includes_prefix() {
        let id = InvoiceId::new();
        assert!(id.to_string().starts_with("INV-"));
    }

    #[test]
    fn test_round_trip_parse() {
        let id = InvoiceId::new();
        let parsed: InvoiceId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}

mod prefix_tests {
    use super::*;

    #[test]
    fn test_all_prefixes_are_distinct() {
        let prefixes = [
            UserId::prefix(),
            ProjectId::prefix(),
            ContractId::prefix(),
            ActivityTrackId::prefix(),
            InvoiceId::prefix(),
            InvoiceEntryId::prefix(),
            DocumentId::prefix(),
        ];

        for (i, a) in prefixes.iter().enumerate() {
            for b in prefixes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_contract_id_prefix() {
        assert_eq!(ContractId::prefix(), "CTR");
        assert!(ContractId::new().to_string().starts_with("CTR-"));
    }

    #[test]
    fn test_activity_track_id_prefix() {
        assert_eq!(ActivityTrackId::prefix(), "ACT");
    }
}

mod parsing_tests {
    use super::*;

    #[test]
    fn test_parse_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: ProjectId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed.as_uuid(), &uuid);
    }

    #[test]
    fn test_parse_invalid_string_fails() {
        let result: Result<UserId, _> = "not-a-uuid".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = DocumentId::new();
        let json = serde_json::to_string(&id).unwrap();
        // Serialized as the bare UUID, no prefix
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));

        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_ids_are_orderable() {
        let mut ids: Vec<ActivityTrackId> = (0..10).map(|_| ActivityTrackId::new()).collect();
        ids.sort();
        for pair in ids.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }
}

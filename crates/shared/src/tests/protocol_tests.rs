use super::*;
use crate::error::ErrorBody;

fn payload(json: &str) -> IdentityPayload {
    serde_json::from_str(json).expect("payload")
}

#[test]
fn primary_id_field_wins() {
    let identity = payload(r#"{"id": 7, "user_id": 9, "username": "a"}"#)
        .resolve_identity()
        .expect("identity");
    assert_eq!(identity.user_id(), UserId(7));
    assert_eq!(identity.username(), "a");
}

#[test]
fn falls_back_to_secondary_user_id_field() {
    let identity = payload(r#"{"user_id": 9}"#)
        .resolve_identity()
        .expect("identity");
    assert_eq!(identity.user_id(), UserId(9));
    assert_eq!(identity.username(), "");
}

#[test]
fn zero_primary_id_defers_to_user_id() {
    assert_eq!(
        payload(r#"{"id": 0, "user_id": 12}"#).resolve_user_id(),
        Some(UserId(12))
    );
}

#[test]
fn missing_ids_resolve_to_nothing() {
    assert_eq!(payload(r#"{"username": "a"}"#).resolve_user_id(), None);
    assert!(payload(r#"{"id": 0}"#).resolve_identity().is_none());
}

#[test]
fn query_response_treats_empty_answer_as_absent() {
    let empty: QueryResponse = serde_json::from_str(r#"{"answer": ""}"#).expect("json");
    assert_eq!(empty.answer_text(), None);
    let missing: QueryResponse = serde_json::from_str("{}").expect("json");
    assert_eq!(missing.answer_text(), None);
    let present: QueryResponse = serde_json::from_str(r#"{"answer": "A summary."}"#).expect("json");
    assert_eq!(present.answer_text(), Some("A summary."));
}

#[test]
fn query_request_uses_backend_field_names() {
    let json = serde_json::to_value(QueryRequest {
        user_id: UserId(3),
        question: "why?".into(),
    })
    .expect("json");
    assert_eq!(json, serde_json::json!({"user_id": 3, "question": "why?"}));
}

#[test]
fn error_body_surfaces_only_string_detail() {
    let body = ErrorBody::from_bytes(br#"{"detail": "Invalid credentials"}"#).expect("body");
    assert_eq!(body.detail_text(), Some("Invalid credentials"));

    let structured = ErrorBody::from_bytes(br#"{"detail": [{"msg": "field required"}]}"#)
        .expect("body");
    assert_eq!(structured.detail_text(), None);

    let blank = ErrorBody::from_bytes(br#"{"detail": "   "}"#).expect("body");
    assert_eq!(blank.detail_text(), Some("   "));
    let empty = ErrorBody::from_bytes(br#"{"detail": ""}"#).expect("body");
    assert_eq!(empty.detail_text(), None);

    assert!(ErrorBody::from_bytes(b"<html>502</html>").is_none());
}

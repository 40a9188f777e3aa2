use super::*;

#[test]
fn entity_id_normal_usage() {
    let id = EntityId::try_from("68a583862e82ca12bce32741").unwrap();
    assert_eq!(id.as_str(), "68a583862e82ca12bce32741");
}

#[test]
fn entity_id_is_trimmed() {
    let id = EntityId::try_from("  movie-1 ").unwrap();
    assert_eq!(id.as_str(), "movie-1");
}

#[test]
fn entity_id_rejects_empty_string() {
    EntityId::try_from("").unwrap_err();
}

#[test]
fn entity_id_rejects_whitespace_string() {
    EntityId::try_from("   ").unwrap_err();
}

#[test]
fn entity_id_rejects_too_long_string() {
    let long_string = "a".repeat(MAX_ENTITY_ID_LENGTH + 1);
    EntityId::try_from(long_string.as_str()).unwrap_err();
}

#[test]
fn entity_id_serde_validates() {
    let id: EntityId = serde_json::from_str("\"m-7\"").unwrap();
    assert_eq!(id.as_str(), "m-7");

    serde_json::from_str::<EntityId>("\"  \"").unwrap_err();
}

use crate::{MockSpanner, TEST_DATABASE, Venue};
use cloudspan::{Entity, json};
use cloudspan_spanner::{
    Field, ResultSet, ResultSetStats, SpannerConnection, SpannerType, TypeCode, WireValue,
};
use indoc::indoc;

pub const VENUES_INSERT: &str = "INSERT INTO venues (name, description) VALUES (@a0, @a1) THEN RETURN id";
pub const VENUES_SELECT_BY_ID: &str = indoc! {"
    SELECT venues.id, venues.name, venues.description
    FROM venues
    WHERE venues.id = @a0
    LIMIT 1"};
pub const VENUES_DELETE_BY_ID: &str = indoc! {"
    DELETE FROM venues
    WHERE id = @a0"};

fn venue_fields() -> Vec<Field> {
    vec![
        Field {
            name: "id".into(),
            ty: SpannerType::scalar(TypeCode::Int64),
        },
        Field {
            name: "name".into(),
            ty: SpannerType::scalar(TypeCode::String),
        },
        Field {
            name: "description".into(),
            ty: SpannerType::scalar(TypeCode::Json),
        },
    ]
}

/// Creates the venues table, then inserts, reads back and deletes one venue.
pub async fn venues(connection: &mut SpannerConnection, mock: &MockSpanner) {
    connection
        .create_all(&[Venue::table()], false)
        .await
        .expect("Failed to create the venues table");
    let ddl = mock.ddl_requests();
    assert_eq!(ddl.len(), 1);
    assert_eq!(ddl[0].database, TEST_DATABASE);
    assert_eq!(
        ddl[0].statements,
        [indoc! {"
            CREATE TABLE venues (
            \tid INT64 NOT NULL GENERATED BY DEFAULT AS IDENTITY (BIT_REVERSED_POSITIVE),
            \tname STRING(MAX) NOT NULL,
            \tdescription JSON
            ) PRIMARY KEY (id)"}]
    );

    // Insert
    mock.add_result(
        VENUES_INSERT,
        ResultSet {
            metadata: venue_fields()[..1].to_vec(),
            rows: vec![vec!["7340032".into()]],
            stats: Some(ResultSetStats { row_count_exact: 1 }),
        },
    );
    let mut venue = Venue::new(
        "Venue 1",
        Some(json!({"type": "Stadium", "size": "Great"})),
    );
    let result = Venue::insert_one(connection, &venue)
        .await
        .expect("Failed to insert a venue");
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.last_affected_id, Some(7340032));
    let insert = mock
        .execute_requests()
        .into_iter()
        .find(|r| r.sql == VENUES_INSERT)
        .expect("The insert was not sent");
    assert_eq!(insert.param("a0"), Some(&WireValue::from("Venue 1")));
    assert_eq!(
        insert.param("a1"),
        Some(&WireValue::from(r#"{"size":"Great","type":"Stadium"}"#))
    );
    assert_eq!(
        insert.param_type("a1"),
        Some(&SpannerType::scalar(TypeCode::Json))
    );
    venue.id = result.last_affected_id;

    // Select
    mock.add_result(
        VENUES_SELECT_BY_ID,
        ResultSet {
            metadata: venue_fields(),
            rows: vec![vec![
                "7340032".into(),
                "Venue 1".into(),
                r#"{"size":"Great","type":"Stadium"}"#.into(),
            ]],
            stats: None,
        },
    );
    let found = Venue::find_pk(connection, &[("id", 7340032_i64.into())])
        .await
        .expect("Failed to query the venue")
        .expect("The venue was not found");
    assert_eq!(found, venue);

    // Delete
    found
        .delete(connection)
        .await
        .expect("Failed to delete the venue");
    let delete = mock
        .execute_requests()
        .into_iter()
        .find(|r| r.sql == VENUES_DELETE_BY_ID)
        .expect("The delete was not sent");
    assert_eq!(delete.param("a0"), Some(&WireValue::from("7340032")));
}

#[cfg(test)]
mod tests {
    use cloudspan_core::{
        AsValue, Autoincrement, ColumnDef, Context, Entity, ForeignKeyDef, IdentityOptions,
        IndexDef, Row, SequenceDef, SqlWriter, TableDef, Value,
    };
    use cloudspan_spanner::{
        Field, PrimaryKeyStrategy, ResultSet, SpannerConnection, SpannerSqlWriter, SpannerType,
        TypeCode, WireValue,
    };
    use cloudspan_tests::{
        MockSpanner, Singer, TEST_URL, TicketSale, Venue, mock_connection, setup, tables,
    };
    use indoc::indoc;
    use std::sync::Arc;
    use time::OffsetDateTime;

    const IDENTITY: SpannerSqlWriter = SpannerSqlWriter::new(PrimaryKeyStrategy::Identity);
    const AUTO_INCREMENT: SpannerSqlWriter =
        SpannerSqlWriter::new(PrimaryKeyStrategy::AutoIncrement);

    fn create_table(writer: &SpannerSqlWriter, table: &TableDef) -> String {
        let mut out = String::new();
        writer.write_create_table(&mut out, table);
        out
    }

    #[test]
    fn identity_primary_key() {
        assert_eq!(
            create_table(&IDENTITY, Venue::table()),
            indoc! {"
                CREATE TABLE venues (
                \tid INT64 NOT NULL GENERATED BY DEFAULT AS IDENTITY (BIT_REVERSED_POSITIVE),
                \tname STRING(MAX) NOT NULL,
                \tdescription JSON
                ) PRIMARY KEY (id)"}
        );
    }

    #[test]
    fn auto_increment_primary_key() {
        assert_eq!(
            create_table(&AUTO_INCREMENT, Venue::table()),
            indoc! {"
                CREATE TABLE venues (
                \tid INT64 NOT NULL AUTO_INCREMENT,
                \tname STRING(MAX) NOT NULL,
                \tdescription JSON
                ) PRIMARY KEY (id)"}
        );
    }

    #[test]
    fn deterministic() {
        for table in tables() {
            assert_eq!(
                IDENTITY.create_table_statements(table),
                IDENTITY.create_table_statements(table)
            );
        }
    }

    #[test]
    fn commit_timestamp_and_index() {
        assert_eq!(
            IDENTITY.create_table_statements(Singer::table()),
            [
                indoc! {"
                    CREATE TABLE singers (
                    \tid STRING(MAX) NOT NULL,
                    \tname STRING(MAX) NOT NULL,
                    \tupdated_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true)
                    ) PRIMARY KEY (id)"},
                "CREATE INDEX singers_by_name ON singers (name) STORING (updated_at)",
            ]
        );
        assert_eq!(
            IDENTITY.drop_table_statements(Singer::table()),
            ["DROP INDEX singers_by_name", "DROP TABLE singers"]
        );
    }

    #[test]
    fn interleaved_with_identity_options() {
        // The explicit identity options win over the strategy.
        let expected = indoc! {"
            CREATE TABLE ticket_sales (
            \tvenue_id INT64 NOT NULL,
            \tid INT64 NOT NULL GENERATED BY DEFAULT AS IDENTITY (BIT_REVERSED_POSITIVE START COUNTER WITH 1000),
            \tcustomer STRING(MAX) NOT NULL,
            \tseats ARRAY<STRING(MAX)>
            ) PRIMARY KEY (venue_id, id),
            INTERLEAVE IN PARENT venues ON DELETE CASCADE"};
        assert_eq!(create_table(&IDENTITY, TicketSale::table()), expected);
        assert_eq!(create_table(&AUTO_INCREMENT, TicketSale::table()), expected);
    }

    #[test]
    fn key_generation_selection() {
        let table = TableDef::builder("events")
            .column(ColumnDef::new("tenant", i64::as_empty_value()).primary_key())
            .column(
                ColumnDef::new("seq", i64::as_empty_value())
                    .primary_key()
                    .autoincrement(Autoincrement::Enabled),
            )
            .column(ColumnDef::new("score", f64::as_empty_value()).default_expr("0.0"))
            .column(ColumnDef::new("double_score", f64::as_empty_value()).computed("score * 2"))
            .column(ColumnDef::new("select", bool::as_empty_value()))
            .column(ColumnDef::new("at", OffsetDateTime::as_empty_value()).column_type("TIMESTAMP"))
            .build();
        assert_eq!(
            create_table(&AUTO_INCREMENT, &table),
            indoc! {"
                CREATE TABLE events (
                \ttenant INT64 NOT NULL,
                \tseq INT64 NOT NULL AUTO_INCREMENT,
                \tscore FLOAT64 DEFAULT (0.0),
                \tdouble_score FLOAT64 AS (score * 2) STORED,
                \t`select` BOOL,
                \t`at` TIMESTAMP
                ) PRIMARY KEY (tenant, seq)"}
        );

        let table = TableDef::builder("codes")
            .column(
                ColumnDef::new("code", i64::as_empty_value())
                    .primary_key()
                    .autoincrement(Autoincrement::Disabled),
            )
            .build();
        assert_eq!(
            create_table(&IDENTITY, &table),
            "CREATE TABLE codes (\n\tcode INT64 NOT NULL\n) PRIMARY KEY (code)"
        );

        let table = TableDef::builder("counters")
            .column(
                ColumnDef::new("id", i64::as_empty_value())
                    .primary_key()
                    .identity(IdentityOptions::default()),
            )
            .build();
        assert_eq!(
            create_table(&AUTO_INCREMENT, &table),
            "CREATE TABLE counters (\n\tid INT64 NOT NULL GENERATED BY DEFAULT AS IDENTITY (BIT_REVERSED_POSITIVE)\n) PRIMARY KEY (id)"
        );
    }

    fn orders() -> TableDef {
        TableDef::builder("orders")
            .sequence(SequenceDef::new("order_ids").start_with_counter(1000))
            .column(ColumnDef::new("id", i64::as_empty_value()).primary_key().sequence("order_ids"))
            .column(ColumnDef::new("venue_id", i64::as_empty_value()).not_null())
            .column(ColumnDef::new("singer_id", String::as_empty_value()))
            .foreign_key(ForeignKeyDef::new(["venue_id"], "venues", ["id"]).name("fk_orders_venues"))
            .foreign_key(ForeignKeyDef::new(["singer_id"], "singers", ["id"]).on_delete_cascade())
            .index(IndexDef::new("orders_by_venue", ["venue_id"]))
            .build()
    }

    #[test]
    fn sequences_and_foreign_keys() {
        let table = orders();
        let expected = [
            "CREATE SEQUENCE order_ids OPTIONS (sequence_kind = 'bit_reversed_positive', start_with_counter = 1000)",
            indoc! {"
                CREATE TABLE orders (
                \tid INT64 NOT NULL DEFAULT (GET_NEXT_SEQUENCE_VALUE(SEQUENCE order_ids)),
                \tvenue_id INT64 NOT NULL,
                \tsinger_id STRING(MAX),
                \tCONSTRAINT fk_orders_venues FOREIGN KEY (venue_id) REFERENCES venues (id),
                \tFOREIGN KEY (singer_id) REFERENCES singers (id) ON DELETE CASCADE
                ) PRIMARY KEY (id)"},
            "CREATE INDEX orders_by_venue ON orders (venue_id)",
        ];
        // A sequence default takes the place of the strategy.
        assert_eq!(IDENTITY.create_table_statements(&table), expected);
        assert_eq!(AUTO_INCREMENT.create_table_statements(&table), expected);
        // Only the named constraint can be dropped on its own.
        assert_eq!(
            IDENTITY.drop_table_statements(&table),
            [
                "DROP INDEX orders_by_venue",
                "ALTER TABLE orders DROP CONSTRAINT fk_orders_venues",
                "DROP TABLE orders",
                "DROP SEQUENCE order_ids",
            ]
        );

        let table = TableDef::builder("tickets")
            .sequence(SequenceDef::new("select"))
            .column(ColumnDef::new("id", i64::as_empty_value()).primary_key().sequence("select"))
            .build();
        assert_eq!(
            IDENTITY.create_table_statements(&table),
            [
                "CREATE SEQUENCE `select` OPTIONS (sequence_kind = 'bit_reversed_positive')",
                "CREATE TABLE tickets (\n\tid INT64 NOT NULL DEFAULT (GET_NEXT_SEQUENCE_VALUE(SEQUENCE `select`))\n) PRIMARY KEY (id)",
            ]
        );
    }

    #[test]
    fn sequence_key_is_returned() {
        let table = orders();
        let rows: [Row; 1] = [[Value::Int64(None), 7_i64.as_value(), "s1".into()]
            .into_iter()
            .collect()];
        let mut context = Context::new();
        let mut out = String::new();
        IDENTITY.write_insert(&mut context, &mut out, &table, &rows);
        assert_eq!(
            out,
            "INSERT INTO orders (venue_id, singer_id) VALUES (@a0, @a1) THEN RETURN id"
        );
        assert_eq!(context.parameters.len(), 2);

        let rows: [Row; 1] = [[42_i64.as_value(), 7_i64.as_value(), Value::Null]
            .into_iter()
            .collect()];
        let mut out = String::new();
        IDENTITY.write_insert(&mut Context::new(), &mut out, &table, &rows);
        assert_eq!(
            out,
            "INSERT INTO orders (id, venue_id, singer_id) VALUES (@a0, @a1, @a2)"
        );
    }

    #[test]
    fn explicit_key_order() {
        let table = TableDef::builder("performances")
            .column(ColumnDef::new("venue_id", i64::as_empty_value()))
            .column(ColumnDef::new("singer_id", String::as_empty_value()))
            .column(ColumnDef::new("starts_at", OffsetDateTime::as_empty_value()).primary_key())
            .primary_key(["singer_id", "venue_id"])
            .build();
        assert_eq!(
            table.primary_key().map(ColumnDef::name).collect::<Vec<_>>(),
            ["singer_id", "venue_id", "starts_at"]
        );
        assert_eq!(
            create_table(&IDENTITY, &table),
            indoc! {"
                CREATE TABLE performances (
                \tvenue_id INT64 NOT NULL,
                \tsinger_id STRING(MAX) NOT NULL,
                \tstarts_at TIMESTAMP NOT NULL
                ) PRIMARY KEY (singer_id, venue_id, starts_at)"}
        );

        // A single integer key declared this way still gets the generation clause.
        let table = TableDef::builder("labels")
            .column(ColumnDef::new("name", String::as_empty_value()))
            .column(ColumnDef::new("id", i64::as_empty_value()))
            .primary_key(["id"])
            .build();
        assert_eq!(
            create_table(&AUTO_INCREMENT, &table),
            "CREATE TABLE labels (\n\tname STRING(MAX),\n\tid INT64 NOT NULL AUTO_INCREMENT\n) PRIMARY KEY (id)"
        );
    }

    #[tokio::test]
    async fn sequences_travel_with_their_table() {
        let (mock, mut connection) = setup(1);
        let table = orders();
        connection
            .create_all(&[Venue::table(), &table], false)
            .await
            .expect("Failed to create the tables");
        let statements = &mock.ddl_requests()[0].statements;
        assert_eq!(statements.len(), 4);
        assert!(statements[0].starts_with("CREATE TABLE venues"));
        assert!(statements[1].starts_with("CREATE SEQUENCE order_ids"));
        assert!(statements[2].starts_with("CREATE TABLE orders"));

        mock.clear_requests();
        connection
            .drop_all(&[Venue::table(), &table], false)
            .await
            .expect("Failed to drop the tables");
        assert_eq!(
            mock.ddl_requests()[0].statements,
            [
                "DROP INDEX orders_by_venue",
                "ALTER TABLE orders DROP CONSTRAINT fk_orders_venues",
                "DROP TABLE orders",
                "DROP SEQUENCE order_ids",
                "DROP TABLE venues",
            ]
        );
    }

    #[tokio::test]
    async fn create_all_single_request() {
        let (mock, mut connection) = setup(2);
        connection
            .create_all(&tables(), false)
            .await
            .expect("Failed to create the tables");
        let ddl = mock.ddl_requests();
        assert_eq!(ddl.len(), 1);
        assert_eq!(ddl[0].statements.len(), 4);
        assert!(ddl[0].statements[0].starts_with("CREATE TABLE venues"));
        assert!(ddl[0].statements[1].starts_with("CREATE TABLE singers"));
        assert!(ddl[0].statements[2].starts_with("CREATE INDEX singers_by_name"));
        assert!(ddl[0].statements[3].starts_with("CREATE TABLE ticket_sales"));
        // No session is needed for schema changes.
        assert_eq!(mock.count("BatchCreateSessions"), 0);

        mock.clear_requests();
        connection
            .drop_all(&tables(), false)
            .await
            .expect("Failed to drop the tables");
        assert_eq!(
            mock.ddl_requests()[0].statements,
            [
                "DROP TABLE ticket_sales",
                "DROP INDEX singers_by_name",
                "DROP TABLE singers",
                "DROP TABLE venues",
            ]
        );
    }

    #[tokio::test]
    async fn create_all_checks_first() {
        let (mock, mut connection) = setup(1);
        let has_venues = indoc! {r#"
            SELECT true
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA="" AND TABLE_NAME="venues"
            LIMIT 1
        "#};
        mock.add_result(
            has_venues,
            ResultSet {
                metadata: vec![Field {
                    name: "".into(),
                    ty: SpannerType::scalar(TypeCode::Bool),
                }],
                rows: vec![vec![WireValue::Bool(true)]],
                stats: None,
            },
        );
        connection
            .create_all(&tables(), true)
            .await
            .expect("Failed to create the tables");
        let ddl = mock.ddl_requests();
        assert_eq!(ddl.len(), 1);
        assert!(
            ddl[0]
                .statements
                .iter()
                .all(|v| !v.starts_with("CREATE TABLE venues"))
        );
        assert_eq!(ddl[0].statements.len(), 3);
        // One read-only query per table, never a transaction.
        assert_eq!(mock.count("ExecuteSql"), 3);
        assert_eq!(mock.count("BeginTransaction"), 0);
        assert_eq!(mock.count("Commit"), 0);
    }

    #[tokio::test]
    async fn strategy_is_frozen_in_the_connection() {
        let (mock, _) = setup(1);
        let mut connection = mock_connection(&mock)
            .use_auto_increment(true)
            .build()
            .expect("Could not build the connection");
        connection
            .create_all(&[Venue::table()], false)
            .await
            .expect("Failed to create the table");
        assert!(mock.ddl_requests()[0].statements[0].contains("\tid INT64 NOT NULL AUTO_INCREMENT,"));

        let url = format!(
            "{}?use_auto_increment=true&pool_size=3",
            TEST_URL
        );
        let connection = SpannerConnection::builder(url)
            .transport(Arc::new(MockSpanner::new()))
            .build()
            .expect("Could not build the connection");
        assert_eq!(
            connection.config().primary_key_strategy,
            PrimaryKeyStrategy::AutoIncrement
        );
        assert_eq!(connection.pool().size(), 3);
    }
}

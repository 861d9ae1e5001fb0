#[cfg(test)]
mod tests {
    use cloudspan::{
        AsValue, ColumnDef, Context, ForeignKeyDef, GenericSqlWriter, IndexDef, Parameter, Row,
        SequenceDef, SqlWriter, TableDef, Value,
    };
    use indoc::indoc;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::OffsetDateTime;
    use uuid::Uuid;

    const WRITER: GenericSqlWriter = GenericSqlWriter;

    fn orders() -> TableDef {
        TableDef::builder("orders")
            .column(ColumnDef::new("id", i64::as_empty_value()).primary_key())
            .column(ColumnDef::new("customer", String::as_empty_value()).not_null())
            .column(ColumnDef::new("total", Decimal::as_empty_value()))
            .column(ColumnDef::new("total_cents", i64::as_empty_value()).computed("total * 100"))
            .index(IndexDef::new("orders_by_customer", ["customer"]).unique())
            .build()
    }

    fn row(values: impl IntoIterator<Item = Value>) -> Row {
        values.into_iter().collect()
    }

    #[test]
    fn create_table() {
        let mut out = String::new();
        WRITER.write_create_table(&mut out, &orders());
        assert_eq!(
            out,
            indoc! {"
                CREATE TABLE orders (
                \tid BIGINT NOT NULL GENERATED BY DEFAULT AS IDENTITY,
                \tcustomer VARCHAR NOT NULL,
                \ttotal DECIMAL,
                \ttotal_cents BIGINT AS (total * 100) STORED,
                \tPRIMARY KEY (id)
                )"}
        );
    }

    #[test]
    fn column_types() {
        let table = TableDef::builder("Mixed Case")
            .column(ColumnDef::new("uuid", Uuid::as_empty_value()).primary_key())
            .column(ColumnDef::new("tags", Vec::<String>::as_empty_value()))
            .column(ColumnDef::new("created at", OffsetDateTime::as_empty_value()))
            .column(ColumnDef::new("quote\"d", f64::as_empty_value()).default_expr("1.5"))
            .column(ColumnDef::new("raw", bool::as_empty_value()).column_type("BIT"))
            .build();
        let mut out = String::new();
        WRITER.write_create_table(&mut out, &table);
        assert_eq!(
            out,
            indoc! {"
                CREATE TABLE \"Mixed Case\" (
                \tuuid UUID NOT NULL,
                \ttags VARCHAR[],
                \t\"created at\" TIMESTAMP WITH TIME ZONE,
                \t\"quote\"\"d\" DOUBLE PRECISION DEFAULT (1.5),
                \traw BIT,
                \tPRIMARY KEY (uuid)
                )"}
        );
    }

    #[test]
    fn indexes() {
        let table = orders();
        assert_eq!(
            WRITER.create_table_statements(&table)[1],
            "CREATE UNIQUE INDEX orders_by_customer ON orders (customer)"
        );
        assert_eq!(
            WRITER.drop_table_statements(&table),
            ["DROP INDEX orders_by_customer", "DROP TABLE orders"]
        );
    }

    #[test]
    fn insert_generated_key() {
        let table = orders();
        let rows = [
            row([Value::Null, "Ada".into(), Value::Null, Value::Null]),
            row([
                Value::Int64(None),
                "Grace".into(),
                Decimal::from_str("12.50").unwrap().as_value(),
                Value::Null,
            ]),
        ];
        let mut context = Context::new();
        let mut out = String::new();
        WRITER.write_insert(&mut context, &mut out, &table, &rows);
        // Computed columns are neither written nor returned.
        assert_eq!(
            out,
            "INSERT INTO orders (customer, total) VALUES (?, ?), (?, ?) RETURNING id"
        );
        assert_eq!(
            context.parameters,
            [
                Parameter {
                    value: "Ada".into(),
                    declared: Value::Varchar(None),
                },
                Parameter {
                    value: Value::Null,
                    declared: Value::Decimal(None),
                },
                Parameter {
                    value: "Grace".into(),
                    declared: Value::Varchar(None),
                },
                Parameter {
                    value: Value::Decimal(Some(Decimal::from_str("12.50").unwrap())),
                    declared: Value::Decimal(None),
                },
            ]
        );
    }

    #[test]
    fn insert_supplied_key() {
        let table = orders();
        let rows = [row([42_i64.as_value(), "Linus".into()])];
        let mut context = Context::new();
        let mut out = String::new();
        WRITER.write_insert(&mut context, &mut out, &table, &rows);
        assert_eq!(out, "INSERT INTO orders (id, customer, total) VALUES (?, ?, ?)");
        assert_eq!(context.parameters.len(), 3);
        assert_eq!(context.parameters[2].value, Value::Null);

        let mut out = String::new();
        WRITER.write_insert(&mut Context::new(), &mut out, &table, &[]);
        assert!(out.is_empty());
    }

    #[test]
    fn select_and_delete() {
        let table = orders();
        let mut context = Context::new();
        let mut out = String::new();
        WRITER.write_select(
            &mut context,
            &mut out,
            &table,
            &[("customer", "Ada".into()), ("total", Value::Null)],
            Some(10),
        );
        assert_eq!(
            out,
            indoc! {"
                SELECT orders.id, orders.customer, orders.total, orders.total_cents
                FROM orders
                WHERE orders.customer = ? AND orders.total IS NULL
                LIMIT 10"}
        );
        assert_eq!(context.parameters.len(), 1);

        let mut out = String::new();
        WRITER.write_select(&mut Context::new(), &mut out, &table, &[], None);
        assert!(out.ends_with("\nFROM orders"));

        let mut context = Context::new();
        let mut out = String::new();
        WRITER.write_delete(&mut context, &mut out, &table, &[("id", 7_i32.as_value())]);
        assert_eq!(out, "DELETE FROM orders\nWHERE id = ?");
        assert_eq!(context.parameters[0].declared, Value::Int64(None));

        let mut out = String::new();
        WRITER.write_delete(&mut Context::new(), &mut out, &table, &[]);
        assert_eq!(out, "DELETE FROM orders\nWHERE true");
    }

    #[test]
    fn sequences_foreign_keys_and_key_order() {
        let table = TableDef::builder("lines")
            .sequence(SequenceDef::new("line_ids").start_with_counter(10))
            .column(ColumnDef::new("id", i64::as_empty_value()).sequence("line_ids"))
            .column(ColumnDef::new("order_id", i64::as_empty_value()))
            .primary_key(["order_id", "id"])
            .foreign_key(
                ForeignKeyDef::new(["order_id"], "orders", ["id"])
                    .name("lines_order")
                    .on_delete_cascade(),
            )
            .build();
        assert_eq!(
            WRITER.create_table_statements(&table),
            [
                "CREATE SEQUENCE line_ids START WITH 10",
                indoc! {"
                    CREATE TABLE lines (
                    \tid BIGINT NOT NULL DEFAULT (nextval('line_ids')),
                    \torder_id BIGINT NOT NULL,
                    \tCONSTRAINT lines_order FOREIGN KEY (order_id) REFERENCES orders (id) ON DELETE CASCADE,
                    \tPRIMARY KEY (order_id, id)
                    )"},
            ]
        );
        assert_eq!(
            WRITER.drop_table_statements(&table),
            [
                "ALTER TABLE lines DROP CONSTRAINT lines_order",
                "DROP TABLE lines",
                "DROP SEQUENCE line_ids",
            ]
        );

        let mut out = String::new();
        WRITER.write_insert(
            &mut Context::new(),
            &mut out,
            &table,
            &[row([Value::Null, 5_i64.as_value()])],
        );
        assert_eq!(out, "INSERT INTO lines (order_id) VALUES (?) RETURNING id");
    }
}

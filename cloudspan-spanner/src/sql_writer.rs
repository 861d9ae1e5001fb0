use crate::PrimaryKeyStrategy;
use cloudspan_core::{ColumnDef, IndexDef, SequenceDef, SqlWriter, TableDef, Value, separated_by};
use std::fmt::Write;

/// GoogleSQL reserved keywords, they can be used as identifiers only when quoted.
const RESERVED_WORDS: &[&str] = &[
    "ALL", "AND", "ANY", "ARRAY", "AS", "ASC", "ASSERT_ROWS_MODIFIED", "AT", "BETWEEN", "BY",
    "CASE", "CAST", "COLLATE", "CONTAINS", "CREATE", "CROSS", "CUBE", "CURRENT", "DEFAULT",
    "DEFINE", "DESC", "DISTINCT", "ELSE", "END", "ENUM", "ESCAPE", "EXCEPT", "EXCLUDE", "EXISTS",
    "EXTRACT", "FALSE", "FETCH", "FOLLOWING", "FOR", "FROM", "FULL", "GROUP", "GROUPING", "GROUPS",
    "HASH", "HAVING", "IF", "IGNORE", "IN", "INNER", "INTERSECT", "INTERVAL", "INTO", "IS", "JOIN",
    "LATERAL", "LEFT", "LIKE", "LIMIT", "LOOKUP", "MERGE", "NATURAL", "NEW", "NO", "NOT", "NULL",
    "NULLS", "OF", "ON", "OR", "ORDER", "OUTER", "OVER", "PARTITION", "PRECEDING", "PROTO",
    "RANGE", "RECURSIVE", "RESPECT", "RIGHT", "ROLLUP", "ROWS", "SELECT", "SET", "SOME", "STRUCT",
    "TABLESAMPLE", "THEN", "TO", "TREAT", "TRUE", "UNBOUNDED", "UNION", "UNNEST", "USING", "WHEN",
    "WHERE", "WINDOW", "WITH", "WITHIN",
];

/// Statement writer of the Spanner dialect.
///
/// Owns the primary key strategy of the connection, so every table it renders follows the
/// same key generation clause.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpannerSqlWriter {
    pub primary_key_strategy: PrimaryKeyStrategy,
}

impl SpannerSqlWriter {
    pub const fn new(primary_key_strategy: PrimaryKeyStrategy) -> Self {
        Self {
            primary_key_strategy,
        }
    }

    /// Query telling whether the table exists, it returns one row if it does.
    pub fn write_has_table(&self, out: &mut String, name: &str) {
        out.push_str("SELECT true\nFROM INFORMATION_SCHEMA.TABLES\nWHERE TABLE_SCHEMA=\"\" AND TABLE_NAME=\"");
        self.write_escaped(out, name, '"', "\\\"");
        out.push_str("\"\nLIMIT 1\n");
    }
}

impl SqlWriter for SpannerSqlWriter {
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "\\`");
        out.push('`');
    }

    fn is_reserved_word(&self, value: &str) -> bool {
        RESERVED_WORDS
            .iter()
            .any(|v| v.eq_ignore_ascii_case(value))
    }

    fn write_placeholder(&self, out: &mut String, index: usize) {
        let _ = write!(out, "@a{}", index);
    }

    fn write_column_type(&self, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..) => out.push_str("BOOL"),
            Value::Int64(..) => out.push_str("INT64"),
            Value::Float32(..) => out.push_str("FLOAT32"),
            Value::Float64(..) => out.push_str("FLOAT64"),
            Value::Decimal(..) => out.push_str("NUMERIC"),
            Value::Varchar(..) | Value::Uuid(..) | Value::Null => out.push_str("STRING(MAX)"),
            Value::Blob(..) => out.push_str("BYTES(MAX)"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Timestamp(..) => out.push_str("TIMESTAMP"),
            Value::Json(..) => out.push_str("JSON"),
            Value::List(.., inner) => {
                out.push_str("ARRAY<");
                self.write_column_type(out, inner);
                out.push('>');
            }
        }
    }

    fn write_column_generation(&self, out: &mut String, column: &ColumnDef) {
        match (&column.identity, self.primary_key_strategy) {
            (Some(identity), ..) => {
                out.push_str(" GENERATED BY DEFAULT AS IDENTITY (BIT_REVERSED_POSITIVE");
                if let Some(start) = identity.start_counter_with {
                    let _ = write!(out, " START COUNTER WITH {}", start);
                }
                out.push(')');
            }
            (None, PrimaryKeyStrategy::AutoIncrement) => out.push_str(" AUTO_INCREMENT"),
            (None, PrimaryKeyStrategy::Identity) => {
                out.push_str(" GENERATED BY DEFAULT AS IDENTITY (BIT_REVERSED_POSITIVE)")
            }
        }
    }

    fn write_column_options(&self, out: &mut String, column: &ColumnDef) {
        if column.commit_timestamp {
            out.push_str(" OPTIONS (allow_commit_timestamp=true)");
        }
    }

    fn write_sequence_value(&self, out: &mut String, name: &str) {
        out.push_str("GET_NEXT_SEQUENCE_VALUE(SEQUENCE ");
        self.write_identifier(out, name);
        out.push(')');
    }

    /// Sequences are always bit reversed, the only kind Spanner offers.
    fn write_create_sequence(&self, out: &mut String, sequence: &SequenceDef) {
        out.push_str("CREATE SEQUENCE ");
        self.write_identifier(out, &sequence.name);
        out.push_str(" OPTIONS (sequence_kind = 'bit_reversed_positive'");
        if let Some(start) = sequence.start_with_counter {
            let _ = write!(out, ", start_with_counter = {}", start);
        }
        out.push(')');
    }

    /// `CREATE TABLE t (...) PRIMARY KEY (...)`, the key comes after the column list.
    fn write_create_table(&self, out: &mut String, table: &TableDef) {
        out.push_str("CREATE TABLE ");
        self.write_identifier(out, &table.name);
        out.push_str(" (\n");
        separated_by(
            out,
            &table.columns,
            |out, v| {
                out.push('\t');
                self.write_column_definition(out, table, v);
            },
            ",\n",
        );
        for foreign_key in &table.foreign_keys {
            out.push_str(",\n\t");
            self.write_foreign_key(out, foreign_key);
        }
        out.push_str("\n) PRIMARY KEY (");
        separated_by(
            out,
            table.primary_key(),
            |out, v| self.write_identifier(out, &v.name),
            ", ",
        );
        out.push(')');
        if let Some(interleave) = &table.interleave {
            out.push_str(",\nINTERLEAVE IN PARENT ");
            self.write_identifier(out, &interleave.parent);
            if interleave.on_delete_cascade {
                out.push_str(" ON DELETE CASCADE");
            }
        }
    }

    fn write_create_index(&self, out: &mut String, table: &TableDef, index: &IndexDef) {
        out.push_str(if index.unique {
            "CREATE UNIQUE INDEX "
        } else {
            "CREATE INDEX "
        });
        self.write_identifier(out, &index.name);
        out.push_str(" ON ");
        self.write_identifier(out, &table.name);
        out.push_str(" (");
        separated_by(
            out,
            &index.columns,
            |out, v| self.write_identifier(out, v),
            ", ",
        );
        out.push(')');
        if !index.storing.is_empty() {
            out.push_str(" STORING (");
            separated_by(
                out,
                &index.storing,
                |out, v| self.write_identifier(out, v),
                ", ",
            );
            out.push(')');
        }
    }

    fn write_returning(&self, out: &mut String, columns: &[&ColumnDef]) {
        out.push_str(" THEN RETURN ");
        separated_by(
            out,
            columns,
            |out, v| self.write_identifier(out, &v.name),
            ", ",
        );
    }
}

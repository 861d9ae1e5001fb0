use crate::{
    ColumnDef, ForeignKeyDef, IndexDef, Row, SequenceDef, TableDef, Value, separated_by,
};
use std::fmt::Write;

/// A value waiting to be bound, together with the type of the column it targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub value: Value,
    /// Typed NULL of the target column.
    pub declared: Value,
}

/// State shared by the writer methods producing one statement.
#[derive(Debug, Default)]
pub struct Context {
    pub parameters: Vec<Parameter>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }
    /// Registers a parameter and returns its index.
    pub fn push(&mut self, value: Value, declared: &Value) -> usize {
        self.parameters.push(Parameter {
            value,
            declared: declared.as_null(),
        });
        self.parameters.len() - 1
    }
}

/// Renders statements for a SQL dialect.
///
/// Values never appear inline: the writers register them in the [`Context`] and emit a
/// placeholder, the caller binds them afterwards. Every method has a default implementation
/// producing fairly standard SQL, dialects override the fragments that differ.
pub trait SqlWriter {
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    fn is_reserved_word(&self, _value: &str) -> bool {
        false
    }

    /// Writes the identifier bare when possible, quoted otherwise.
    fn write_identifier(&self, out: &mut String, value: &str) {
        let plain = value
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain && !self.is_reserved_word(value) {
            out.push_str(value);
        } else {
            self.write_identifier_quoted(out, value);
        }
    }

    fn write_placeholder(&self, out: &mut String, _index: usize) {
        out.push('?');
    }

    fn write_parameter(
        &self,
        context: &mut Context,
        out: &mut String,
        value: Value,
        declared: &Value,
    ) {
        let index = context.push(value, declared);
        self.write_placeholder(out, index);
    }

    fn write_column_type(&self, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..) => out.push_str("BOOLEAN"),
            Value::Int64(..) => out.push_str("BIGINT"),
            Value::Float32(..) => out.push_str("REAL"),
            Value::Float64(..) => out.push_str("DOUBLE PRECISION"),
            Value::Decimal(..) => out.push_str("DECIMAL"),
            Value::Varchar(..) => out.push_str("VARCHAR"),
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Timestamp(..) => out.push_str("TIMESTAMP WITH TIME ZONE"),
            Value::Uuid(..) => out.push_str("UUID"),
            Value::Json(..) => out.push_str("JSON"),
            Value::List(.., inner) => {
                self.write_column_type(out, inner);
                out.push_str("[]");
            }
            Value::Null => out.push_str("NULL"),
        }
    }

    /// Key generation clause of the autoincrement column, with a leading space.
    fn write_column_generation(&self, out: &mut String, _column: &ColumnDef) {
        out.push_str(" GENERATED BY DEFAULT AS IDENTITY");
    }

    fn write_column_definition(&self, out: &mut String, table: &TableDef, column: &ColumnDef) {
        self.write_identifier(out, &column.name);
        out.push(' ');
        match &column.column_type {
            Some(column_type) => out.push_str(column_type),
            None => self.write_column_type(out, &column.value),
        }
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
        let autoincrement = table
            .autoincrement_column()
            .is_some_and(|c| c.name == column.name);
        if autoincrement || column.identity.is_some() {
            self.write_column_generation(out, column);
        } else if let Some(default) = &column.default {
            let _ = write!(out, " DEFAULT ({})", default);
        } else if let Some(sequence) = &column.sequence {
            out.push_str(" DEFAULT (");
            self.write_sequence_value(out, sequence);
            out.push(')');
        } else if let Some(computed) = &column.computed {
            let _ = write!(out, " AS ({}) STORED", computed);
        }
        self.write_column_options(out, column);
    }

    /// Dialect specific column options, with a leading space.
    fn write_column_options(&self, _out: &mut String, _column: &ColumnDef) {}

    /// Expression producing the next value of a sequence.
    fn write_sequence_value(&self, out: &mut String, name: &str) {
        out.push_str("nextval('");
        self.write_escaped(out, name, '\'', "''");
        out.push_str("')");
    }

    /// Foreign key constraint, as it appears in the column list.
    fn write_foreign_key(&self, out: &mut String, foreign_key: &ForeignKeyDef) {
        if let Some(name) = &foreign_key.name {
            out.push_str("CONSTRAINT ");
            self.write_identifier(out, name);
            out.push(' ');
        }
        out.push_str("FOREIGN KEY (");
        separated_by(out, &foreign_key.columns, |out, v| self.write_identifier(out, v), ", ");
        out.push_str(") REFERENCES ");
        self.write_identifier(out, &foreign_key.references);
        out.push_str(" (");
        separated_by(
            out,
            &foreign_key.referenced_columns,
            |out, v| self.write_identifier(out, v),
            ", ",
        );
        out.push(')');
        if foreign_key.on_delete_cascade {
            out.push_str(" ON DELETE CASCADE");
        }
    }

    fn write_create_sequence(&self, out: &mut String, sequence: &SequenceDef) {
        out.push_str("CREATE SEQUENCE ");
        self.write_identifier(out, &sequence.name);
        if let Some(start) = sequence.start_with_counter {
            let _ = write!(out, " START WITH {}", start);
        }
    }

    fn write_drop_sequence(&self, out: &mut String, sequence: &SequenceDef) {
        out.push_str("DROP SEQUENCE ");
        self.write_identifier(out, &sequence.name);
    }

    fn write_drop_constraint(&self, out: &mut String, table: &TableDef, name: &str) {
        out.push_str("ALTER TABLE ");
        self.write_identifier(out, &table.name);
        out.push_str(" DROP CONSTRAINT ");
        self.write_identifier(out, name);
    }

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
        let mut primary_key = table.primary_key().peekable();
        if primary_key.peek().is_some() {
            out.push_str(",\n\tPRIMARY KEY (");
            separated_by(out, primary_key, |out, v| self.write_identifier(out, &v.name), ", ");
            out.push(')');
        }
        out.push_str("\n)");
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
        separated_by(out, &index.columns, |out, v| self.write_identifier(out, v), ", ");
        out.push(')');
    }

    fn write_drop_index(&self, out: &mut String, index: &IndexDef) {
        out.push_str("DROP INDEX ");
        self.write_identifier(out, &index.name);
    }

    fn write_drop_table(&self, out: &mut String, table: &TableDef) {
        out.push_str("DROP TABLE ");
        self.write_identifier(out, &table.name);
    }

    /// The sequences of the table, the table and its indexes, one statement each.
    fn create_table_statements(&self, table: &TableDef) -> Vec<String> {
        let mut result = Vec::with_capacity(1 + table.indexes.len() + table.sequences.len());
        for sequence in &table.sequences {
            let mut out = String::with_capacity(64);
            self.write_create_sequence(&mut out, sequence);
            result.push(out);
        }
        let mut out = String::with_capacity(256);
        self.write_create_table(&mut out, table);
        result.push(out);
        for index in &table.indexes {
            let mut out = String::with_capacity(64);
            self.write_create_index(&mut out, table, index);
            result.push(out);
        }
        result
    }

    /// Everything that depends on the table goes first: indexes, then named foreign keys.
    /// The sequences are dropped after the table whose defaults use them.
    fn drop_table_statements(&self, table: &TableDef) -> Vec<String> {
        let mut result = Vec::with_capacity(
            1 + table.indexes.len() + table.foreign_keys.len() + table.sequences.len(),
        );
        for index in &table.indexes {
            let mut out = String::with_capacity(64);
            self.write_drop_index(&mut out, index);
            result.push(out);
        }
        for name in table.foreign_keys.iter().filter_map(|v| v.name.as_deref()) {
            let mut out = String::with_capacity(64);
            self.write_drop_constraint(&mut out, table, name);
            result.push(out);
        }
        let mut out = String::with_capacity(64);
        self.write_drop_table(&mut out, table);
        result.push(out);
        for sequence in &table.sequences {
            let mut out = String::with_capacity(64);
            self.write_drop_sequence(&mut out, sequence);
            result.push(out);
        }
        result
    }

    /// Clause returning the server generated columns of an insert, with a leading space.
    fn write_returning(&self, out: &mut String, columns: &[&ColumnDef]) {
        out.push_str(" RETURNING ");
        separated_by(out, columns, |out, v| self.write_identifier(out, &v.name), ", ");
    }

    /// Writes an INSERT of `rows`, each aligned with the columns of `table`.
    ///
    /// Columns generated by the database are left out when no row supplies a value for them,
    /// their values are then returned by the statement.
    fn write_insert(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableDef,
        rows: &[Row],
    ) {
        if rows.is_empty() {
            return;
        }
        let supplied = |i: usize| rows.iter().any(|r| r.get(i).is_some_and(|v| !v.is_null()));
        let (columns, omitted): (Vec<_>, Vec<_>) = table
            .columns
            .iter()
            .enumerate()
            .partition(|(i, c)| !table.is_generated(c) || supplied(*i));
        out.push_str("INSERT INTO ");
        self.write_identifier(out, &table.name);
        out.push_str(" (");
        separated_by(out, &columns, |out, (_, c)| self.write_identifier(out, &c.name), ", ");
        out.push_str(") VALUES ");
        separated_by(
            out,
            rows,
            |out, row| {
                out.push('(');
                separated_by(
                    out,
                    &columns,
                    |out, (i, c)| {
                        let value = row.get(*i).cloned().unwrap_or_default();
                        self.write_parameter(context, out, value, &c.value);
                    },
                    ", ",
                );
                out.push(')');
            },
            ", ",
        );
        let returning = omitted
            .into_iter()
            .filter(|(_, c)| c.computed.is_none())
            .map(|(_, c)| c)
            .collect::<Vec<_>>();
        if !returning.is_empty() {
            self.write_returning(out, &returning);
        }
    }

    /// Writes the equality conjunction of `filter`, `true` when empty.
    fn write_filter(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableDef,
        filter: &[(&str, Value)],
        qualify: bool,
    ) {
        if filter.is_empty() {
            out.push_str("true");
            return;
        }
        separated_by(
            out,
            filter,
            |out, (name, value)| {
                if qualify {
                    self.write_identifier(out, &table.name);
                    out.push('.');
                }
                self.write_identifier(out, name);
                if value.is_null() {
                    out.push_str(" IS NULL");
                } else {
                    out.push_str(" = ");
                    let declared = table.column(name).map(|c| &c.value).unwrap_or(value);
                    self.write_parameter(context, out, value.clone(), declared);
                }
            },
            " AND ",
        );
    }

    fn write_select(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableDef,
        filter: &[(&str, Value)],
        limit: Option<u32>,
    ) {
        out.push_str("SELECT ");
        separated_by(
            out,
            &table.columns,
            |out, c| {
                self.write_identifier(out, &table.name);
                out.push('.');
                self.write_identifier(out, &c.name);
            },
            ", ",
        );
        out.push_str("\nFROM ");
        self.write_identifier(out, &table.name);
        if !filter.is_empty() {
            out.push_str("\nWHERE ");
            self.write_filter(context, out, table, filter, true);
        }
        if let Some(limit) = limit {
            let _ = write!(out, "\nLIMIT {}", limit);
        }
    }

    fn write_delete(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableDef,
        filter: &[(&str, Value)],
    ) {
        out.push_str("DELETE FROM ");
        self.write_identifier(out, &table.name);
        out.push_str("\nWHERE ");
        self.write_filter(context, out, table, filter, false);
    }
}

/// Dialect neutral writer, using only the default implementations.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericSqlWriter;

impl SqlWriter for GenericSqlWriter {}

use crate::{Autoincrement, ColumnDef, Value};

/// Places the rows of a table physically inside the rows of its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interleave {
    pub parent: String,
    pub on_delete_cascade: bool,
}

/// Secondary index of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
    /// Non key columns copied into the index.
    pub storing: Vec<String>,
}

impl IndexDef {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            storing: Vec::new(),
        }
    }
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
    pub fn storing<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.storing = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Named counter handing out key values, created and dropped together with its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDef {
    pub name: String,
    pub start_with_counter: Option<i64>,
}

impl SequenceDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_with_counter: None,
        }
    }
    pub fn start_with_counter(mut self, value: i64) -> Self {
        self.start_with_counter = Some(value);
        self
    }
}

/// Reference from columns of a table to the key columns of another one.
///
/// Only named constraints can be dropped on their own, before the table itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub references: String,
    pub referenced_columns: Vec<String>,
    pub on_delete_cascade: bool,
}

impl ForeignKeyDef {
    pub fn new<I, J, S, T>(columns: I, references: impl Into<String>, referenced_columns: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            references: references.into(),
            referenced_columns: referenced_columns.into_iter().map(Into::into).collect(),
            on_delete_cascade: false,
        }
    }
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn on_delete_cascade(mut self) -> Self {
        self.on_delete_cascade = true;
        self
    }
}

/// Immutable description of a table, consumed by the SQL writers.
///
/// Columns keep their declaration order. The primary key follows `key_order` when it is not
/// empty, the declaration order of the key columns otherwise.
#[derive(Debug, Clone, Default)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub key_order: Vec<String>,
    pub interleave: Option<Interleave>,
    pub indexes: Vec<IndexDef>,
    pub foreign_keys: Vec<ForeignKeyDef>,
    /// Created before the table and dropped after it.
    pub sequences: Vec<SequenceDef>,
}

impl TableDef {
    pub fn builder(name: impl Into<String>) -> TableDefBuilder {
        TableDefBuilder(TableDef {
            name: name.into(),
            ..Default::default()
        })
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &ColumnDef> + Clone {
        let ordered = !self.key_order.is_empty();
        self.key_order
            .iter()
            .filter_map(|name| self.column(name))
            .chain(self.columns.iter().filter(move |c| !ordered && c.primary_key))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The primary key column whose value the database generates when none is supplied.
    ///
    /// Either the column explicitly marked with [`Autoincrement::Enabled`], or the only
    /// primary key column when it is an integer with no default of its own (expression,
    /// sequence, computed value or explicit identity options).
    pub fn autoincrement_column(&self) -> Option<&ColumnDef> {
        let usable = |c: &&ColumnDef| {
            c.primary_key
                && c.identity.is_none()
                && c.default.is_none()
                && c.sequence.is_none()
                && c.computed.is_none()
        };
        if let Some(column) = self
            .columns
            .iter()
            .filter(usable)
            .find(|c| c.autoincrement == Autoincrement::Enabled)
        {
            return Some(column);
        }
        let mut primary_key = self.primary_key();
        let (Some(column), None) = (primary_key.next(), primary_key.next()) else {
            return None;
        };
        (usable(&column)
            && column.autoincrement == Autoincrement::Auto
            && matches!(column.value, Value::Int64(..)))
        .then_some(column)
    }

    /// True when the database assigns the value of the column.
    pub fn is_generated(&self, column: &ColumnDef) -> bool {
        column.identity.is_some()
            || column.sequence.is_some()
            || column.computed.is_some()
            || self
                .autoincrement_column()
                .is_some_and(|c| c.name == column.name)
    }
}

pub struct TableDefBuilder(TableDef);

impl TableDefBuilder {
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.0.columns.push(column);
        self
    }
    /// Declares the primary key columns in key order, which can differ from the column order.
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.key_order = columns.into_iter().map(Into::into).collect();
        self
    }
    pub fn interleave_in(mut self, parent: impl Into<String>, on_delete_cascade: bool) -> Self {
        self.0.interleave = Some(Interleave {
            parent: parent.into(),
            on_delete_cascade,
        });
        self
    }
    pub fn index(mut self, index: IndexDef) -> Self {
        self.0.indexes.push(index);
        self
    }
    pub fn foreign_key(mut self, foreign_key: ForeignKeyDef) -> Self {
        self.0.foreign_keys.push(foreign_key);
        self
    }
    pub fn sequence(mut self, sequence: SequenceDef) -> Self {
        self.0.sequences.push(sequence);
        self
    }
    pub fn build(mut self) -> TableDef {
        let table = &mut self.0;
        if !table.key_order.is_empty() {
            for column in table.columns.iter_mut() {
                if table.key_order.contains(&column.name) {
                    column.primary_key = true;
                    column.nullable = false;
                } else if column.primary_key {
                    table.key_order.push(column.name.clone());
                }
            }
            for name in &table.key_order {
                if !table.columns.iter().any(|c| &c.name == name) {
                    log::warn!("Table {} has no column {} for its primary key", table.name, name);
                }
            }
        }
        self.0
    }
}

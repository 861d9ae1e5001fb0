use crate::Value;

/// Whether a column takes part in server side key generation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Autoincrement {
    /// Decided from the table shape: the single integer primary key column qualifies.
    #[default]
    Auto,
    Enabled,
    Disabled,
}

/// Options of an explicit identity column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IdentityOptions {
    /// First value of the internal counter.
    pub start_counter_with: Option<i64>,
}

/// Declarative specification of a table column.
///
/// Built with [`ColumnDef::new`] and the chained setters, for example:
/// ```rust
/// use cloudspan_core::{AsValue, ColumnDef};
/// let id = ColumnDef::new("id", i64::as_empty_value()).primary_key();
/// let name = ColumnDef::new("name", String::as_empty_value()).not_null();
/// assert!(!id.nullable && id.primary_key);
/// assert!(!name.primary_key);
/// ```
#[derive(Default, Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    /// Typed NULL describing the column type.
    pub value: Value,
    /// Explicit SQL type, used instead of the one derived from `value`.
    pub column_type: Option<String>,
    pub nullable: bool,
    pub primary_key: bool,
    pub autoincrement: Autoincrement,
    pub identity: Option<IdentityOptions>,
    /// Server side default expression.
    pub default: Option<String>,
    /// Sequence whose next value is the default.
    pub sequence: Option<String>,
    /// Expression of a stored generated column.
    pub computed: Option<String>,
    /// Accepts the pending commit timestamp sentinel.
    pub commit_timestamp: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: value.as_null(),
            nullable: true,
            ..Default::default()
        }
    }
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
    /// Primary key columns are never nullable.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }
    pub fn autoincrement(mut self, autoincrement: Autoincrement) -> Self {
        self.autoincrement = autoincrement;
        self
    }
    pub fn identity(mut self, options: IdentityOptions) -> Self {
        self.identity = Some(options);
        self
    }
    pub fn default_expr(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(expression.into());
        self
    }
    pub fn sequence(mut self, name: impl Into<String>) -> Self {
        self.sequence = Some(name.into());
        self
    }
    pub fn computed(mut self, expression: impl Into<String>) -> Self {
        self.computed = Some(expression.into());
        self
    }
    pub fn commit_timestamp(mut self) -> Self {
        self.commit_timestamp = true;
        self
    }
    pub fn column_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = Some(column_type.into());
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

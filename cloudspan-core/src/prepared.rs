use crate::{Result, Value};
use std::fmt::{Debug, Display};

/// A parameterized statement handle.
///
/// # Binding Semantics
/// * `bind` appends a value (the driver chooses the actual placeholder naming).
/// * `bind_index` sets the parameter at `index` (from 0).
/// * `bind_as` converts the value to the declared column type before binding it.
///
/// Methods return `&mut Self` for fluent chaining:
/// ```rust,ignore
/// prepared.bind(42.into())?.bind("hello".into())?;
/// ```
pub trait Prepared: Send + Sync + Display + Debug {
    /// Append a parameter value.
    fn bind(&mut self, value: Value) -> Result<&mut Self>;
    /// Bind a value at a specific index.
    fn bind_index(&mut self, value: Value, index: u64) -> Result<&mut Self>;
    /// Remove all the previously bound values.
    fn clear_bindings(&mut self) -> Result<&mut Self>;
    /// Append a value typed as `declared`.
    fn bind_as(&mut self, value: Value, declared: &Value) -> Result<&mut Self> {
        self.bind(value.try_as(declared)?)
    }
}

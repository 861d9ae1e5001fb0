use crate::{SpannerType, WireValue, codec};
use cloudspan_core::{DataError, Error, Prepared, Result, Value, truncate_long};
use std::fmt::{self, Display};

/// Most parameters a single statement can carry.
pub const MAX_PARAMETERS: u64 = 950;

/// A statement with named parameters `@a0`, `@a1`, ... in binding order.
///
/// Values are encoded when bound, so a value that does not fit its declared type fails
/// right away instead of at execution time.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannerPrepared {
    pub(crate) sql: String,
    pub(crate) params: Vec<Option<(Option<SpannerType>, WireValue)>>,
    pub(crate) index: u64,
}

impl SpannerPrepared {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            index: 0,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    fn set(&mut self, index: u64, encoded: (Option<SpannerType>, WireValue)) -> Result<()> {
        let position = match usize::try_from(index) {
            Ok(position) if index < MAX_PARAMETERS => position,
            _ => {
                let error = Error::from(DataError::invalid_state(format!(
                    "Parameter index {} is past the limit of {} parameters of `{}`",
                    index,
                    MAX_PARAMETERS,
                    truncate_long!(self.sql)
                )));
                log::error!("{:#}", error);
                return Err(error);
            }
        };
        if self.params.len() <= position {
            self.params.resize(position + 1, None);
        }
        self.params[position] = Some(encoded);
        self.index = index + 1;
        Ok(())
    }

    /// Splits the statement into the parts of an execute request.
    pub(crate) fn into_parts(
        self,
    ) -> Result<(String, Vec<(String, WireValue)>, Vec<(String, SpannerType)>)> {
        let mut params = Vec::with_capacity(self.params.len());
        let mut param_types = Vec::with_capacity(self.params.len());
        for (i, param) in self.params.into_iter().enumerate() {
            let Some((ty, value)) = param else {
                let error = Error::msg(format!(
                    "The parameter a{} of the query `{}` was not set",
                    i,
                    truncate_long!(self.sql)
                ));
                log::error!("{:#}", error);
                return Err(error);
            };
            let name = format!("a{}", i);
            if let Some(ty) = ty {
                param_types.push((name.clone(), ty));
            }
            params.push((name, value));
        }
        Ok((self.sql, params, param_types))
    }
}

impl Prepared for SpannerPrepared {
    fn bind(&mut self, value: Value) -> Result<&mut Self> {
        self.bind_index(value, self.index)
    }
    fn bind_index(&mut self, value: Value, index: u64) -> Result<&mut Self> {
        let encoded = codec::encode(&value)?;
        self.set(index, encoded)?;
        Ok(self)
    }
    fn clear_bindings(&mut self) -> Result<&mut Self> {
        self.params.clear();
        self.index = 0;
        Ok(self)
    }
    fn bind_as(&mut self, value: Value, declared: &Value) -> Result<&mut Self> {
        let encoded = codec::encode_as(value, declared)?;
        self.set(self.index, encoded)?;
        Ok(self)
    }
}

impl Display for SpannerPrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}

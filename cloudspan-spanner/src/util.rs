use crate::{ResultSet, SpannerDriver, SpannerType, WireValue, codec};
use cloudspan_core::{
    Error, Query, QueryResult, Result, Row, RowLabeled, RowNames, RowsAffected, Value,
};

pub(crate) type StatementParts = (String, Vec<(String, WireValue)>, Vec<(String, SpannerType)>);

pub(crate) fn statement_parts(query: Query<SpannerDriver>) -> Result<StatementParts> {
    match query {
        Query::Raw(sql) => Ok((sql, Vec::new(), Vec::new())),
        Query::Prepared(prepared) => prepared.into_parts(),
    }
}

pub(crate) fn wire_row_to_row(metadata: &[crate::Field], row: Vec<WireValue>) -> Result<Row> {
    if row.len() != metadata.len() {
        return Err(Error::msg(format!(
            "The row has {} values but the result declares {} columns",
            row.len(),
            metadata.len()
        )));
    }
    metadata
        .iter()
        .zip(row)
        .enumerate()
        .map(|(i, (field, value))| {
            codec::decode(&field.ty, value).map_err(|e| {
                e.context(format!(
                    "Could not decode column {} `{}`: {}",
                    i, field.name, field.ty
                ))
            })
        })
        .collect()
}

/// Rows first, then the modify count when the statement was DML.
///
/// A DML statement returning rows (`THEN RETURN`) reports the first column of its last row as
/// the generated key.
pub(crate) fn result_set_to_results(result_set: ResultSet) -> Result<Vec<QueryResult>> {
    let labels: RowNames = result_set
        .metadata
        .iter()
        .map(|f| f.name.clone())
        .collect();
    let mut results = Vec::with_capacity(result_set.rows.len() + 1);
    let mut last_id = None;
    for row in result_set.rows {
        let values = wire_row_to_row(&result_set.metadata, row)?;
        last_id = match values.first() {
            Some(Value::Int64(Some(v))) => Some(*v),
            _ => None,
        };
        results.push(RowLabeled::new(labels.clone(), values).into());
    }
    if let Some(stats) = result_set.stats {
        results.push(
            RowsAffected {
                rows_affected: stats.row_count_exact.max(0) as u64,
                last_affected_id: last_id,
            }
            .into(),
        );
    }
    Ok(results)
}

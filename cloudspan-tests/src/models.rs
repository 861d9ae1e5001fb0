use cloudspan::{
    AsValue, ColumnDef, Entity, IdentityOptions, IndexDef, JsonValue, Result, Row, RowLabeled,
    TableDef,
};
use cloudspan_spanner::PendingCommitTimestamp;
use std::sync::LazyLock;
use time::OffsetDateTime;

/// Integer key generated by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<JsonValue>,
}

static VENUES: LazyLock<TableDef> = LazyLock::new(|| {
    TableDef::builder("venues")
        .column(ColumnDef::new("id", i64::as_empty_value()).primary_key())
        .column(ColumnDef::new("name", String::as_empty_value()).not_null())
        .column(ColumnDef::new("description", JsonValue::as_empty_value()))
        .build()
});

impl Venue {
    pub fn new(name: impl Into<String>, description: Option<JsonValue>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description,
        }
    }
}

impl Entity for Venue {
    fn table() -> &'static TableDef {
        &VENUES
    }

    fn row(&self) -> Row {
        [
            self.id.as_value(),
            self.name.clone().as_value(),
            self.description.clone().as_value(),
        ]
        .into()
    }

    fn from_row(mut row: RowLabeled) -> Result<Self> {
        Ok(Self {
            id: AsValue::try_from_value(row.take_column("id")?)?,
            name: AsValue::try_from_value(row.take_column("name")?)?,
            description: AsValue::try_from_value(row.take_column("description")?)?,
        })
    }
}

/// Key supplied by the caller, last update stamped at commit time.
#[derive(Debug, Clone, PartialEq)]
pub struct Singer {
    pub id: String,
    pub name: String,
    /// `None` asks the database for the commit timestamp.
    pub updated_at: Option<OffsetDateTime>,
}

static SINGERS: LazyLock<TableDef> = LazyLock::new(|| {
    TableDef::builder("singers")
        .column(ColumnDef::new("id", String::as_empty_value()).primary_key())
        .column(ColumnDef::new("name", String::as_empty_value()).not_null())
        .column(
            ColumnDef::new("updated_at", OffsetDateTime::as_empty_value())
                .not_null()
                .commit_timestamp(),
        )
        .index(IndexDef::new("singers_by_name", ["name"]).storing(["updated_at"]))
        .build()
});

impl Entity for Singer {
    fn table() -> &'static TableDef {
        &SINGERS
    }

    fn row(&self) -> Row {
        let updated_at = match self.updated_at {
            Some(v) => v.as_value(),
            None => PendingCommitTimestamp.into(),
        };
        [
            self.id.clone().as_value(),
            self.name.clone().as_value(),
            updated_at,
        ]
        .into()
    }

    fn from_row(mut row: RowLabeled) -> Result<Self> {
        Ok(Self {
            id: AsValue::try_from_value(row.take_column("id")?)?,
            name: AsValue::try_from_value(row.take_column("name")?)?,
            updated_at: AsValue::try_from_value(row.take_column("updated_at")?)?,
        })
    }
}

/// Interleaved in `venues`, composite key with an explicit identity column.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketSale {
    pub venue_id: i64,
    pub id: Option<i64>,
    pub customer: String,
    pub seats: Vec<String>,
}

static TICKET_SALES: LazyLock<TableDef> = LazyLock::new(|| {
    TableDef::builder("ticket_sales")
        .column(ColumnDef::new("venue_id", i64::as_empty_value()).primary_key())
        .column(
            ColumnDef::new("id", i64::as_empty_value())
                .primary_key()
                .identity(IdentityOptions {
                    start_counter_with: Some(1000),
                }),
        )
        .column(ColumnDef::new("customer", String::as_empty_value()).not_null())
        .column(ColumnDef::new("seats", Vec::<String>::as_empty_value()))
        .interleave_in("venues", true)
        .build()
});

impl Entity for TicketSale {
    fn table() -> &'static TableDef {
        &TICKET_SALES
    }

    fn row(&self) -> Row {
        [
            self.venue_id.as_value(),
            self.id.as_value(),
            self.customer.clone().as_value(),
            self.seats.clone().as_value(),
        ]
        .into()
    }

    fn from_row(mut row: RowLabeled) -> Result<Self> {
        let seats: Option<Vec<String>> = AsValue::try_from_value(row.take_column("seats")?)?;
        Ok(Self {
            venue_id: AsValue::try_from_value(row.take_column("venue_id")?)?,
            id: AsValue::try_from_value(row.take_column("id")?)?,
            customer: AsValue::try_from_value(row.take_column("customer")?)?,
            seats: seats.unwrap_or_default(),
        })
    }
}

/// Every model table, parents first.
pub fn tables() -> [&'static TableDef; 3] {
    [Venue::table(), Singer::table(), TicketSale::table()]
}


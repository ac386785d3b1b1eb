use std::fmt;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, warn};

use super::{ItemRecord, MarketGroup, StaticCatalog};
use crate::error::{Error, Result};
use crate::item::{Activity, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaVariant {
    AuxData,
    StaticData,
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SchemaVariant::AuxData => "aux_data",
            SchemaVariant::StaticData => "static_data",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SchemaDefinition {
    variant: SchemaVariant,
    items_table: &'static str,
    market_groups_table: Option<&'static str>,
    materials_table: &'static str,
    products_table: &'static str,
    times_table: Option<&'static str>,
    adjusted_price_column: Option<&'static str>,
}

const ITEM_COLUMNS: [&str; 3] = ["typeID", "typeName", "marketGroupID"];
const MARKET_GROUP_COLUMNS: [&str; 3] = ["marketGroupID", "parentGroupID", "marketGroupName"];
const MATERIAL_COLUMNS: [&str; 4] = ["typeID", "activityID", "materialTypeID", "quantity"];
const PRODUCT_COLUMNS: [&str; 4] = ["typeID", "activityID", "productTypeID", "quantity"];
const TIME_COLUMNS: [&str; 3] = ["typeID", "activityID", "time"];

impl SchemaVariant {
    fn definition(self) -> SchemaDefinition {
        match self {
            SchemaVariant::AuxData => SchemaDefinition {
                variant: SchemaVariant::AuxData,
                items_table: "Items",
                market_groups_table: Some("MarketGroups"),
                materials_table: "bpMaterials",
                products_table: "bpProducts",
                times_table: Some("bpTimes"),
                adjusted_price_column: Some("adjPrice"),
            },
            SchemaVariant::StaticData => SchemaDefinition {
                variant: SchemaVariant::StaticData,
                items_table: "invTypes",
                market_groups_table: Some("invMarketGroups"),
                materials_table: "industryActivityMaterials",
                products_table: "industryActivityProducts",
                times_table: Some("industryActivity"),
                adjusted_price_column: Some("adjPrice"),
            },
        }
    }
}

/// Load an industry catalog from a SQLite database file.
///
/// Both the compact `Items`/`bpMaterials`/`bpProducts` layout and the
/// `invTypes`/`industryActivity*` static-data export are recognised. Market
/// groups, activity times and adjusted prices are optional; rows that
/// reference unknown items or unsupported activities are skipped with a
/// warning rather than failing the load.
pub fn load_catalog(db_path: &Path) -> Result<StaticCatalog> {
    if !db_path.is_file() {
        return Err(Error::CatalogNotFound {
            path: db_path.to_path_buf(),
        });
    }
    let connection = Connection::open(db_path)?;
    debug!(path = %db_path.display(), "opening industry catalog");
    load_catalog_from_connection(&connection)
}

/// Load an industry catalog from an already-open connection.
pub fn load_catalog_from_connection(connection: &Connection) -> Result<StaticCatalog> {
    let schema = detect_schema(connection)?;
    debug!(schema = %schema.variant, "loading industry catalog");

    let mut catalog = StaticCatalog::default();
    load_items(connection, &schema, &mut catalog)?;
    if let Some(table) = schema.market_groups_table {
        load_market_groups(connection, table, &mut catalog)?;
    }
    load_activity_rows(
        connection,
        schema.materials_table,
        "materialTypeID",
        &mut catalog,
        RowKind::Material,
    )?;
    load_activity_rows(
        connection,
        schema.products_table,
        "productTypeID",
        &mut catalog,
        RowKind::Product,
    )?;
    if let Some(table) = schema.times_table {
        load_times(connection, table, &mut catalog)?;
    }

    catalog.validate()?;
    debug!(items = catalog.len(), "industry catalog loaded");
    Ok(catalog)
}

fn detect_schema(connection: &Connection) -> Result<SchemaDefinition> {
    for variant in [SchemaVariant::AuxData, SchemaVariant::StaticData] {
        if let Some(schema) = detect_variant(connection, variant)? {
            return Ok(schema);
        }
    }
    Err(Error::UnsupportedSchema)
}

fn detect_variant(
    connection: &Connection,
    variant: SchemaVariant,
) -> Result<Option<SchemaDefinition>> {
    let mut schema = variant.definition();

    let required = [
        (schema.items_table, &ITEM_COLUMNS[..]),
        (schema.materials_table, &MATERIAL_COLUMNS[..]),
        (schema.products_table, &PRODUCT_COLUMNS[..]),
    ];
    for (table, columns) in required {
        if !table_exists(connection, table)? || !table_has_columns(connection, table, columns)? {
            return Ok(None);
        }
    }

    if let Some(table) = schema.market_groups_table {
        if !table_exists(connection, table)?
            || !table_has_columns(connection, table, &MARKET_GROUP_COLUMNS)?
        {
            schema.market_groups_table = None;
        }
    }

    if let Some(table) = schema.times_table {
        if !table_exists(connection, table)? || !table_has_columns(connection, table, &TIME_COLUMNS)?
        {
            schema.times_table = None;
        }
    }

    if let Some(column) = schema.adjusted_price_column {
        if !table_has_columns(connection, schema.items_table, &[column])? {
            schema.adjusted_price_column = None;
        }
    }

    Ok(Some(schema))
}

fn load_items(
    connection: &Connection,
    schema: &SchemaDefinition,
    catalog: &mut StaticCatalog,
) -> Result<()> {
    let price = schema.adjusted_price_column.unwrap_or("NULL");
    let sql = format!(
        "SELECT typeID, typeName, marketGroupID, {price} FROM {table}",
        table = schema.items_table
    );

    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, TypeId>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<i64>>(2)?,
            row.get::<_, Option<f64>>(3)?,
        ))
    })?;

    let mut unnamed = 0usize;
    let mut duplicates = 0usize;
    for row in rows {
        let (id, name, market_group_id, adjusted_price) = row?;
        let Some(name) = name.map(|name| name.trim().to_string()).filter(|n| !n.is_empty()) else {
            unnamed += 1;
            continue;
        };
        let inserted = catalog.insert_item(ItemRecord {
            id,
            name,
            market_group_id,
            adjusted_price,
        });
        if !inserted {
            duplicates += 1;
        }
    }

    if unnamed > 0 {
        warn!(unnamed, "ignored item rows without a name");
    }
    if duplicates > 0 {
        warn!(duplicates, "ignored duplicate item rows");
    }
    Ok(())
}

fn load_market_groups(
    connection: &Connection,
    table: &str,
    catalog: &mut StaticCatalog,
) -> Result<()> {
    let sql = format!("SELECT marketGroupID, parentGroupID, marketGroupName FROM {table}");
    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(MarketGroup {
            id: row.get(0)?,
            parent_id: row.get(1)?,
            name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        })
    })?;

    for row in rows {
        catalog.insert_market_group(row?);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Material,
    Product,
}

fn load_activity_rows(
    connection: &Connection,
    table: &str,
    target_column: &str,
    catalog: &mut StaticCatalog,
    kind: RowKind,
) -> Result<()> {
    let sql = format!("SELECT typeID, activityID, {target_column}, quantity FROM {table}");
    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, TypeId>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, TypeId>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    let mut skipped_rows = 0usize;
    let mut skipped_activities = 0usize;
    for row in rows {
        let (blueprint, activity_id, target, quantity) = row?;
        let Some(activity) = Activity::from_id(activity_id) else {
            skipped_activities += 1;
            continue;
        };
        let known = catalog.item(blueprint).is_some() && catalog.item(target).is_some();
        let quantity = match u64::try_from(quantity) {
            Ok(quantity) if known => quantity,
            _ => {
                skipped_rows += 1;
                continue;
            }
        };
        match kind {
            RowKind::Material => catalog.insert_material(blueprint, activity, target, quantity),
            RowKind::Product if quantity > 0 => {
                catalog.insert_product(blueprint, activity, target, quantity)
            }
            RowKind::Product => skipped_rows += 1,
        }
    }

    if skipped_activities > 0 {
        debug!(table, skipped_activities, "ignored rows for unsupported activities");
    }
    if skipped_rows > 0 {
        warn!(
            table,
            skipped_rows, "ignored blueprint rows referencing unknown items or invalid quantities",
        );
    }
    Ok(())
}

fn load_times(connection: &Connection, table: &str, catalog: &mut StaticCatalog) -> Result<()> {
    let sql = format!("SELECT typeID, activityID, time FROM {table}");
    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, TypeId>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, Option<i64>>(2)?,
        ))
    })?;

    for row in rows {
        let (blueprint, activity_id, time) = row?;
        let (Some(activity), Some(Ok(seconds))) =
            (Activity::from_id(activity_id), time.map(u64::try_from))
        else {
            continue;
        };
        if catalog.item(blueprint).is_some() {
            catalog.insert_time(blueprint, activity, seconds);
        }
    }
    Ok(())
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}

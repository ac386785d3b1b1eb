//! Unit price lookups.
//!
//! The engine reads prices through the [`PriceOracle`] trait. [`PriceList`] is
//! an in-memory table that can be filled programmatically or loaded from a CSV
//! file, and any `Fn(TypeId, OrderType) -> Option<f64>` closure also works as
//! an oracle.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::{Error, Result};
use crate::item::TypeId;
use crate::market::OrderType;

/// Read-only unit price source.
pub trait PriceOracle {
    /// Price of one unit of `item` on the given side of the order book.
    fn unit_price(&self, item: TypeId, side: OrderType) -> Option<f64>;
}

impl<F> PriceOracle for F
where
    F: Fn(TypeId, OrderType) -> Option<f64>,
{
    fn unit_price(&self, item: TypeId, side: OrderType) -> Option<f64> {
        self(item, side)
    }
}

/// Buy and sell quotes for a single item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quote {
    pub buy: Option<f64>,
    pub sell: Option<f64>,
}

/// In-memory price table.
#[derive(Debug, Clone, Default)]
pub struct PriceList {
    quotes: HashMap<TypeId, Quote>,
    source: Option<PathBuf>,
}

impl PriceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both quotes for `item`, replacing any previous entry.
    pub fn insert(&mut self, item: TypeId, buy: Option<f64>, sell: Option<f64>) {
        self.quotes.insert(item, Quote { buy, sell });
    }

    /// Builder-style variant of [`PriceList::insert`].
    #[must_use]
    pub fn with_price(mut self, item: TypeId, buy: Option<f64>, sell: Option<f64>) -> Self {
        self.insert(item, buy, sell);
        self
    }

    pub fn quote(&self, item: TypeId) -> Option<Quote> {
        self.quotes.get(&item).copied()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// File the list was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Load a price list from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        let mut list = Self::from_reader(file)?;
        list.source = Some(path.to_path_buf());
        debug!(path = %path.display(), items = list.len(), "loaded price list");
        Ok(list)
    }

    /// Load a price list from CSV with a type id column and buy/sell columns.
    ///
    /// Empty price cells mean the price is unavailable on that side.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|err| Error::PriceDataValidation {
                message: format!("failed to read price list headers: {err}"),
            })?
            .clone();

        let normalize = |s: &str| {
            s.to_ascii_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect::<String>()
        };
        let normalized_headers: Vec<String> = headers.iter().map(normalize).collect();

        let synonyms: &[(&str, &[&str])] = &[
            ("type_id", &["type_id", "typeid", "id"]),
            ("buy", &["buy", "buy_price", "buyprice"]),
            ("sell", &["sell", "sell_price", "sellprice"]),
        ];

        let mut index_map: BTreeMap<&str, usize> = BTreeMap::new();
        for (canon, alts) in synonyms {
            if let Some(index) = alts
                .iter()
                .find_map(|alt| normalized_headers.iter().position(|h| h == alt))
            {
                index_map.insert(*canon, index);
            }
        }

        let missing: Vec<&str> = ["type_id", "buy", "sell"]
            .into_iter()
            .filter(|c| !index_map.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(Error::PriceDataValidation {
                message: format!(
                    "price list missing required columns: {}. Available: {}",
                    missing.join(", "),
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            });
        }

        let mut list = PriceList::new();
        for (offset, result) in csv_reader.records().enumerate() {
            // header is line 1
            let row = offset + 2;
            let record = result.map_err(|e| Error::PriceDataValidation {
                message: e.to_string(),
            })?;

            let get = |field: &str| -> String {
                index_map
                    .get(field)
                    .and_then(|&i| record.get(i))
                    .unwrap_or_default()
                    .to_string()
            };

            let raw_id = get("type_id");
            let item: TypeId = raw_id.parse().map_err(|e| Error::PriceDataValidation {
                message: format!("invalid type id '{raw_id}' at row {row}: {e}"),
            })?;
            let buy = parse_price(&get("buy"), "buy", row)?;
            let sell = parse_price(&get("sell"), "sell", row)?;

            if list.quotes.contains_key(&item) {
                return Err(Error::PriceDataValidation {
                    message: format!("duplicate price entry for type id {item} at row {row}"),
                });
            }
            list.insert(item, buy, sell);
        }

        Ok(list)
    }
}

impl PriceOracle for PriceList {
    fn unit_price(&self, item: TypeId, side: OrderType) -> Option<f64> {
        let quote = self.quotes.get(&item)?;
        match side {
            OrderType::Buy => quote.buy,
            OrderType::Sell => quote.sell,
        }
    }
}

fn parse_price(value: &str, column: &str, row: usize) -> Result<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    let price: f64 = value.parse().map_err(|e| Error::PriceDataValidation {
        message: format!("invalid {column} price '{value}' at row {row}: {e}"),
    })?;
    if !price.is_finite() || price < 0.0 {
        return Err(Error::PriceDataValidation {
            message: format!("{column} price at row {row} must be a non-negative number"),
        });
    }
    Ok(Some(price))
}

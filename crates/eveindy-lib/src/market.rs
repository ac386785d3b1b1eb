//! Trade fee rules and fee configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Highest trained level of a character skill.
pub const MAX_SKILL_LEVEL: u8 = 5;

/// Default system cost index applied to job fees.
pub const DEFAULT_SYSTEM_COST_INDEX: f64 = 0.025;

/// Job fee surcharge for NPC stations.
pub const STATION_FEE_MULTIPLIER: f64 = 1.1;

/// Which side of the order book a trade goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Trade against buy orders (place one when buying, fill one when selling).
    #[default]
    Buy,
    /// Trade against sell orders.
    Sell,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Buy => f.write_str("buy"),
            OrderType::Sell => f.write_str("sell"),
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(OrderType::Buy),
            "sell" => Ok(OrderType::Sell),
            other => Err(format!("unknown order type '{other}' (expected buy or sell)")),
        }
    }
}

/// Where manufacturing jobs are installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildLocation {
    #[default]
    Structure,
    Station,
}

impl BuildLocation {
    /// Multiplier applied to job fees at this location.
    pub fn fee_multiplier(self) -> f64 {
        match self {
            BuildLocation::Structure => 1.0,
            BuildLocation::Station => STATION_FEE_MULTIPLIER,
        }
    }
}

/// Character skills and market choices that affect trade and job fees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    pub broker_relations: u8,
    pub accounting: u8,
    pub buy_via: OrderType,
    pub sell_via: OrderType,
    pub build_location: BuildLocation,
    pub system_cost_index: f64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            broker_relations: 0,
            accounting: 0,
            buy_via: OrderType::Buy,
            sell_via: OrderType::Sell,
            build_location: BuildLocation::Structure,
            system_cost_index: DEFAULT_SYSTEM_COST_INDEX,
        }
    }
}

impl FeeConfig {
    /// Validate skill levels and the cost index.
    pub fn validate(&self) -> Result<()> {
        check_skill("broker relations", self.broker_relations)?;
        check_skill("accounting", self.accounting)?;
        if !(0.0..=1.0).contains(&self.system_cost_index) {
            return Err(Error::InvalidEfficiency {
                message: format!(
                    "system cost index {} must be between 0 and 1",
                    self.system_cost_index
                ),
            });
        }
        Ok(())
    }

    pub fn broker_fee_rate(&self) -> f64 {
        broker_fee_rate(self.broker_relations)
    }

    pub fn sales_tax_rate(&self) -> f64 {
        sales_tax_rate(self.accounting)
    }

    /// Fee paid when buying goods worth `cost`.
    pub fn buy_fee(&self, cost: f64) -> f64 {
        buy_fee(cost, self.buy_via, self.broker_relations)
    }

    /// Fee paid when selling goods worth `revenue`.
    pub fn sell_fee(&self, revenue: f64) -> f64 {
        sell_fee(revenue, self.sell_via, self.broker_relations, self.accounting)
    }
}

pub(crate) fn check_skill(name: &str, level: u8) -> Result<()> {
    if level > MAX_SKILL_LEVEL {
        return Err(Error::InvalidEfficiency {
            message: format!("{name} skill level {level} must be between 0 and {MAX_SKILL_LEVEL}"),
        });
    }
    Ok(())
}

/// Broker fee fraction for a Broker Relations level.
///
/// `0.03 - 0.01 * level`, clamped at 0, so levels 3 to 5 pay no broker fee
/// instead of receiving a negative one.
pub fn broker_fee_rate(broker_relations: u8) -> f64 {
    (0.03 - f64::from(broker_relations) * 0.01).max(0.0)
}

/// Sales tax fraction for an Accounting level.
pub fn sales_tax_rate(accounting: u8) -> f64 {
    0.02 * (1.0 - f64::from(accounting) * 0.1)
}

/// Broker fee for buying through a buy order; buying from sell orders is free.
pub fn buy_fee(cost: f64, via: OrderType, broker_relations: u8) -> f64 {
    match via {
        OrderType::Buy => round2(cost * broker_fee_rate(broker_relations)),
        OrderType::Sell => 0.0,
    }
}

/// Sales tax plus, when listing a sell order, the broker fee.
pub fn sell_fee(revenue: f64, via: OrderType, broker_relations: u8, accounting: u8) -> f64 {
    let tax = round2(revenue * sales_tax_rate(accounting));
    match via {
        OrderType::Sell => tax + round2(revenue * broker_fee_rate(broker_relations)),
        OrderType::Buy => tax,
    }
}

/// Round to two decimal places (ISK cents).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_fee_is_clamped_at_zero() {
        assert!((broker_fee_rate(0) - 0.03).abs() < 1e-12);
        assert!((broker_fee_rate(2) - 0.01).abs() < 1e-12);
        assert_eq!(broker_fee_rate(4), 0.0);
        assert_eq!(broker_fee_rate(5), 0.0);
    }

    #[test]
    fn sales_tax_scales_with_accounting() {
        assert!((sales_tax_rate(0) - 0.02).abs() < 1e-12);
        assert!((sales_tax_rate(5) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn buy_fee_only_applies_to_buy_orders() {
        assert_eq!(buy_fee(1_000.0, OrderType::Buy, 0), 30.0);
        assert_eq!(buy_fee(1_000.0, OrderType::Sell, 0), 0.0);
    }

    #[test]
    fn sell_fee_adds_broker_fee_for_sell_orders() {
        assert_eq!(sell_fee(1_000.0, OrderType::Buy, 0, 0), 20.0);
        assert_eq!(sell_fee(1_000.0, OrderType::Sell, 0, 0), 50.0);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let fees = FeeConfig {
            accounting: 6,
            ..FeeConfig::default()
        };
        assert!(fees.validate().is_err());

        let fees = FeeConfig {
            system_cost_index: 1.5,
            ..FeeConfig::default()
        };
        assert!(fees.validate().is_err());
        assert!(FeeConfig::default().validate().is_ok());
    }

    #[test]
    fn order_type_parses_case_insensitively() {
        assert_eq!("SELL".parse::<OrderType>().unwrap(), OrderType::Sell);
        assert!("market".parse::<OrderType>().is_err());
    }
}

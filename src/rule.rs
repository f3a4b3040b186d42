use serde::{Deserialize, Serialize};

use crate::error::{Result, TicketError};
use crate::search::round_product;

/// Inclusive numeric interval on the product of a ticket's odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsRange {
    pub min: f64,
    pub max: f64,
}

impl OddsRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Static shape of one ticket type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TicketRule {
    pub size: usize,
    pub min: f64,
    pub max: f64,
    /// Fraction used to widen [min, max] symmetrically, e.g. 0.15.
    pub tolerance: f64,
}

impl TicketRule {
    pub fn new(size: usize, min: f64, max: f64, tolerance: f64) -> Result<Self> {
        let rule = Self {
            size,
            min,
            max,
            tolerance,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Two selections, total 1.90 - 2.50.
    pub fn cota2() -> Self {
        Self {
            size: 2,
            min: 1.90,
            max: 2.50,
            tolerance: 0.10,
        }
    }

    /// Four selections, total 4.00 - 6.00.
    pub fn biletul_zilei() -> Self {
        Self {
            size: 4,
            min: 4.00,
            max: 6.00,
            tolerance: 0.20,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(TicketError::InvalidRule("size must be at least 1".into()));
        }
        if !self.min.is_finite() || !self.max.is_finite() || self.min <= 0.0 {
            return Err(TicketError::InvalidRule(format!(
                "range bounds must be finite and positive, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(TicketError::InvalidRule(format!(
                "min {} exceeds max {}",
                self.min, self.max
            )));
        }
        if !(0.0..1.0).contains(&self.tolerance) {
            return Err(TicketError::InvalidRule(format!(
                "tolerance {} outside [0, 1)",
                self.tolerance
            )));
        }
        Ok(())
    }

    pub fn range(&self) -> OddsRange {
        OddsRange {
            min: self.min,
            max: self.max,
        }
    }

    /// Edges carry the same 3-decimal rounding as ticket products, so a
    /// product sitting on an edge is inside the band.
    pub fn tolerance_band(&self) -> OddsRange {
        OddsRange {
            min: round_product(self.min * (1.0 - self.tolerance)),
            max: round_product(self.max * (1.0 + self.tolerance)),
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Gap from `product` to the nearest bound; zero inside the range.
    /// Non-finite products are infinitely far away.
    pub fn distance(&self, product: f64) -> f64 {
        if !product.is_finite() {
            f64::INFINITY
        } else if product < self.min {
            self.min - product
        } else if product > self.max {
            product - self.max
        } else {
            0.0
        }
    }
}

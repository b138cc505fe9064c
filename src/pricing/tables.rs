//! Static pricing configuration: coefficient tables and the service catalog.
//!
//! `PricingTables::default()` is the canonical set used by the product. A
//! replacement set can be loaded from JSON; it is validated before use so the
//! calculators never see a malformed table.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

use super::models::{EmployeeBand, Industry};

/// Industry and scale multipliers with their fallbacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTable {
    pub industry: BTreeMap<Industry, Decimal>,
    pub industry_fallback: Decimal,
    pub scale: BTreeMap<EmployeeBand, Decimal>,
    pub scale_fallback: Decimal,
}

impl CoefficientTable {
    /// Industry multiplier, or the fallback when the table has no entry
    pub fn resolve_industry(&self, industry: Industry) -> Decimal {
        match self.industry.get(&industry) {
            Some(coef) => *coef,
            None => {
                tracing::debug!(?industry, fallback = %self.industry_fallback, "Industry coefficient fallback");
                self.industry_fallback
            }
        }
    }

    /// Scale multiplier, or the fallback when the table has no entry
    pub fn resolve_scale(&self, band: EmployeeBand) -> Decimal {
        match self.scale.get(&band) {
            Some(coef) => *coef,
            None => {
                tracing::debug!(?band, fallback = %self.scale_fallback, "Scale coefficient fallback");
                self.scale_fallback
            }
        }
    }

    fn collect_errors(&self, errors: &mut Vec<String>) {
        for (industry, coef) in &self.industry {
            if *coef <= Decimal::ZERO {
                errors.push(format!("industry.{:?}: multiplier must be positive, got {}", industry, coef));
            }
        }
        if self.industry_fallback <= Decimal::ZERO {
            errors.push(format!(
                "industry_fallback: multiplier must be positive, got {}",
                self.industry_fallback
            ));
        }
        for (band, coef) in &self.scale {
            if *coef <= Decimal::ZERO {
                errors.push(format!("scale.{:?}: multiplier must be positive, got {}", band, coef));
            }
        }
        if self.scale_fallback <= Decimal::ZERO {
            errors.push(format!(
                "scale_fallback: multiplier must be positive, got {}",
                self.scale_fallback
            ));
        }
    }
}

impl Default for CoefficientTable {
    fn default() -> Self {
        let industry = BTreeMap::from([
            (Industry::Retail, dec!(1.8)),
            (Industry::Production, dec!(2.1)),
            (Industry::It, dec!(2.5)),
            (Industry::Finance, dec!(2.2)),
            (Industry::Construction, dec!(1.9)),
            (Industry::Medicine, dec!(2.3)),
            (Industry::Logistics, dec!(2.0)),
            (Industry::Services, dec!(1.7)),
            (Industry::Other, dec!(1.5)),
        ]);
        let scale = BTreeMap::from([
            (EmployeeBand::Small, dec!(1.1)),
            (EmployeeBand::Medium, dec!(1.3)),
            (EmployeeBand::Large, dec!(1.5)),
            (EmployeeBand::Xlarge, dec!(1.7)),
        ]);
        Self {
            industry,
            industry_fallback: dec!(1.5),
            scale,
            scale_fallback: dec!(1.1),
        }
    }
}

/// Catalog entries the bundle rules refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceId {
    Audit,
    Strategy,
    Design,
    Development,
    AiIntegration,
    Support,
}

impl ServiceId {
    pub const ALL: [ServiceId; 6] = [
        ServiceId::Audit,
        ServiceId::Strategy,
        ServiceId::Design,
        ServiceId::Development,
        ServiceId::AiIntegration,
        ServiceId::Support,
    ];
}

/// Inclusive price bounds for a service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> Decimal {
        (self.min + self.max) / dec!(2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: ServiceId,
    pub name: String,
    pub price_range: PriceRange,
}

impl ServiceItem {
    pub fn new(id: ServiceId, name: &str, min: Decimal, max: Decimal) -> Self {
        Self {
            id,
            name: name.to_string(),
            price_range: PriceRange::new(min, max),
        }
    }

    /// Effective list price: the midpoint of the range
    pub fn effective_price(&self) -> Decimal {
        self.price_range.midpoint()
    }
}

/// Priced services plus the bundle discount rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    pub items: Vec<ServiceItem>,
    /// Fraction taken off the subtotal, e.g. 0.15
    pub bundle_discount: Decimal,
    /// Minimum line-item count for the discount to apply
    pub discount_threshold: usize,
}

impl ServiceCatalog {
    pub fn item(&self, id: ServiceId) -> Result<&ServiceItem> {
        self.items.iter().find(|item| item.id == id).ok_or_else(|| {
            EngineError::configuration(
                format!("Service catalog has no entry for {:?}", id),
                vec![format!("items.{:?} missing", id)],
            )
        })
    }

    fn collect_errors(&self, errors: &mut Vec<String>) {
        for id in ServiceId::ALL {
            if !self.items.iter().any(|item| item.id == id) {
                errors.push(format!("items.{:?}: missing from catalog", id));
            }
        }
        for item in &self.items {
            let range = item.price_range;
            if range.min < Decimal::ZERO {
                errors.push(format!("items.{:?}: min {} is negative", item.id, range.min));
            }
            if range.min > range.max {
                errors.push(format!(
                    "items.{:?}: min {} is greater than max {}",
                    item.id, range.min, range.max
                ));
            }
        }
        if self.bundle_discount < Decimal::ZERO || self.bundle_discount >= Decimal::ONE {
            errors.push(format!(
                "bundle_discount: must be in [0, 1), got {}",
                self.bundle_discount
            ));
        }
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self {
            items: vec![
                ServiceItem::new(ServiceId::Audit, "Digital maturity audit", dec!(200000), dec!(400000)),
                ServiceItem::new(
                    ServiceId::Strategy,
                    "Digital transformation strategy",
                    dec!(270000),
                    dec!(670000),
                ),
                ServiceItem::new(ServiceId::Design, "UX/UI design", dec!(400000), dec!(930000)),
                ServiceItem::new(
                    ServiceId::Development,
                    "Platform development",
                    dec!(670000),
                    dec!(2000000),
                ),
                ServiceItem::new(
                    ServiceId::AiIntegration,
                    "AI integration & automation",
                    dec!(530000),
                    dec!(1070000),
                ),
                ServiceItem::new(
                    ServiceId::Support,
                    "Support & monitoring (12 months)",
                    dec!(400000),
                    dec!(800000),
                ),
            ],
            bundle_discount: dec!(0.15),
            discount_threshold: 5,
        }
    }
}

/// The single configuration object injected into the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingTables {
    pub coefficients: CoefficientTable,
    pub catalog: ServiceCatalog,
}

impl PricingTables {
    /// Build a table set, rejecting it if any entry is malformed
    pub fn new(coefficients: CoefficientTable, catalog: ServiceCatalog) -> Result<Self> {
        let tables = Self {
            coefficients,
            catalog,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// Parse and validate a JSON table document
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: PricingTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Report every problem at once rather than the first one found
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        self.coefficients.collect_errors(&mut errors);
        self.catalog.collect_errors(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::configuration(
                format!("Pricing tables failed validation ({} problems)", errors.len()),
                errors,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_valid() {
        assert!(PricingTables::default().validate().is_ok());
    }

    #[test]
    fn test_resolve_known_coefficients() {
        let table = CoefficientTable::default();
        assert_eq!(table.resolve_industry(Industry::It), dec!(2.5));
        assert_eq!(table.resolve_industry(Industry::Retail), dec!(1.8));
        assert_eq!(table.resolve_scale(EmployeeBand::Medium), dec!(1.3));
        assert_eq!(table.resolve_scale(EmployeeBand::Xlarge), dec!(1.7));
    }

    #[test]
    fn test_resolve_unknown_uses_fallback() {
        let table = CoefficientTable::default();
        assert_eq!(table.resolve_industry(Industry::Unknown), dec!(1.5));
        assert_eq!(table.resolve_scale(EmployeeBand::Unknown), dec!(1.1));
    }

    #[test]
    fn test_resolve_missing_key_uses_fallback() {
        let mut table = CoefficientTable::default();
        table.industry.remove(&Industry::Finance);
        table.industry_fallback = dec!(1.2);
        assert_eq!(table.resolve_industry(Industry::Finance), dec!(1.2));
    }

    #[test]
    fn test_midpoint() {
        let range = PriceRange::new(dec!(200000), dec!(400000));
        assert_eq!(range.midpoint(), dec!(300000));
        let odd = PriceRange::new(dec!(1), dec!(2));
        assert_eq!(odd.midpoint(), dec!(1.5));
    }

    #[test]
    fn test_inverted_price_range_is_configuration_error() {
        let mut catalog = ServiceCatalog::default();
        catalog.items[0].price_range = PriceRange::new(dec!(500), dec!(100));
        let err = PricingTables::new(CoefficientTable::default(), catalog).unwrap_err();
        match err {
            EngineError::Configuration { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("greater than max"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_collects_all_problems() {
        let mut coefficients = CoefficientTable::default();
        coefficients.scale_fallback = dec!(0);
        coefficients.industry.insert(Industry::It, dec!(-1));
        let mut catalog = ServiceCatalog::default();
        catalog.items.retain(|item| item.id != ServiceId::Support);
        catalog.bundle_discount = dec!(1);

        let err = PricingTables::new(coefficients, catalog).unwrap_err();
        match err {
            EngineError::Configuration { errors, .. } => assert_eq!(errors.len(), 4),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_catalog_item_lookup_fails() {
        let mut catalog = ServiceCatalog::default();
        catalog.items.retain(|item| item.id != ServiceId::Design);
        assert!(catalog.item(ServiceId::Design).is_err());
        assert!(catalog.item(ServiceId::Audit).is_ok());
    }

    #[test]
    fn test_from_json_roundtrip() {
        let json = serde_json::to_string(&PricingTables::default()).unwrap();
        let tables = PricingTables::from_json(&json).unwrap();
        assert_eq!(tables, PricingTables::default());
    }

    #[test]
    fn test_from_json_rejects_malformed_document() {
        let err = PricingTables::from_json("{\"coefficients\": 3}").unwrap_err();
        assert_eq!(err.error_type(), "malformed_json");
    }
}

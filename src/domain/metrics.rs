//! Derived advertisement metrics.
//!
//! The aggregate inputs (lead count, converted customer count, attributable
//! contract income) come from the repository layer; the arithmetic lives here
//! so the edge cases stay testable without a database.

use serde::{Deserialize, Serialize};

/// Aggregate inputs for one advertisement, as counted by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdAggregates {
    /// Leads referencing the advertisement.
    pub leads: u64,
    /// Leads that converted into customers.
    pub customers: u64,
    /// Sum of contract costs across the converted customers.
    pub income: f64,
}

/// Derived metrics for one advertisement. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdMetrics {
    pub leads_count: u64,
    pub customers_count: u64,
    pub conversion_rate: f64,
    /// Return on investment; absent when the campaign cost is zero or no
    /// income has been generated yet ("no ROI available", not an error).
    pub profit: Option<f64>,
}

impl AdMetrics {
    pub fn from_aggregates(aggregates: AdAggregates, ad_cost: f64) -> Self {
        Self {
            leads_count: aggregates.leads,
            customers_count: aggregates.customers,
            conversion_rate: conversion_rate(aggregates.leads, aggregates.customers),
            profit: profit(aggregates.income, ad_cost),
        }
    }
}

/// Share of leads that converted; exactly `0.0` when there are no leads.
pub fn conversion_rate(leads: u64, customers: u64) -> f64 {
    if leads == 0 {
        return 0.0;
    }
    customers as f64 / leads as f64
}

/// Income divided by campaign cost. `None` when the cost is zero or the
/// income sum is zero — both mean "no ROI available" rather than 0.0.
pub fn profit(income: f64, ad_cost: f64) -> Option<f64> {
    if ad_cost == 0.0 || income == 0.0 {
        return None;
    }
    Some(income / ad_cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_rate_is_zero_without_leads() {
        assert_eq!(conversion_rate(0, 0), 0.0);
    }

    #[test]
    fn conversion_rate_is_zero_without_customers() {
        assert_eq!(conversion_rate(3, 0), 0.0);
    }

    #[test]
    fn conversion_rate_ratio() {
        assert_eq!(conversion_rate(4, 2), 0.5);
    }

    #[test]
    fn profit_absent_for_zero_cost() {
        assert_eq!(profit(3000.0, 0.0), None);
    }

    #[test]
    fn profit_absent_without_income() {
        assert_eq!(profit(0.0, 1000.0), None);
    }

    #[test]
    fn profit_ratio() {
        assert_eq!(profit(3000.0, 1000.0), Some(3.0));
    }

    #[test]
    fn campaign_scenario() {
        // cost=1000, four leads, two converted via contracts of 1000 and 2000
        let metrics = AdMetrics::from_aggregates(
            AdAggregates {
                leads: 4,
                customers: 2,
                income: 3000.0,
            },
            1000.0,
        );
        assert_eq!(metrics.leads_count, 4);
        assert_eq!(metrics.customers_count, 2);
        assert_eq!(metrics.conversion_rate, 0.5);
        assert_eq!(metrics.profit, Some(3.0));
    }

    #[test]
    fn fresh_campaign_has_no_roi() {
        let metrics = AdMetrics::from_aggregates(AdAggregates::default(), 1000.0);
        assert_eq!(metrics.conversion_rate, 0.0);
        assert_eq!(metrics.profit, None);
    }
}

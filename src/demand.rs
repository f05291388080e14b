//! Demand translation.
//!
//! Turns periodic demand rows into the required units of one work week.
//!
//! # Algorithm
//!
//! Rows are validated first; any malformed row aborts the translation.
//! Quantities of the same (product, period) are summed and scaled by the
//! multiplier, then each period contributes to the target week:
//!
//! - ISO-week rows contribute `ceil(q)` when they name the target week.
//! - Month rows, [`BusinessDayShare`](DistributionPolicy::BusinessDayShare):
//!   `ceil(q · b_w / b_m)`, where `b_m` counts the month's Mon–Fri days and
//!   `b_w` those inside the target week. A week spanning two months
//!   receives a share of each.
//! - Month rows, [`EvenIsoWeeks`](DistributionPolicy::EvenIsoWeeks):
//!   `ceil(q / w)` over the `w` ISO weeks the month's business days touch.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{DemandPolicy, DistributionPolicy};
use crate::error::{DataIntegrityError, InvalidDemandError, PlanError};
use crate::models::{
    business_days_in_month, iso_weeks_in_month, week_monday, DemandPeriod, DemandRow, Product,
    WeeklyDemand, WorkDay,
};

/// One line of a monthly demand report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBreakdownRow {
    pub product_id: String,
    pub iso_year: i32,
    pub iso_week: u32,
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    /// Month total after the multiplier.
    pub monthly_quantity: f64,
    /// Units this week receives from the month.
    pub weekly_units: u32,
}

/// Converts periodic demand into weekly demand under a [`DemandPolicy`].
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_roster::demand::DemandTranslator;
/// use u_roster::models::{DemandRow, Product};
///
/// let products = vec![Product::new("P1")];
/// // March 2025 has 21 business days; the week of the 10th holds 5.
/// let rows = vec![DemandRow::monthly("P1", 2025, 3, 42.0)];
/// let week = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
///
/// let demand = DemandTranslator::default().translate(&rows, &products, week).unwrap();
/// assert_eq!(demand.units("P1"), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DemandTranslator {
    policy: DemandPolicy,
}

impl DemandTranslator {
    pub fn new(policy: DemandPolicy) -> Self {
        Self { policy }
    }

    /// Weekly demand of the week containing `target`.
    ///
    /// Only products with a row touching the week appear in the result.
    ///
    /// # Errors
    /// - [`PlanError::DataIntegrity`] when a row names an unknown product.
    /// - [`PlanError::InvalidDemand`] for non-numeric or negative
    ///   quantities, invalid periods, or an invalid multiplier.
    #[instrument(skip_all, fields(week = %week_monday(target), rows = rows.len()))]
    pub fn translate(
        &self,
        rows: &[DemandRow],
        products: &[Product],
        target: NaiveDate,
    ) -> Result<WeeklyDemand, PlanError> {
        let totals = self.aggregate(rows, products)?;
        let monday = week_monday(target);
        let target_week = (monday.iso_week().year(), monday.iso_week().week());

        let mut weekly = WeeklyDemand::new();
        for ((product_id, period), quantity) in &totals {
            let units = match *period {
                DemandPeriod::IsoWeek { year, week } => {
                    if (year, week) != target_week {
                        continue;
                    }
                    ceil_units(*quantity)
                }
                DemandPeriod::Month { year, month } => {
                    match self.month_share(*quantity, year, month, monday) {
                        Some(units) => units,
                        None => continue,
                    }
                }
            };
            debug!(product = %product_id, %period, quantity, units, "demand contribution");
            weekly.add(product_id.clone(), units);
        }
        Ok(weekly)
    }

    /// Per product and ISO week of a month: the month total and the units
    /// each week receives from it.
    ///
    /// Rows of other periods are validated but otherwise ignored.
    pub fn monthly_breakdown(
        &self,
        rows: &[DemandRow],
        products: &[Product],
        year: i32,
        month: u32,
    ) -> Result<Vec<MonthlyBreakdownRow>, PlanError> {
        let totals = self.aggregate(rows, products)?;
        let weeks = iso_weeks_in_month(year, month);

        let mut out = Vec::new();
        for ((product_id, period), quantity) in &totals {
            if *period != (DemandPeriod::Month { year, month }) {
                continue;
            }
            for &(iso_year, iso_week) in &weeks {
                let Some(week_start) = NaiveDate::from_isoywd_opt(iso_year, iso_week, Weekday::Mon)
                else {
                    continue;
                };
                out.push(MonthlyBreakdownRow {
                    product_id: product_id.clone(),
                    iso_year,
                    iso_week,
                    week_start,
                    monthly_quantity: *quantity,
                    weekly_units: self
                        .month_share(*quantity, year, month, week_start)
                        .unwrap_or(0),
                });
            }
        }
        Ok(out)
    }

    /// Validates rows and sums scaled quantities per (product, period).
    fn aggregate(
        &self,
        rows: &[DemandRow],
        products: &[Product],
    ) -> Result<BTreeMap<(String, DemandPeriod), f64>, PlanError> {
        let multiplier = self.policy.multiplier;
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(InvalidDemandError::InvalidMultiplier(multiplier).into());
        }

        let mut totals: BTreeMap<(String, DemandPeriod), f64> = BTreeMap::new();
        for row in rows {
            validate_row(row, products)?;
            *totals
                .entry((row.product_id.clone(), row.period))
                .or_insert(0.0) += row.quantity * multiplier;
        }
        Ok(totals)
    }

    /// Units the week starting `monday` receives from a month's quantity,
    /// or `None` when the week holds none of the month's business days.
    fn month_share(&self, quantity: f64, year: i32, month: u32, monday: NaiveDate) -> Option<u32> {
        let in_week = WorkDay::ALL
            .iter()
            .map(|d| d.date_in_week(monday))
            .filter(|d| d.year() == year && d.month() == month)
            .count();
        if in_week == 0 {
            return None;
        }

        match self.policy.distribution {
            DistributionPolicy::BusinessDayShare => {
                let in_month = business_days_in_month(year, month).len();
                Some(ceil_units(quantity * in_week as f64 / in_month as f64))
            }
            DistributionPolicy::EvenIsoWeeks => {
                let weeks = iso_weeks_in_month(year, month).len().max(1);
                Some(ceil_units(quantity / weeks as f64))
            }
        }
    }
}

fn validate_row(row: &DemandRow, products: &[Product]) -> Result<(), PlanError> {
    if !products.iter().any(|p| p.id == row.product_id) {
        return Err(DataIntegrityError::unknown("demand", "product_id", &row.product_id).into());
    }
    if !row.quantity.is_finite() {
        return Err(InvalidDemandError::NotNumeric {
            product: row.product_id.clone(),
        }
        .into());
    }
    if row.quantity < 0.0 {
        return Err(InvalidDemandError::Negative {
            product: row.product_id.clone(),
            quantity: row.quantity,
        }
        .into());
    }
    let valid_period = match row.period {
        DemandPeriod::Month { month, .. } => (1..=12).contains(&month),
        DemandPeriod::IsoWeek { year, week } => {
            NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).is_some()
        }
    };
    if !valid_period {
        return Err(InvalidDemandError::InvalidPeriod {
            product: row.product_id.clone(),
            period: row.period.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Rounds up to whole units, saturating at `u32::MAX`.
fn ceil_units(quantity: f64) -> u32 {
    quantity.ceil().max(0.0) as u32
}

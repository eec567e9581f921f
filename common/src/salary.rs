//! Intern salary computation from hourly and piecework rates.

use anyhow::{Context, Result, bail};
use std::collections::HashMap;

/// One itemized piecework task: how many pieces at what unit price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceItem {
    pub quantity: f64,
    pub price: f64,
}

impl PieceItem {
    pub fn subtotal(self) -> f64 {
        self.quantity * self.price
    }
}

/// Salary calculator with a per-level hourly rate card.
#[derive(Debug, Clone)]
pub struct SalaryCalculator {
    hourly_rates: HashMap<String, f64>,
}

impl SalaryCalculator {
    pub fn new(hourly_rates: HashMap<String, f64>) -> Self {
        Self { hourly_rates }
    }

    /// The stock rate card: A=20, B=25, C=30.
    pub fn with_default_rates() -> Self {
        let hourly_rates = [("A", 20.0), ("B", 25.0), ("C", 30.0)]
            .into_iter()
            .map(|(level, rate)| (level.to_string(), rate))
            .collect();
        Self { hourly_rates }
    }

    /// The hourly rate for a pay level.
    ///
    /// # Errors
    /// Returns an error for a level missing from the rate card.
    pub fn hourly_rate(&self, level: &str) -> Result<f64> {
        match self.hourly_rates.get(level) {
            Some(rate) => Ok(*rate),
            None => bail!("unknown pay level: {level}"),
        }
    }

    /// Wage for hours worked at the level's rate.
    ///
    /// # Errors
    /// Returns an error for negative hours or an unknown level.
    pub fn hourly_wage(&self, level: &str, hours: f64) -> Result<f64> {
        ensure_nonnegative(hours, "hours")?;
        Ok(self.hourly_rate(level)? * hours)
    }

    /// Sum of quantity times price over the itemized tasks.
    ///
    /// # Errors
    /// Returns an error for any negative quantity or price.
    pub fn piecework_wage(&self, items: &[PieceItem]) -> Result<f64> {
        let mut total = 0.0;
        for item in items {
            ensure_nonnegative(item.quantity, "piece quantity")?;
            ensure_nonnegative(item.price, "piece price")?;
            total += item.subtotal();
        }
        Ok(total)
    }

    /// Hourly wage plus piecework wage.
    ///
    /// # Errors
    /// Propagates the validation errors of both components.
    pub fn total_salary(&self, level: &str, hours: f64, items: &[PieceItem]) -> Result<f64> {
        Ok(self.hourly_wage(level, hours)? + self.piecework_wage(items)?)
    }
}

impl Default for SalaryCalculator {
    fn default() -> Self {
        Self::with_default_rates()
    }
}

fn ensure_nonnegative(value: f64, what: &str) -> Result<()> {
    if value < 0.0 {
        bail!("{what} cannot be negative: {value}");
    }
    Ok(())
}

/// Parse an itemized piece list in `quantity,price;quantity,price` form.
/// Empty input parses to no items.
///
/// # Errors
/// Returns an error for tasks that are not two comma-separated numbers.
pub fn parse_piece_items(input: &str) -> Result<Vec<PieceItem>> {
    let mut items = Vec::new();
    for task in input.split(';').filter(|task| !task.is_empty()) {
        let Some((quantity, price)) = task.split_once(',') else {
            bail!("piece task must be `quantity,price`: {task}");
        };
        items.push(PieceItem {
            quantity: quantity
                .trim()
                .parse()
                .with_context(|| format!("bad piece quantity: {quantity}"))?,
            price: price
                .trim()
                .parse()
                .with_context(|| format!("bad piece price: {price}"))?,
        });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_hourly_wage_is_rate_times_hours() {
        let calc = SalaryCalculator::new(HashMap::from([("A".to_string(), 20.0)]));
        assert!((calc.hourly_wage("A", 10.0).unwrap() - 200.0).abs() < f64::EPSILON);
        let total = calc
            .total_salary("A", 10.0, &[PieceItem { quantity: 5.0, price: 10.0 }])
            .unwrap();
        assert!((total - 250.0).abs() < f64::EPSILON);
    }

    #[test_log::test]
    fn test_unknown_level_is_rejected() {
        let calc = SalaryCalculator::default();
        assert!(calc.hourly_rate("X").is_err());
        assert!(calc.hourly_wage("X", 10.0).is_err());
    }

    #[test_log::test]
    fn test_negative_inputs_are_rejected() {
        let calc = SalaryCalculator::default();
        assert!(calc.hourly_wage("A", -5.0).is_err());
        assert!(
            calc.piecework_wage(&[PieceItem { quantity: -1.0, price: 3.0 }])
                .is_err()
        );
        assert!(
            calc.piecework_wage(&[PieceItem { quantity: 1.0, price: -3.0 }])
                .is_err()
        );
    }

    #[test_log::test]
    fn test_piecework_wage_sums_subtotals() {
        let calc = SalaryCalculator::default();
        let wage = calc
            .piecework_wage(&[PieceItem { quantity: 10.0, price: 5.0 }])
            .unwrap();
        assert!((wage - 50.0).abs() < f64::EPSILON);

        let wage = calc
            .piecework_wage(&[
                PieceItem { quantity: 5.0, price: 10.0 },
                PieceItem { quantity: 3.0, price: 20.0 },
            ])
            .unwrap();
        assert!((wage - 110.0).abs() < f64::EPSILON);
    }

    #[test_log::test]
    fn test_default_rate_card_scenarios() {
        let calc = SalaryCalculator::default();
        // Level B, 40 hours.
        assert!((calc.total_salary("B", 40.0, &[]).unwrap() - 1000.0).abs() < f64::EPSILON);
        // Level A, 30 hours plus "50,3;30,5" piecework.
        let items = parse_piece_items("50,3;30,5").unwrap();
        assert!((calc.total_salary("A", 30.0, &items).unwrap() - 900.0).abs() < f64::EPSILON);
    }

    #[test_log::test]
    fn test_parse_piece_items() {
        let items = parse_piece_items("50,3;30,5").unwrap();
        assert_eq!(
            items,
            vec![
                PieceItem { quantity: 50.0, price: 3.0 },
                PieceItem { quantity: 30.0, price: 5.0 },
            ]
        );

        assert!(parse_piece_items("").unwrap().is_empty());
        // Trailing separators are tolerated.
        assert_eq!(parse_piece_items("1,2;").unwrap().len(), 1);

        assert!(parse_piece_items("50;3").is_err());
        assert!(parse_piece_items("a,b").is_err());
    }
}

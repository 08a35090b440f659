// Discount math shared by sorting, filtering and the result table.

/// A concrete price cut: absolute amount and whole-number percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discount {
    pub amount: f64,
    pub percent: i64,
}

impl Discount {
    /// Derives the discount for a (current, base) pair.
    ///
    /// `None` when `base <= 0` or `current >= base` — equal prices mean
    /// no discount. Amount is rounded to two decimals, the percentage to
    /// a whole number, both half-to-even.
    pub fn compute(current: f64, base: f64) -> Option<Discount> {
        if base <= 0.0 || current >= base {
            return None;
        }
        let amount = ((base - current) * 100.0).round_ties_even() / 100.0;
        let percent = (amount / base * 100.0).round_ties_even() as i64;
        Some(Discount { amount, percent })
    }
}

// Output formatting: terminal display and numeric presentation helpers.

pub mod terminal;

/// Round to two decimal places, the precision every reported metric uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Share quantity input.

/// Parses user input the way a numeric keypad field is read: leading
/// whitespace is skipped, an optional sign and the leading run of digits are
/// taken, and anything that does not start with a number is 0. Out-of-range
/// values saturate.
pub fn parse_quantity(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }
    if negative {
        -value
    } else {
        value
    }
}

/// A share count bounded to `[0, max]`.
///
/// Every mutation re-clamps, so no sequence of steps or inputs can leave the
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityStepper {
    value: i64,
    max: i64,
}

impl QuantityStepper {
    /// Starts at one share, or zero when nothing can be traded.
    pub fn new(max: i64) -> Self {
        let max = max.max(0);
        Self {
            value: 1.min(max),
            max,
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn increment(&mut self) -> i64 {
        self.set(self.value.saturating_add(1))
    }

    pub fn decrement(&mut self) -> i64 {
        self.set(self.value.saturating_sub(1))
    }

    /// Sets the value from free-form text input.
    pub fn set_from_input(&mut self, input: &str) -> i64 {
        self.set(parse_quantity(input))
    }

    pub fn set(&mut self, value: i64) -> i64 {
        self.value = value.clamp(0, self.max);
        self.value
    }

    /// Changes the upper bound, e.g. after fresh availability arrives.
    pub fn set_max(&mut self, max: i64) {
        self.max = max.max(0);
        self.value = self.value.clamp(0, self.max);
    }

    pub fn at_min(&self) -> bool {
        self.value == 0
    }

    pub fn at_max(&self) -> bool {
        self.value == self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("12"), 12);
        assert_eq!(parse_quantity("  7"), 7);
        assert_eq!(parse_quantity("12abc"), 12);
        assert_eq!(parse_quantity("abc"), 0);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("-5"), -5);
        assert_eq!(parse_quantity("+3"), 3);
        assert_eq!(parse_quantity("3.9"), 3);
        assert_eq!(parse_quantity("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_new_starts_at_one_or_zero() {
        assert_eq!(QuantityStepper::new(10).value(), 1);
        assert_eq!(QuantityStepper::new(0).value(), 0);
        assert_eq!(QuantityStepper::new(-4).max(), 0);
    }

    #[test]
    fn test_increment_clamps_at_max() {
        let mut stepper = QuantityStepper::new(3);
        for _ in 0..10 {
            stepper.increment();
        }
        assert_eq!(stepper.value(), 3);
        assert!(stepper.at_max());
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut stepper = QuantityStepper::new(3);
        stepper.decrement();
        stepper.decrement();
        stepper.decrement();
        assert_eq!(stepper.value(), 0);
        assert!(stepper.at_min());
    }

    #[test]
    fn test_input_is_parsed_then_clamped() {
        let mut stepper = QuantityStepper::new(10);
        assert_eq!(stepper.set_from_input("15"), 10);
        assert_eq!(stepper.set_from_input("-2"), 0);
        assert_eq!(stepper.set_from_input("four"), 0);
        assert_eq!(stepper.set_from_input("4"), 4);
    }

    #[test]
    fn test_shrinking_max_reclamps() {
        let mut stepper = QuantityStepper::new(10);
        stepper.set(8);
        stepper.set_max(5);
        assert_eq!(stepper.value(), 5);
    }
}

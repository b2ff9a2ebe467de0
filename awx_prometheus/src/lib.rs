pub mod debug;
pub mod error;
pub mod parser;
pub mod scrape;
pub mod statsd;

/// The value half of an exposition line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SampleValue<'a> {
    F64(f64),
    /// The raw token, when it isn't a number
    Invalid(&'a str),
}

impl<'a> SampleValue<'a> {
    pub fn parse(token: &'a str) -> Self {
        match token.parse() {
            Ok(value) => SampleValue::F64(value),
            Err(_) => SampleValue::Invalid(token),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, SampleValue::F64(_))
    }

    /// The value as emitted in a gauge line.
    ///
    /// The fractional part is dropped (no rounding). Invalid values and NaN are reported as `0`,
    /// infinities saturate at the bounds of `i64`.
    pub fn truncated(&self) -> i64 {
        match *self {
            SampleValue::F64(val) => val.trunc() as i64,
            SampleValue::Invalid(_) => 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::SampleValue;

    #[test]
    fn truncates_instead_of_rounding() {
        assert_eq!(SampleValue::F64(0.0).truncated(), 0);
        assert_eq!(SampleValue::F64(1.0).truncated(), 1);
        assert_eq!(SampleValue::F64(1.999).truncated(), 1);
        assert_eq!(SampleValue::F64(41.5).truncated(), 41);
        assert_eq!(SampleValue::F64(1.458255915e9).truncated(), 1458255915);
        for i in 0..1000 {
            let v = i as f64 * 0.37;
            assert_eq!(SampleValue::F64(v).truncated(), v.floor() as i64);
        }
    }

    #[test]
    fn invalid_values_are_zero() {
        let value = SampleValue::parse("not-a-number");
        assert!(!value.is_valid());
        assert_eq!(value, SampleValue::Invalid("not-a-number"));
        assert_eq!(value.truncated(), 0);
        assert_eq!(SampleValue::F64(f64::NAN).truncated(), 0);
    }

    #[test]
    fn parses_exposition_special_values() {
        assert_eq!(SampleValue::parse("+Inf").truncated(), i64::MAX);
        assert_eq!(SampleValue::parse("-Inf").truncated(), i64::MIN);
        assert!(SampleValue::parse("NaN").is_valid());
        assert_eq!(SampleValue::parse("1e3"), SampleValue::F64(1000.0));
    }
}

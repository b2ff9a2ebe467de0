use thiserror::Error;

use crate::SampleValue;

/// A single measurement read from one line of the exposition text
#[derive(Clone, Debug, PartialEq)]
pub struct Sample<'a> {
    pub name: &'a str,
    /// Label pairs, in the order they appear on the line
    pub dimensions: Vec<(&'a str, &'a str)>,
    pub value: SampleValue<'a>,
    /// Label entries which were dropped because they aren't `key=value`
    pub malformed: Vec<&'a str>,
}

impl<'a> Sample<'a> {
    /// Describes the problems found while parsing this sample, if any.
    ///
    /// The sample is still forwarded; an invalid value is sent as `0`.
    pub fn errors(&self) -> Vec<ParseError> {
        let mut errors = Vec::new();
        if let SampleValue::Invalid(token) = self.value {
            errors.push(ParseError::InvalidValue {
                name: self.name.to_string(),
                token: token.to_string(),
            });
        }
        for entry in &self.malformed {
            errors.push(ParseError::MalformedDimension {
                name: self.name.to_string(),
                entry: entry.to_string(),
            });
        }
        errors
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("no value in metric line: {0:?}")]
    MissingValue(String),
    #[error("couldn't convert value of {name} to a number: {token:?}")]
    InvalidValue { name: String, token: String },
    #[error("dropped malformed dimension of {name}: {entry:?}")]
    MalformedDimension { name: String, entry: String },
}

/// Parses every line of a Prometheus text exposition document.
///
/// Comments, blank lines and other skipped lines are not yielded.
pub fn parse(input: &str) -> impl Iterator<Item = Result<Sample<'_>, ParseError>> {
    input.split('\n').filter_map(parse_line)
}

/// Parses one line of Prometheus's text exposition format.
///
/// Returns `None` for lines that carry no sample: anything one character or shorter, and
/// `#` lines (comments, `HELP` and `TYPE`).
pub fn parse_line(line: &str) -> Option<Result<Sample<'_>, ParseError>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.len() <= 1 || line.starts_with('#') {
        return None;
    }

    // Split `metric_name{labels} value [timestamp]` on the first space
    let mut line_parts = line.splitn(2, ' ');
    let key_str = line_parts.next().unwrap_or("");
    // An empty token after the space is kept, and reported as an invalid value
    let value_str = match line_parts.next() {
        Some(rest) => rest.split_whitespace().next().unwrap_or(""),
        None => return Some(Err(ParseError::MissingValue(line.to_string()))),
    };

    // Split `metric_name{label1="value1",label2="value2"}` into parts
    let mut key_parts = key_str.splitn(2, '{');
    let name = key_parts.next().unwrap_or("");
    let mut dimensions = Vec::new();
    let mut malformed = Vec::new();
    if let Some(labels_str) = key_parts.next() {
        let labels_str = labels_str.strip_suffix('}').unwrap_or(labels_str);
        for entry in labels_str.split(',') {
            if entry.is_empty() {
                continue;
            }
            let mut parts = entry.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if !key.is_empty() => {
                    dimensions.push((key, value.trim_matches('"')));
                }
                _ => malformed.push(entry),
            }
        }
    }

    Some(Ok(Sample {
        name,
        dimensions,
        value: SampleValue::parse(value_str),
        malformed,
    }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::SampleValue;

    fn sample(line: &str) -> Sample<'_> {
        parse_line(line)
            .expect("line was skipped")
            .expect("line failed to parse")
    }

    #[test]
    fn parses_dimensions() {
        let s = sample(
            r#"awx_instance_consumed_capacity{hostname="localhost",instance_uuid="abc"} 0.0"#,
        );
        assert_eq!(s.name, "awx_instance_consumed_capacity");
        assert_eq!(
            s.dimensions,
            vec![("hostname", "localhost"), ("instance_uuid", "abc")]
        );
        assert_eq!(s.value, SampleValue::F64(0.0));
        assert!(s.malformed.is_empty());
        assert!(s.errors().is_empty());
    }

    #[test]
    fn parses_line_without_dimensions() {
        let s = sample("awx_status 1.0");
        assert_eq!(s.name, "awx_status");
        assert!(s.dimensions.is_empty());
        assert_eq!(s.value, SampleValue::F64(1.0));
    }

    #[test]
    fn skips_comments_and_short_lines() {
        assert!(parse_line("# HELP awx_status Status of the system").is_none());
        assert!(parse_line("# TYPE awx_status gauge").is_none());
        assert!(parse_line("#").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("x").is_none());
        assert!(parse_line("\r").is_none());
    }

    #[test]
    fn keeps_invalid_values() {
        let s = sample("awx_license_expiry soon");
        assert_eq!(s.value, SampleValue::Invalid("soon"));
        assert_eq!(
            s.errors(),
            vec![ParseError::InvalidValue {
                name: "awx_license_expiry".into(),
                token: "soon".into(),
            }]
        );
    }

    #[test]
    fn reports_missing_value() {
        assert!(matches!(
            parse_line("awx_status"),
            Some(Err(ParseError::MissingValue(_)))
        ));
    }

    #[test]
    fn keeps_empty_value_token() {
        let s = sample("awx_status ");
        assert_eq!(s.name, "awx_status");
        assert_eq!(s.value, SampleValue::Invalid(""));
        assert_eq!(s.errors().len(), 1);
        assert_eq!(
            crate::statsd::gauge_line(crate::statsd::DEFAULT_PREFIX, &s),
            "statsd.awx_status:0|g"
        );
    }

    #[test]
    fn ignores_timestamp() {
        let s = sample(r#"awx_pending_jobs_total{node="a"} 3 1395066363000"#);
        assert_eq!(s.value, SampleValue::F64(3.0));
        assert_eq!(s.dimensions, vec![("node", "a")]);
    }

    #[test]
    fn preserves_dimension_order() {
        for n in 0..12 {
            let labels = (0..n)
                .rev()
                .map(|i| format!("k{}=\"v{}\"", i, i))
                .collect::<Vec<_>>()
                .join(",");
            let line = if n == 0 {
                "m 1".to_string()
            } else {
                format!("m{{{}}} 1", labels)
            };
            let s = sample(&line);
            let keys = s.dimensions.iter().map(|(k, _)| k.to_string()).collect::<Vec<_>>();
            let expected = (0..n).rev().map(|i| format!("k{}", i)).collect::<Vec<_>>();
            assert_eq!(keys, expected);
        }
    }

    #[test]
    fn drops_malformed_dimensions() {
        let s = sample(r#"awx_instance_info{hostname="a",broken,="x",version="1.0} 1"#);
        assert_eq!(s.dimensions, vec![("hostname", "a"), ("version", "1.0")]);
        assert_eq!(s.malformed, vec!["broken", "=\"x\""]);
        assert_eq!(s.errors().len(), 2);
        assert_eq!(s.value, SampleValue::F64(1.0));
    }

    #[test]
    fn ignores_empty_dimension_entries() {
        let s = sample("awx_status{} 1");
        assert!(s.dimensions.is_empty());
        assert!(s.malformed.is_empty());

        let s = sample(r#"awx_status{a="b",} 1"#);
        assert_eq!(s.dimensions, vec![("a", "b")]);
        assert!(s.malformed.is_empty());
    }

    #[test]
    fn keeps_equal_signs_in_dimension_values() {
        let s = sample(r#"awx_system_info{content="text==true"} 1"#);
        assert_eq!(s.dimensions, vec![("content", "text==true")]);
    }

    #[test]
    fn parsing_is_idempotent() {
        let line = r#"awx_instance_capacity{hostname="awx-1",instance_uuid="f00"} 57.9"#;
        assert_eq!(parse_line(line), parse_line(line));
    }

    #[test]
    fn parses_document() {
        let input = "\
# HELP awx_system_info AWX System Information
# TYPE awx_system_info gauge
awx_system_info{tower_version=\"21.0.0\"} 1.0

# HELP awx_organizations_total Number of organizations
awx_organizations_total 3.0
awx_broken_total not-a-number
awx_missing_value
awx_users_total 12.0
";
        let results = parse(input).collect::<Vec<_>>();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].as_ref().unwrap().name, "awx_system_info");
        assert_eq!(results[1].as_ref().unwrap().value, SampleValue::F64(3.0));
        assert!(!results[2].as_ref().unwrap().value.is_valid());
        assert!(results[3].is_err());
        assert_eq!(results[4].as_ref().unwrap().name, "awx_users_total");
    }
}

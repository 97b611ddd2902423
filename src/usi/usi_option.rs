//! Engine-side USI options.
//!
//! Each option is a tagged variant carrying its current value, default and,
//! for numeric kinds, inclusive bounds checked on assignment. `UsiOptions` is
//! the ordered collection an engine declares in reply to `usi`.

use crate::arena_errors::OptionError;

#[derive(Debug, Clone, PartialEq)]
pub enum UsiOptionValue {
    Spin {
        value: i64,
        default: i64,
        min: i64,
        max: i64,
    },
    Float {
        value: f64,
        default: f64,
        min: f64,
        max: f64,
    },
    Check {
        value: bool,
        default: bool,
    },
    String {
        value: String,
        default: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsiOption {
    name: String,
    value: UsiOptionValue,
}

impl UsiOption {
    pub fn spin(name: &str, default: i64, min: i64, max: i64) -> Self {
        Self {
            name: name.to_owned(),
            value: UsiOptionValue::Spin {
                value: default,
                default,
                min,
                max,
            },
        }
    }

    pub fn float(name: &str, default: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.to_owned(),
            value: UsiOptionValue::Float {
                value: default,
                default,
                min,
                max,
            },
        }
    }

    pub fn check(name: &str, default: bool) -> Self {
        Self {
            name: name.to_owned(),
            value: UsiOptionValue::Check {
                value: default,
                default,
            },
        }
    }

    pub fn string(name: &str, default: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: UsiOptionValue::String {
                value: default.to_owned(),
                default: default.to_owned(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &UsiOptionValue {
        &self.value
    }

    /// Parse `raw` for this option's kind and store it if in range.
    pub fn set(&mut self, raw: &str) -> Result<(), OptionError> {
        let raw = raw.trim();
        let name = &self.name;
        match &mut self.value {
            UsiOptionValue::Spin { value, min, max, .. } => {
                let parsed = raw.parse::<i64>().map_err(|_| OptionError::TypeMismatch {
                    name: name.clone(),
                    value: raw.to_owned(),
                    expected: "integer",
                })?;
                if parsed < *min || parsed > *max {
                    return Err(OptionError::OutOfRange {
                        name: name.clone(),
                        value: raw.to_owned(),
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                }
                *value = parsed;
            }
            UsiOptionValue::Float { value, min, max, .. } => {
                let parsed = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| OptionError::TypeMismatch {
                        name: name.clone(),
                        value: raw.to_owned(),
                        expected: "float",
                    })?;
                if parsed < *min || parsed > *max {
                    return Err(OptionError::OutOfRange {
                        name: name.clone(),
                        value: raw.to_owned(),
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                }
                *value = parsed;
            }
            UsiOptionValue::Check { value, .. } => {
                *value = match raw.to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(OptionError::TypeMismatch {
                            name: name.clone(),
                            value: raw.to_owned(),
                            expected: "true or false",
                        })
                    }
                };
            }
            UsiOptionValue::String { value, .. } => {
                *value = raw.to_owned();
            }
        }
        Ok(())
    }

    /// `option name ... type ...` line sent in reply to `usi`.
    pub fn declaration(&self) -> String {
        match &self.value {
            UsiOptionValue::Spin { default, min, max, .. } => format!(
                "option name {} type spin default {} min {} max {}",
                self.name, default, min, max
            ),
            UsiOptionValue::Float { default, min, max, .. } => format!(
                "option name {} type float default {} min {} max {}",
                self.name, default, min, max
            ),
            UsiOptionValue::Check { default, .. } => {
                format!("option name {} type check default {}", self.name, default)
            }
            UsiOptionValue::String { default, .. } => {
                let shown = if default.is_empty() { "<empty>" } else { default };
                format!("option name {} type string default {}", self.name, shown)
            }
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            UsiOptionValue::Spin { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            UsiOptionValue::Float { value, .. } => Some(value),
            UsiOptionValue::Spin { value, .. } => Some(value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            UsiOptionValue::Check { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            UsiOptionValue::String { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Ordered option collection with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsiOptions {
    options: Vec<UsiOption>,
}

impl UsiOptions {
    pub fn new(options: Vec<UsiOption>) -> Self {
        Self { options }
    }

    pub fn get(&self, name: &str) -> Option<&UsiOption> {
        self.options
            .iter()
            .find(|opt| opt.name.eq_ignore_ascii_case(name))
    }

    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), OptionError> {
        self.options
            .iter_mut()
            .find(|opt| opt.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| OptionError::UnknownOption(name.to_owned()))?
            .set(raw)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UsiOption> {
        self.options.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{UsiOption, UsiOptions};
    use crate::arena_errors::OptionError;

    #[test]
    fn spin_rejects_out_of_range_and_bad_text() {
        let mut opt = UsiOption::spin("rand_seed", 1024, 0, 1_000_000);
        opt.set("77").expect("in range");
        assert_eq!(opt.as_i64(), Some(77));

        assert!(matches!(opt.set("-1"), Err(OptionError::OutOfRange { .. })));
        assert!(matches!(opt.set("seven"), Err(OptionError::TypeMismatch { .. })));
        assert_eq!(opt.as_i64(), Some(77));
    }

    #[test]
    fn float_and_check_parse() {
        let mut f = UsiOption::float("temperature", 0.5, 0.0, 1.0);
        f.set("0.25").expect("in range");
        assert_eq!(f.as_f64(), Some(0.25));
        assert!(f.set("1.5").is_err());
        assert!(f.set("NaN").is_err());

        let mut c = UsiOption::check("simulate_thinking", true);
        c.set("FALSE").expect("case-insensitive");
        assert_eq!(c.as_bool(), Some(false));
        assert!(c.set("maybe").is_err());
    }

    #[test]
    fn declarations_follow_usi_layout() {
        let options = UsiOptions::new(vec![
            UsiOption::spin("rand_seed", 1024, 0, 65535),
            UsiOption::check("simulate_thinking", true),
            UsiOption::string("eval_file", ""),
        ]);
        let lines: Vec<String> = options.iter().map(UsiOption::declaration).collect();
        assert_eq!(
            lines,
            vec![
                "option name rand_seed type spin default 1024 min 0 max 65535",
                "option name simulate_thinking type check default true",
                "option name eval_file type string default <empty>",
            ]
        );
    }

    #[test]
    fn store_lookup_is_case_insensitive() {
        let mut options = UsiOptions::new(vec![UsiOption::string("EvalFile", "a.bin")]);
        options.set("evalfile", "b.bin").expect("known option");
        assert_eq!(options.get("EVALFILE").and_then(UsiOption::as_str), Some("b.bin"));
        assert!(matches!(
            options.set("hash", "16"),
            Err(OptionError::UnknownOption(_))
        ));
    }
}

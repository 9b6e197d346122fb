use std::collections::BTreeMap;

/// Field name to the messages explaining why its value was refused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub(crate) enum Submitted {
    Blank,
    Invalid,
    Number(f64),
}

impl Submitted {
    pub(crate) fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Blank;
        }
        match raw.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Invalid,
        }
    }
}

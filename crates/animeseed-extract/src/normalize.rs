//! Field normalization shared by every collector.

use chrono::NaiveDate;

const DATE_FORMATS: [&str; 4] = ["%b %d, %Y", "%B %d, %Y", "%b %d,%Y", "%B %d,%Y"];

const COUNTRY_ALIASES: [(&str, &str); 2] = [("USA", "United States"), ("UK", "United Kingdom")];

/// Trimmed text, `None` when empty.
pub fn text(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Integer with thousands separators and float-like input (`"12.0"`) tolerated.
/// Fractions are truncated toward zero.
pub fn parse_int(raw: &str) -> Option<i64> {
    let cleaned = strip_separators(raw)?;
    if let Ok(value) = cleaned.parse::<i64>() {
        return Some(value);
    }
    let value = cleaned.parse::<f64>().ok()?;
    if !value.is_finite() || value.trunc() < i64::MIN as f64 || value.trunc() > i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}

pub fn parse_float(raw: &str) -> Option<f64> {
    let cleaned = strip_separators(raw)?;
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Dates in ISO form (first ten characters, so timestamps qualify) or
/// `Apr 3, 1998` / `April 3, 1998`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let iso_candidate = value.get(..10).unwrap_or(value);
    if let Ok(date) = NaiveDate::parse_from_str(iso_candidate, "%Y-%m-%d") {
        return Some(date);
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Country name with the known short aliases expanded.
pub fn country_name(raw: &str) -> Option<String> {
    let value = text(raw)?;
    let expanded = COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == value)
        .map(|(_, name)| name.to_string());
    Some(expanded.unwrap_or(value))
}

/// Split `"City, Region, Country"` on the last comma into city and country.
///
/// A location without a comma is returned as both city and country.
pub fn split_location(raw: &str) -> (Option<String>, Option<String>) {
    let Some(location) = text(raw) else {
        return (None, None);
    };

    match location.rsplit_once(',') {
        Some((city, country)) => (text(city), country_name(country)),
        None => (Some(location.clone()), country_name(&location)),
    }
}

/// Parse a list cell: `["Action", "Drama"]`, `['Action', 'Drama']` or `[Action, Drama]`.
///
/// Anything that is not a single flat bracketed list yields an empty list.
pub fn parse_list(raw: &str) -> Vec<String> {
    let value = raw.trim();
    let Some(inner) = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return Vec::new();
    };

    ListScanner::new(inner).scan().unwrap_or_default()
}

fn strip_separators(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && *ch != '_')
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

struct ListScanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> ListScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn scan(mut self) -> Option<Vec<String>> {
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            let token = match self.chars.peek().copied() {
                None => break,
                Some(quote @ ('\'' | '"')) => {
                    self.chars.next();
                    let token = self.quoted(quote)?;
                    self.skip_whitespace();
                    match self.chars.peek() {
                        None | Some(',') => token,
                        Some(_) => return None,
                    }
                }
                Some(_) => self.bare()?,
            };

            let token = token.trim();
            if !token.is_empty() {
                items.push(token.to_string());
            }

            match self.chars.next() {
                None => break,
                Some(',') => continue,
                Some(_) => return None,
            }
        }

        Some(items)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|ch| ch.is_whitespace()).is_some() {}
    }

    fn quoted(&mut self, quote: char) -> Option<String> {
        let mut token = String::new();
        loop {
            match self.chars.next()? {
                ch if ch == quote => return Some(token),
                '\\' => token.push(self.escape()?),
                ch => token.push(ch),
            }
        }
    }

    fn escape(&mut self) -> Option<char> {
        let escaped = match self.chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'u' => {
                let hex: String = (0..4).filter_map(|_| self.chars.next()).collect();
                if hex.len() != 4 {
                    return None;
                }
                char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?
            }
            other => other,
        };
        Some(escaped)
    }

    fn bare(&mut self) -> Option<String> {
        let mut token = String::new();
        while let Some(ch) = self.chars.next_if(|ch| *ch != ',') {
            if matches!(ch, '[' | ']' | '\'' | '"') {
                return None;
            }
            token.push(ch);
        }
        Some(token)
    }
}

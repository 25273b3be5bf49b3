use thiserror::Error;

/// Money is held as integer cents so sums over line items stay exact.
/// €12.50 is stored as 1250.
pub type Cents = i64;

/// Render cents with two decimals.
/// Example: 1250 -> "12.50", -5 -> "-0.05"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal amount into cents.
/// Example: "12.50" -> 1250, "12.5" -> 1250, "12" -> 1200
///
/// More than two decimal places is refused rather than rounded.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, fraction_str) = match digits.split_once('.') {
        Some((units, fraction)) => (units, fraction),
        None => (digits, ""),
    };

    if units_str.is_empty() && fraction_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !fraction_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }
    if fraction_str.len() > 2 {
        return Err(ParseCentsError::TooManyDecimals);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?
    };
    let fraction: i64 = match fraction_str.len() {
        0 => 0,
        // "12.5" means fifty cents
        1 => fraction_str.parse::<i64>().map_err(|_| ParseCentsError::InvalidFormat)? * 10,
        _ => fraction_str
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or(ParseCentsError::InvalidFormat)?;
    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("empty money amount")]
    Empty,

    #[error("invalid money format")]
    InvalidFormat,

    #[error("money amounts have at most two decimal places")]
    TooManyDecimals,
}

/// Serde adapter that writes cents as a decimal string ("12.50") and reads
/// a decimal amount given either as a string or as a JSON number, so
/// `"25"`, `25` and `25.00` all mean 2500 cents.
pub mod decimal {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{Cents, format_cents, parse_cents};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_cents(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Whole(i64),
            Fraction(f64),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Whole(units) => units.to_string(),
            // Display prints the shortest form that round-trips, never an exponent
            Raw::Fraction(amount) if amount.is_finite() => amount.to_string(),
            Raw::Fraction(amount) => {
                return Err(de::Error::custom(format!("invalid money amount {}", amount)));
            }
        };
        parse_cents(&text).map_err(de::Error::custom)
    }
}

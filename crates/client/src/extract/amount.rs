//! Numeric cell parsing for the source tables.
//!
//! Amounts use `.` as the thousands separator (`1.234.567`) and `-` for zero.

/// Error for a cell that is not a whole amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not an amount: {0:?}")]
pub struct AmountError(pub String);

/// Parse a table cell into a whole amount.
pub fn parse_amount(cell: &str) -> Result<i64, AmountError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(0);
    }

    let mut digits = String::with_capacity(trimmed.len());
    for group in trimmed.split('.') {
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError(cell.to_string()));
        }
        digits.push_str(group);
    }

    digits.parse().map_err(|_| AmountError(cell.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_grouped() {
        assert_eq!(parse_amount("42"), Ok(42));
        assert_eq!(parse_amount("1.234"), Ok(1_234));
        assert_eq!(parse_amount(" 12.345.678 "), Ok(12_345_678));
    }

    #[test]
    fn test_dash_and_blank_are_zero() {
        assert_eq!(parse_amount("-"), Ok(0));
        assert_eq!(parse_amount(" - "), Ok(0));
        assert_eq!(parse_amount(""), Ok(0));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_amount("1,5").is_err());
        assert!(parse_amount("1..000").is_err());
        assert!(parse_amount(".100").is_err());
        assert!(parse_amount("-12").is_err());
        assert!(parse_amount("n/d").is_err());
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(parse_amount("99.999.999.999.999.999.999").is_err());
    }
}

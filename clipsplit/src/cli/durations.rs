use std::fmt;

/// Parse a comma-separated list of segment durations into whole seconds.
///
/// # Grammar
///
/// ```text
/// list      = item , { "," item } ;
/// item      = digits | component , { component } ;
/// component = digits unit ;
/// unit      = "s" | "m" | "h" ;
/// ```
///
/// A bare number is read as seconds, so `"10,5,2,1"` and `"10s,5s,2s,1s"`
/// are equivalent. Components may be chained (`"1m30s"`). Sub-second units
/// are rejected because ffmpeg is driven with whole seconds.
pub fn parse_durations(value: &str) -> Result<Vec<u32>, DurationParseError> {
    let input = value.trim();
    if input.is_empty() {
        return Err(DurationParseError::Empty);
    }

    input
        .split(',')
        .map(|item| parse_seconds(item.trim()))
        .collect()
}

/// Parse a single duration item into whole seconds.
pub fn parse_seconds(item: &str) -> Result<u32, DurationParseError> {
    if item.is_empty() {
        return Err(DurationParseError::EmptyItem);
    }

    let too_large = || DurationParseError::TooLarge {
        item: item.to_owned(),
    };

    if item.bytes().all(|b| b.is_ascii_digit()) {
        let seconds = item.parse::<u64>().map_err(|_| too_large())?;
        return finish(item, seconds);
    }

    let bytes = item.as_bytes();
    let len = bytes.len();
    let mut index = 0;
    let mut total: u64 = 0;

    while index < len {
        let start = index;
        while index < len && bytes[index].is_ascii_digit() {
            index += 1;
        }

        if start == index {
            return Err(DurationParseError::ExpectedNumber {
                item: item.to_owned(),
                found: item[index..].chars().next().unwrap_or_default(),
            });
        }

        let number = item[start..index]
            .parse::<u64>()
            .map_err(|_| too_large())?;

        if index >= len {
            return Err(DurationParseError::ExpectedUnit {
                item: item.to_owned(),
            });
        }

        let remainder = &item[index..];
        if remainder.starts_with("ms") {
            return Err(DurationParseError::SubSecond {
                item: item.to_owned(),
            });
        }

        let factor = match bytes[index] {
            b's' => 1,
            b'm' => 60,
            b'h' => 3_600,
            _ => {
                return Err(DurationParseError::UnknownUnit {
                    item: item.to_owned(),
                    found: remainder.chars().next().unwrap_or_default(),
                })
            }
        };
        index += 1;

        total = number
            .checked_mul(factor)
            .and_then(|component| total.checked_add(component))
            .ok_or_else(too_large)?;
    }

    finish(item, total)
}

fn finish(item: &str, seconds: u64) -> Result<u32, DurationParseError> {
    if seconds == 0 {
        return Err(DurationParseError::Zero {
            item: item.to_owned(),
        });
    }

    u32::try_from(seconds).map_err(|_| DurationParseError::TooLarge {
        item: item.to_owned(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    Empty,
    EmptyItem,
    ExpectedNumber { item: String, found: char },
    ExpectedUnit { item: String },
    UnknownUnit { item: String, found: char },
    SubSecond { item: String },
    Zero { item: String },
    TooLarge { item: String },
}

impl std::error::Error for DurationParseError {}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationParseError::Empty => write!(f, "duration list cannot be empty"),
            DurationParseError::EmptyItem => {
                write!(f, "duration list contains an empty entry")
            }
            DurationParseError::ExpectedNumber { item, found } => {
                write!(f, "expected a number in '{item}' but found '{found}'")
            }
            DurationParseError::ExpectedUnit { item } => {
                write!(f, "expected a unit (s, m or h) at the end of '{item}'")
            }
            DurationParseError::UnknownUnit { item, found } => {
                write!(f, "unknown unit '{found}' in '{item}'")
            }
            DurationParseError::SubSecond { item } => {
                write!(f, "'{item}' uses milliseconds; durations are whole seconds")
            }
            DurationParseError::Zero { item } => {
                write!(f, "duration '{item}' must be greater than zero")
            }
            DurationParseError::TooLarge { item } => {
                write!(f, "duration '{item}' exceeds {} seconds", u32::MAX)
            }
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Date strings — `D:YYYYMMDDHHmmSS+HH'mm'` encoding and decoding
// (ISO 32000-1 §7.9.4).

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use nachtrag_core::error::{NachtragError, Result};

/// Encode a timestamp in canonical form, always with an explicit offset.
///
/// A zero offset is written as `Z`. Sub-second precision and sub-minute
/// offset components are not representable and are dropped.
pub fn encode_date(timestamp: &DateTime<FixedOffset>) -> String {
    let mut out = timestamp.format("D:%Y%m%d%H%M%S").to_string();
    let offset = timestamp.offset().local_minus_utc();
    if offset == 0 {
        out.push('Z');
    } else {
        let sign = if offset < 0 { '-' } else { '+' };
        let abs = offset.abs();
        out.push_str(&format!("{sign}{:02}'{:02}'", abs / 3600, (abs % 3600) / 60));
    }
    out
}

/// Decode a date string.
///
/// Accepts the canonical form produced by [`encode_date`] as well as the
/// truncated forms the grammar allows (`D:YYYY`, `D:YYYYMMDD`, a missing
/// zone meaning UTC, a missing trailing apostrophe). Anything else is a
/// [`NachtragError::DateParse`].
pub fn decode_date(input: &str) -> Result<DateTime<FixedOffset>> {
    let mut cursor = Cursor::new(input);
    cursor.eat(b'D');
    if cursor.consumed() == 1 && !cursor.eat(b':') {
        return Err(cursor.error("expected 'D:' prefix"));
    }

    let year = cursor
        .field(4)?
        .ok_or_else(|| cursor.error("missing year"))?;
    // Each component is only present when all the ones before it are.
    let month = cursor.field(2)?;
    let day = if month.is_some() { cursor.field(2)? } else { None };
    let hour = if day.is_some() { cursor.field(2)? } else { None };
    let minute = if hour.is_some() { cursor.field(2)? } else { None };
    let second = if minute.is_some() { cursor.field(2)? } else { None };

    let offset_seconds = cursor.zone()?;
    if !cursor.at_end() {
        return Err(cursor.error("unexpected trailing characters"));
    }

    let date = NaiveDate::from_ymd_opt(year as i32, month.unwrap_or(1), day.unwrap_or(1))
        .ok_or_else(|| cursor.error("calendar date out of range"))?;
    let naive = date
        .and_hms_opt(hour.unwrap_or(0), minute.unwrap_or(0), second.unwrap_or(0))
        .ok_or_else(|| cursor.error("time of day out of range"))?;
    let offset =
        FixedOffset::east_opt(offset_seconds).ok_or_else(|| cursor.error("offset out of range"))?;

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| cursor.error("ambiguous local time"))
}

struct Cursor<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, reason: &str) -> NachtragError {
        NachtragError::DateParse(format!("{reason} in {:?} at byte {}", self.source, self.pos))
    }

    fn consumed(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// A fixed-width numeric field. Absent (`None`) when the next byte is not
    /// a digit; an error when it starts but is shorter than `width`.
    fn field(&mut self, width: usize) -> Result<Option<u32>> {
        match self.peek() {
            Some(b) if b.is_ascii_digit() => {}
            _ => return Ok(None),
        }
        let end = self.pos + width;
        let digits = self
            .bytes
            .get(self.pos..end)
            .filter(|chunk| chunk.iter().all(u8::is_ascii_digit))
            .ok_or_else(|| self.error("truncated numeric field"))?;
        let value = digits
            .iter()
            .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'));
        self.pos = end;
        Ok(Some(value))
    }

    /// Zone designator, as seconds east of UTC. Missing means UTC.
    fn zone(&mut self) -> Result<i32> {
        let sign = match self.peek() {
            None => return Ok(0),
            Some(b'Z') => 0,
            Some(b'+') => 1,
            Some(b'-') => -1,
            Some(_) => return Err(self.error("invalid zone designator")),
        };
        self.pos += 1;

        let hours = self.field(2)?;
        if sign != 0 && hours.is_none() {
            return Err(self.error("missing offset hours"));
        }
        self.eat(b'\'');
        let minutes = self.field(2)?;
        self.eat(b'\'');

        let hours = hours.unwrap_or(0);
        let minutes = minutes.unwrap_or(0);
        if hours > 23 || minutes > 59 {
            return Err(self.error("offset out of range"));
        }
        if sign == 0 && (hours, minutes) != (0, 0) {
            return Err(self.error("non-zero offset after 'Z'"));
        }
        Ok(sign * (hours as i32 * 3600 + minutes as i32 * 60))
    }
}

//! Calculator options as passed from JavaScript (or a JSON file in the CLI).

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Row delimiter used when splitting the CSV text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `'\n'`. CR+LF files are accepted; their `'\r'` stays on the last field.
    #[default]
    Lf,
    /// `'\r'` (classic Mac line endings).
    Cr,
}

impl LineEnding {
    /// The delimiter character.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            LineEnding::Lf => '\n',
            LineEnding::Cr => '\r',
        }
    }
}

impl From<&str> for LineEnding {
    /// Anything other than a lone `"\r"` is treated as `'\n'`.
    fn from(s: &str) -> Self {
        if s == "\r" {
            LineEnding::Cr
        } else {
            LineEnding::Lf
        }
    }
}

impl Serialize for LineEnding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut buf = [0u8; 4];
        serializer.serialize_str(self.as_char().encode_utf8(&mut buf))
    }
}

struct LineEndingVisitor;

impl<'de> Visitor<'de> for LineEndingVisitor {
    type Value = LineEnding;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a line ending string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<LineEnding, E> {
        Ok(LineEnding::from(v))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<LineEnding, E> {
        Ok(LineEnding::Lf)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> std::result::Result<LineEnding, E> {
        Ok(LineEnding::Lf)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> std::result::Result<LineEnding, E> {
        Ok(LineEnding::Lf)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> std::result::Result<LineEnding, E> {
        Ok(LineEnding::Lf)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<LineEnding, E> {
        Ok(LineEnding::Lf)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<LineEnding, E> {
        Ok(LineEnding::Lf)
    }

    fn visit_seq<A: SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> std::result::Result<LineEnding, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(LineEnding::Lf)
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<LineEnding, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(LineEnding::Lf)
    }
}

impl<'de> Deserialize<'de> for LineEnding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(LineEndingVisitor)
    }
}

/// Options recognized by the calculator. Missing keys take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcOptions {
    /// Row delimiter.
    pub line_endings: LineEnding,
    /// Drop the first line (header).
    pub ignore_first_line: bool,
    /// Drop the last line (usually the empty line after the final newline).
    pub ignore_last_line: bool,
    /// Parse quantities with `parseInt` semantics instead of `Number`.
    pub only_integer: bool,
}

impl Default for CalcOptions {
    fn default() -> Self {
        Self {
            line_endings: LineEnding::Lf,
            ignore_first_line: true,
            ignore_last_line: true,
            only_integer: true,
        }
    }
}

impl CalcOptions {
    /// Parse options from a JSON document.
    ///
    /// # Errors
    /// Returns [`CsvCalcError::Json`](crate::error::CsvCalcError::Json) if a
    /// known key has the wrong type.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

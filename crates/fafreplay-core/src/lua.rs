//! Lua values carried by script commands.
//!
//! Sim callbacks and command cells embed serialized Lua data. Each value
//! starts with a one-byte tag:
//!
//! | Tag | Value | Body |
//! |-----|-------|------|
//! | 0 | number | `f32` |
//! | 1 | string | NUL-terminated |
//! | 2 | nil | one pad byte |
//! | 3 | bool | `u8`, non-zero is true |
//! | 4 | table | key/value pairs, then tag 5 |
//! | 5 | table end | only valid as a terminator |

use std::fmt;

use crate::command::CommandType;
use crate::cursor::Cursor;
use crate::error::ParseError;

const TAG_NUMBER: u8 = 0;
const TAG_STRING: u8 = 1;
const TAG_NIL: u8 = 2;
const TAG_BOOL: u8 = 3;
const TAG_TABLE: u8 = 4;
const TAG_TABLE_END: u8 = 5;

/// Deepest table nesting accepted before the payload is rejected.
pub const MAX_TABLE_DEPTH: usize = 128;

/// A decoded Lua value.
#[derive(Clone, Debug, PartialEq)]
pub enum LuaValue {
    /// A Lua number, stored as `f32` on the wire.
    Number(f32),
    /// A Lua string.
    String(String),
    /// `nil`.
    Nil,
    /// A boolean.
    Bool(bool),
    /// A table, in wire order.
    Table(LuaTable),
}

/// A Lua table as an ordered list of key/value pairs.
///
/// Keys are kept in the order they were serialized. Lookups are linear;
/// tables in replays hold a handful of entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LuaTable(pub Vec<(LuaValue, LuaValue)>);

impl LuaTable {
    /// The value stored under string key `key`.
    pub fn get(&self, key: &str) -> Option<&LuaValue> {
        self.0
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in wire order.
    pub fn iter(&self) -> impl Iterator<Item = &(LuaValue, LuaValue)> {
        self.0.iter()
    }
}

impl FromIterator<(LuaValue, LuaValue)> for LuaTable {
    fn from_iter<I: IntoIterator<Item = (LuaValue, LuaValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl LuaValue {
    /// Whether this is `nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// The string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The table, if this is a table.
    pub fn as_table(&self) -> Option<&LuaTable> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Shorthand for `as_table()?.get(key)`.
    pub fn get(&self, key: &str) -> Option<&LuaValue> {
        self.as_table()?.get(key)
    }

    /// Render a string or number as text.
    ///
    /// Whole numbers print without a fractional part, so army index `2.0`
    /// becomes `"2"`. Other kinds return `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(format!("{}", *n as i64)),
            Self::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for LuaValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<f32> for LuaValue {
    fn from(n: f32) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for LuaValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<LuaTable> for LuaValue {
    fn from(t: LuaTable) -> Self {
        Self::Table(t)
    }
}

impl fmt::Display for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Table(t) => {
                write!(f, "{{")?;
                for (i, (k, v)) in t.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{k}] = {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Read one Lua value from `cursor`.
///
/// `command` only labels errors.
pub fn read_lua(cursor: &mut Cursor<'_>, command: CommandType) -> Result<LuaValue, ParseError> {
    read_value(cursor, command, 0)
}

fn read_value(
    cursor: &mut Cursor<'_>,
    command: CommandType,
    depth: usize,
) -> Result<LuaValue, ParseError> {
    let tag_offset = cursor.offset();
    match cursor.read_u8()? {
        TAG_NUMBER => Ok(LuaValue::Number(cursor.read_f32_le()?)),
        TAG_STRING => Ok(LuaValue::String(cursor.read_cstr()?)),
        TAG_NIL => {
            cursor.skip(1)?;
            Ok(LuaValue::Nil)
        }
        TAG_BOOL => Ok(LuaValue::Bool(cursor.read_u8()? != 0)),
        TAG_TABLE => {
            if depth >= MAX_TABLE_DEPTH {
                return Err(ParseError::malformed(
                    command,
                    format!("lua tables nested deeper than {MAX_TABLE_DEPTH} at offset {tag_offset}"),
                ));
            }
            let mut entries = Vec::new();
            while cursor.peek_u8()? != TAG_TABLE_END {
                let key = read_value(cursor, command, depth + 1)?;
                let value = read_value(cursor, command, depth + 1)?;
                entries.push((key, value));
            }
            cursor.skip(1)?;
            Ok(LuaValue::Table(LuaTable(entries)))
        }
        TAG_TABLE_END => Err(ParseError::malformed(
            command,
            format!("unexpected lua table end at offset {tag_offset}"),
        )),
        tag => Err(ParseError::malformed(
            command,
            format!("unknown lua tag {tag} at offset {tag_offset}"),
        )),
    }
}

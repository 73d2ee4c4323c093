//! Parameter binding for statements
//!
//! Positional parameters pass through untouched and bind to the dialect's
//! native placeholders. Named parameters are written as `:name` and compiled
//! to `$n` (PostgreSQL) or `?` (MySQL, SQLite) before execution.

use serde_json::Value;
use sqlblock_core::{BlockError, Parameters};
use sqlblock_types::Dialect;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// Statement text and bind values ready for a session
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement<'a> {
    pub sql: Cow<'a, str>,
    /// `None` runs the statement unprepared
    pub binds: Option<Vec<Value>>,
}

/// Prepare a statement and its parameters for execution
///
/// Empty parameters are the same as none at all. A named placeholder with
/// no matching value is an execution error raised before any I/O.
pub fn bind_parameters<'a>(
    statement: &'a str,
    parameters: Option<&Parameters>,
    dialect: Dialect,
) -> Result<BoundStatement<'a>, BlockError> {
    match parameters {
        None => Ok(BoundStatement {
            sql: Cow::Borrowed(statement),
            binds: None,
        }),
        Some(p) if p.is_empty() => Ok(BoundStatement {
            sql: Cow::Borrowed(statement),
            binds: None,
        }),
        Some(Parameters::Positional(values)) => Ok(BoundStatement {
            sql: Cow::Borrowed(statement),
            binds: Some(values.clone()),
        }),
        Some(Parameters::Named(values)) => {
            let (sql, binds) = compile_named(statement, values, dialect)?;
            Ok(BoundStatement {
                sql: Cow::Owned(sql),
                binds: Some(binds),
            })
        }
    }
}

/// Rewrite `:name` placeholders into native ones
///
/// Quoted strings, quoted identifiers and comments are copied verbatim, as
/// are `::` casts. `\:` produces a literal colon.
fn compile_named(
    statement: &str,
    values: &BTreeMap<String, Value>,
    dialect: Dialect,
) -> Result<(String, Vec<Value>), BlockError> {
    let numbered = dialect.numbered_placeholders();
    let mut sql = String::with_capacity(statement.len());
    let mut binds = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    let bytes = statement.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                let end = find_byte(bytes, i + 1, quote).map_or(bytes.len(), |e| e + 1);
                sql.push_str(&statement[i..end]);
                i = end;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                let end = find_byte(bytes, i, b'\n').unwrap_or(bytes.len());
                sql.push_str(&statement[i..end]);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = statement[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |e| i + 2 + e + 2);
                sql.push_str(&statement[i..end]);
                i = end;
            }
            b'\\' if bytes.get(i + 1) == Some(&b':') => {
                sql.push(':');
                i += 2;
            }
            b':' if bytes.get(i + 1) == Some(&b':') => {
                sql.push_str("::");
                i += 2;
            }
            b':' if bytes.get(i + 1).is_some_and(|b| is_name_start(*b)) => {
                let start = i + 1;
                let mut end = start + 1;
                while end < bytes.len() && is_name_char(bytes[end]) {
                    end += 1;
                }
                let name = &statement[start..end];
                let value = values.get(name).ok_or_else(|| {
                    BlockError::execution(format!("A value is required for bind parameter '{}'", name))
                })?;

                if numbered {
                    let position = match positions.get(name) {
                        Some(p) => *p,
                        None => {
                            binds.push(value.clone());
                            positions.insert(name, binds.len());
                            binds.len()
                        }
                    };
                    sql.push('$');
                    sql.push_str(&position.to_string());
                } else {
                    binds.push(value.clone());
                    sql.push('?');
                }
                i = end;
            }
            _ => {
                // Copy one full character
                let ch_len = statement[i..].chars().next().map_or(1, char::len_utf8);
                sql.push_str(&statement[i..i + ch_len]);
                i += ch_len;
            }
        }
    }

    Ok((sql, binds))
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from..].iter().position(|b| *b == needle).map(|p| from + p)
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

use crate::error::{AppError, Result};
use std::fmt;
use std::str::FromStr;

/// A sheet name plus an optional A1 cell range, e.g. `'Sheet1'!A1:B3`.
///
/// Without cells the range addresses the whole sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet: String,
    pub cells: Option<String>,
}

impl SheetRange {
    pub fn new(sheet: impl Into<String>, cells: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            cells: Some(cells.into()),
        }
    }

    pub fn whole_sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            cells: None,
        }
    }

    /// A1 notation with the sheet name always quoted.
    pub fn to_a1(&self) -> String {
        let sheet = format!("'{}'", self.sheet.replace('\'', "''"));
        match &self.cells {
            Some(cells) => format!("{}!{}", sheet, cells),
            None => sheet,
        }
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl FromStr for SheetRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let (sheet, rest) = match s.strip_prefix('\'') {
            Some(quoted) => split_quoted(quoted)
                .ok_or_else(|| AppError::InvalidInput(format!("Unterminated quote in '{}'", s)))?,
            None => match s.split_once('!') {
                Some((sheet, cells)) => (sheet.to_string(), Some(cells)),
                None => (s.to_string(), None),
            },
        };

        if sheet.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Range '{}' has an empty sheet name",
                s
            )));
        }

        match rest {
            None => Ok(Self::whole_sheet(sheet)),
            Some("") => Err(AppError::InvalidInput(format!(
                "Range '{}' has an empty cell range",
                s
            ))),
            Some(cells) => Ok(Self::new(sheet, cells)),
        }
    }
}

/// Split `Name''s sheet'!A1` (leading quote already stripped) into the
/// unescaped name and the text after `!`.
fn split_quoted(s: &str) -> Option<(String, Option<&str>)> {
    let mut sheet = String::new();
    let mut chars = s.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c != '\'' {
            sheet.push(c);
            continue;
        }
        if let Some((_, '\'')) = chars.peek() {
            sheet.push('\'');
            chars.next();
            continue;
        }

        let rest = &s[idx + 1..];
        return match rest.strip_prefix('!') {
            Some(cells) => Some((sheet, Some(cells))),
            None if rest.is_empty() => Some((sheet, None)),
            None => None,
        };
    }

    None
}

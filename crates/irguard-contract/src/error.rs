use std::fmt;

use thiserror::Error;

/// Raised when IR text cannot be parsed as JSON, even after syntax normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub excerpt: String,
    pub message: String,
    pub normalized: bool,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.normalized {
            "JSON syntax errors remain after normalization"
        } else {
            "invalid JSON syntax in IR document"
        };
        writeln!(
            f,
            "{prefix} at line {}, column {}:",
            self.line, self.column
        )?;
        writeln!(f, "  {}", self.excerpt.trim_end())?;
        writeln!(f, "  {}^", " ".repeat(self.column.saturating_sub(1)))?;
        write!(f, "error: {}", self.message)?;
        if !self.normalized {
            write!(
                f,
                "\nhint: use \"NaN\", \"Infinity\", \"-Infinity\" string sentinels for special floats; check for missing commas, quotes, or brackets"
            )?;
        }
        Ok(())
    }
}

/// Raised when a parsed IR document violates the structural contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SchemaError {
    pub case_id: Option<String>,
    pub field: String,
    pub message: String,
}

impl SchemaError {
    pub fn document(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            case_id: None,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn case(
        case_id: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            case_id: Some(case_id.into()),
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.case_id {
            Some(case_id) => write!(
                f,
                "schema violation in case '{}' at {}: {}",
                case_id, self.field, self.message
            ),
            None => write!(f, "schema violation at {}: {}", self.field, self.message),
        }
    }
}

/// Document-level failures raised before any target code runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

use crate::{
    config::LeadSchemaConfig,
    error::{CrmBotError, Result},
};

/// A single-letter column reference, A through Z. The workbook convention
/// caps tables at 26 columns; multi-letter references are rejected outright
/// rather than silently misresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef(u8);

impl ColumnRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let s = raw.trim();
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                Ok(ColumnRef(c.to_ascii_uppercase() as u8 - b'A'))
            }
            _ => Err(CrmBotError::InvalidColumn(raw.to_string())),
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn letter(self) -> char {
        (self.0 + b'A') as char
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Resolve a letter reference to its zero-based column index.
pub fn column_to_index(raw: &str) -> Result<usize> {
    ColumnRef::parse(raw).map(ColumnRef::index)
}

/// Column positions of the tracked-lead fields, resolved from configuration
/// once at startup instead of re-deriving letters at each access site.
#[derive(Debug, Clone, Copy)]
pub struct LeadSchema {
    pub first_name: usize,
    pub last_name: usize,
    pub contact_number: usize,
    pub renewal_date: usize,
    pub follow_up_date: usize,
    pub notified: usize,
}

impl LeadSchema {
    pub fn from_config(cfg: &LeadSchemaConfig) -> Result<Self> {
        Ok(Self {
            first_name: column_to_index(&cfg.first_name)?,
            last_name: column_to_index(&cfg.last_name)?,
            contact_number: column_to_index(&cfg.contact_number)?,
            renewal_date: column_to_index(&cfg.renewal_date)?,
            follow_up_date: column_to_index(&cfg.follow_up_date)?,
            notified: column_to_index(&cfg.notified)?,
        })
    }
}

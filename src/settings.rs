use crate::{
    error::{CrmBotError, Result},
    schema::ColumnRef,
    storage::Table,
};

/// Attribute names looked up in the setup table.
pub const ATTR_LOG_LEVEL: &str = "LogLevel";
pub const ATTR_RENEWAL_RECIPIENTS: &str = "RenewalRecipients";
pub const ATTR_MONTHLY_RECIPIENTS: &str = "MonthlyLeadsRecipients";
pub const ATTR_IMPORT_STATUS_COLUMN: &str = "LeadImportStatusColumn";

/// Layout of the import block in the setup table: the primary-key column
/// pair sits on the second data row, mapping pairs follow underneath.
const IMPORT_DEST_COL: usize = 2;
const IMPORT_SRC_COL: usize = 3;
const IMPORT_KEY_ROW: usize = 2;
const IMPORT_MAPPINGS_FROM: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Minimal,
    Detailed,
}

/// Column-mapping parameters for one import run, letters already resolved.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub status_col: ColumnRef,
    pub primary_key_dest: ColumnRef,
    pub primary_key_src: ColumnRef,
    pub mappings: Vec<(ColumnRef, ColumnRef)>,
}

/// The setup table resolved once per invocation. Attributes live in the
/// first two columns; the import block occupies the two columns next to
/// them. A missing required attribute is fatal to the current action.
#[derive(Debug, Clone)]
pub struct Settings {
    attrs: Vec<(String, String)>,
    import_key: Option<(String, String)>,
    import_mappings: Vec<(String, String)>,
}

impl Settings {
    pub fn resolve(table: &Table) -> Self {
        let mut attrs = Vec::new();
        let mut import_key = None;
        let mut import_mappings = Vec::new();

        for (row_idx, row) in table.data_rows() {
            let name = row.get(0);
            if !name.is_blank() {
                attrs.push((name.display().trim().to_string(), row.get(1).display()));
            }

            let dest = row.get(IMPORT_DEST_COL);
            let src = row.get(IMPORT_SRC_COL);
            if row_idx == IMPORT_KEY_ROW && !dest.is_blank() && !src.is_blank() {
                import_key = Some((dest.display(), src.display()));
            } else if row_idx >= IMPORT_MAPPINGS_FROM && !dest.is_blank() && !src.is_blank() {
                import_mappings.push((dest.display(), src.display()));
            }
        }

        Self {
            attrs,
            import_key,
            import_mappings,
        }
    }

    /// Required attribute lookup.
    pub fn require(&self, attribute: &str) -> Result<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| CrmBotError::Lookup(attribute.to_string()))
    }

    pub fn log_level(&self) -> LogLevel {
        match self.require(ATTR_LOG_LEVEL) {
            Ok("Detailed") => LogLevel::Detailed,
            _ => LogLevel::Minimal,
        }
    }

    /// Notification recipients for a category, as a comma-separated list of
    /// chat ids in the attribute value.
    pub fn recipients(&self, category: &str) -> Result<Vec<i64>> {
        let raw = self.require(category)?;
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>().map_err(|_| {
                    CrmBotError::Config(format!("Invalid recipient id {:?} in {}", part, category))
                })
            })
            .collect()
    }

    pub fn import_settings(&self) -> Result<ImportSettings> {
        let status_col = ColumnRef::parse(self.require(ATTR_IMPORT_STATUS_COLUMN)?)?;
        let (dest, src) = self
            .import_key
            .as_ref()
            .ok_or_else(|| CrmBotError::Lookup("import primary key columns".to_string()))?;

        let mappings = self
            .import_mappings
            .iter()
            .map(|(d, s)| Ok((ColumnRef::parse(d)?, ColumnRef::parse(s)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(ImportSettings {
            status_col,
            primary_key_dest: ColumnRef::parse(dest)?,
            primary_key_src: ColumnRef::parse(src)?,
            mappings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Record;

    fn setup_table() -> Table {
        Table::new(
            "SetUp",
            vec![
                Record::from_texts(&["Attribute", "Value", "Import Dest", "Import Src"]),
                Record::from_texts(&["LogLevel", "Detailed", "", ""]),
                Record::from_texts(&["RenewalRecipients", "100, 200", "C", "A"]),
                Record::from_texts(&["LeadImportStatusColumn", "H", "C", "A"]),
                Record::from_texts(&["", "", "D", "B"]),
            ],
        )
    }

    #[test]
    fn test_attribute_lookup() {
        let settings = Settings::resolve(&setup_table());
        assert_eq!(settings.require("LogLevel").unwrap(), "Detailed");
        assert_eq!(settings.log_level(), LogLevel::Detailed);
    }

    #[test]
    fn test_missing_attribute_is_fatal_lookup() {
        let settings = Settings::resolve(&setup_table());
        match settings.require("MonthlyLeadsRecipients") {
            Err(CrmBotError::Lookup(attr)) => assert_eq!(attr, "MonthlyLeadsRecipients"),
            other => panic!("expected Lookup error, got {:?}", other),
        }
    }

    #[test]
    fn test_recipients_parse() {
        let settings = Settings::resolve(&setup_table());
        assert_eq!(
            settings.recipients(ATTR_RENEWAL_RECIPIENTS).unwrap(),
            vec![100, 200]
        );
    }

    #[test]
    fn test_import_block_layout() {
        let settings = Settings::resolve(&setup_table());
        let import = settings.import_settings().unwrap();
        assert_eq!(import.status_col.index(), 7);
        assert_eq!(import.primary_key_dest.index(), 2);
        assert_eq!(import.primary_key_src.index(), 0);
        assert_eq!(import.mappings.len(), 2);
        assert_eq!(import.mappings[1].0.index(), 3);
        assert_eq!(import.mappings[1].1.index(), 1);
    }

    #[test]
    fn test_log_level_defaults_to_minimal() {
        let table = Table::new(
            "SetUp",
            vec![
                Record::from_texts(&["Attribute", "Value"]),
                Record::from_texts(&["Other", "x"]),
            ],
        );
        assert_eq!(Settings::resolve(&table).log_level(), LogLevel::Minimal);
    }
}

//! Diagnostics recorded during a decompile run

use serde::{Deserialize, Serialize};

/// Severity level for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Identifies what went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageCode {
    /// A foreign key names a row that is not in the index
    ExpectedForeignRow,
    /// An enumerated column holds a value outside its documented set
    IllegalColumnValue,
    /// An attribute column carries bits with no known meaning
    UnknownAttributeBits,
    /// A row cannot be expressed in the output at all
    UnrepresentableColumnValue,
    /// Custom action of the nested-install type
    NestedInstall,
    TargetDirCorrectedDefaultDir,
    TooManyProgIds,
    /// ProgId with no class, parent ProgId or extension to live under
    UnusedProgId,
    ControlTabOrderLoop,
    IllegalRegistryKeyPath,
    IllegalShortFilename,
    FamilyFileRangesMismatch,
    UnusedSearch,
    TableDecompilationUnimplemented,
    /// Row shape does not match its table definition
    MalformedRow,
    DuplicateTable,
    /// An extension failed while decoding a table it claimed
    ExtensionFailure,
}

impl std::fmt::Display for MessageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single recorded diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: MessageCode,
    pub severity: Severity,
    pub message: String,
    /// Table of the offending row
    pub table: Option<String>,
    /// Primary key of the offending row
    pub row_key: Option<String>,
    pub column: Option<String>,
    /// The problematic value
    pub value: Option<String>,
    /// Table a foreign key was expected to resolve into
    pub target_table: Option<String>,
}

impl Diagnostic {
    pub fn new(code: MessageCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            table: None,
            row_key: None,
            column: None,
            value: None,
            target_table: None,
        }
    }

    pub fn warning(code: MessageCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn error(code: MessageCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn at_row(mut self, table: &str, row_key: &str) -> Self {
        self.table = Some(table.to_string());
        self.row_key = Some(row_key.to_string());
        self
    }

    /// Attribute the diagnostic to a whole table
    pub fn in_table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    pub fn with_column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_target(mut self, target_table: &str) -> Self {
        self.target_table = Some(target_table.to_string());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.severity, self.message)?;
        if let Some(ref table) = self.table {
            write!(f, " (table: {}", table)?;
            if let Some(ref key) = self.row_key {
                write!(f, ", key: {}", key)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Collects diagnostics and remembers whether any error was recorded
#[derive(Debug, Default)]
pub struct Messages {
    entries: Vec<Diagnostic>,
    encountered_error: bool,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and forward it to the log
    pub fn write(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => {
                log::error!("{}", diagnostic);
                self.encountered_error = true;
            }
            Severity::Warning => log::warn!("{}", diagnostic),
            Severity::Info => log::debug!("{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    pub fn encountered_error(&self) -> bool {
        self.encountered_error
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count diagnostics by severity: (errors, warnings, infos)
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for d in &self.entries {
            match d.severity {
                Severity::Error => counts.0 += 1,
                Severity::Warning => counts.1 += 1,
                Severity::Info => counts.2 += 1,
            }
        }
        counts
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

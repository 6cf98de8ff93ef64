//! Encodings embedded in MSI string and integer columns
//!
//! - `short|long` filename pairs and `target:source` DefaultDir values
//! - `[~]`-delimited multi-string values
//! - Environment name modifiers and separator markers
//! - Registry value type prefixes
//! - Packed integer dates

use std::fmt;

/// Delimiter of multi-string values
pub const MULTI_STRING_SEPARATOR: &str = "[~]";

/// Characters never valid in an 8.3 name part
const ILLEGAL_SHORT_NAME_CHARS: &[char] = &[
    '\\', '?', '|', '>', '<', ':', '/', '*', '"', '+', ',', ';', '=', '[', ']', '.', ' ',
];

/// Split a `short|long` pair at the first `|`
pub fn split_name_pair(value: &str) -> (String, Option<String>) {
    match value.split_once('|') {
        Some((short, long)) => (short.to_string(), Some(long.to_string())),
        None => (value.to_string(), None),
    }
}

/// Inverse of [`split_name_pair`]
pub fn join_name_pair(short: &str, long: Option<&str>) -> String {
    match long {
        Some(long) => format!("{}|{}", short, long),
        None => short.to_string(),
    }
}

/// The four names packed into a DefaultDir/Filename value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsiNames {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub short_source_name: Option<String>,
    pub long_source_name: Option<String>,
}

/// Decompose `target[:source]` where each half may be `short|long`.
///
/// Long names identical to their short name are dropped, and source names
/// identical to the target names are dropped.
pub fn get_names(value: &str) -> MsiNames {
    let (target, source) = match value.split_once(':') {
        Some((target, source)) => (target, Some(source)),
        None => (value, None),
    };

    let (mut source_short, mut source_long) = match source {
        Some(source) => {
            let (short, long) = split_name_pair(source);
            (Some(short), long)
        }
        None => (None, None),
    };
    let (target_short, mut target_long) = split_name_pair(target);

    if source_short.is_some() && source_short == source_long {
        source_long = None;
    }
    if Some(&target_short) == target_long.as_ref() {
        target_long = None;
    }
    if source_short.as_deref() == Some(target_short.as_str()) && source_long == target_long {
        source_short = None;
        source_long = None;
    }

    MsiNames {
        short_name: non_empty(target_short),
        long_name: target_long.and_then(non_empty),
        short_source_name: source_short.and_then(non_empty),
        long_source_name: source_long.and_then(non_empty),
    }
}

/// Best single name: long over short, source over target when asked
pub fn get_name(value: &str, source: bool, long_name: bool) -> Option<String> {
    let names = get_names(value);
    if source {
        if long_name && names.long_source_name.is_some() {
            return names.long_source_name;
        }
        if names.short_source_name.is_some() {
            return names.short_source_name;
        }
    }
    if long_name && names.long_name.is_some() {
        names.long_name
    } else {
        names.short_name
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Check an 8.3 filename, optionally allowing `?` and `*`
pub fn is_valid_short_filename(name: &str, allow_wildcards: bool) -> bool {
    let valid_part = |part: &str, max: usize| {
        !part.is_empty()
            && part.chars().count() <= max
            && part.chars().all(|c| {
                !ILLEGAL_SHORT_NAME_CHARS.contains(&c)
                    || (allow_wildcards && (c == '?' || c == '*'))
            })
    };

    match name.split_once('.') {
        Some((base, ext)) => valid_part(base, 8) && valid_part(ext, 3),
        None => valid_part(name, 8),
    }
}

/// Split a `[~]`-delimited value into its parts
pub fn split_multi_string(value: &str) -> Vec<String> {
    value
        .split(MULTI_STRING_SEPARATOR)
        .map(str::to_string)
        .collect()
}

/// How a multi-string registry value combines with existing data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiStringAction {
    Write,
    Append,
    Prepend,
}

/// A Registry.Value column decoded by its type prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    Binary(String),
    Expandable(String),
    Integer(String),
    MultiString {
        action: MultiStringAction,
        values: Vec<String>,
    },
    String(String),
}

impl RegistryValue {
    /// WiX `Type` attribute value
    pub fn type_name(&self) -> &'static str {
        match self {
            RegistryValue::Binary(_) => "binary",
            RegistryValue::Expandable(_) => "expandable",
            RegistryValue::Integer(_) => "integer",
            RegistryValue::MultiString { .. } => "multiString",
            RegistryValue::String(_) => "string",
        }
    }
}

/// Sniff the registry value type from its prefix
pub fn parse_registry_value(value: &str) -> RegistryValue {
    if let Some(hex) = value.strip_prefix("#x") {
        return RegistryValue::Binary(hex.to_string());
    }
    if let Some(expandable) = value.strip_prefix("#%") {
        return RegistryValue::Expandable(expandable.to_string());
    }
    if !value.starts_with("##") {
        if let Some(number) = value.strip_prefix('#') {
            let digits = number.strip_prefix(['+', '-']).unwrap_or(number);
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return RegistryValue::Integer(number.to_string());
            }
            return RegistryValue::String(value.to_string());
        }
    }

    let value = value.strip_prefix('#').filter(|_| value.starts_with("##")).unwrap_or(value);

    if !value.contains(MULTI_STRING_SEPARATOR) {
        return RegistryValue::String(value.to_string());
    }

    let sep = MULTI_STRING_SEPARATOR;
    let (action, body) = if value == sep {
        (MultiStringAction::Write, "")
    } else if value.len() >= 2 * sep.len() && value.starts_with(sep) && value.ends_with(sep) {
        (MultiStringAction::Write, &value[sep.len()..value.len() - sep.len()])
    } else if let Some(rest) = value.strip_prefix(sep) {
        (MultiStringAction::Append, rest)
    } else if let Some(rest) = value.strip_suffix(sep) {
        (MultiStringAction::Prepend, rest)
    } else {
        (MultiStringAction::Write, value)
    };

    RegistryValue::MultiString {
        action,
        values: split_multi_string(body),
    }
}

/// Action modifier of an Environment row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentAction {
    Set,
    Create,
    Remove,
}

impl EnvironmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentAction::Set => "set",
            EnvironmentAction::Create => "create",
            EnvironmentAction::Remove => "remove",
        }
    }
}

/// Environment.Name decoded into modifiers and variable name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentName {
    pub action: Option<EnvironmentAction>,
    pub permanent: bool,
    pub system: bool,
    pub name: String,
}

/// Consume leading `=`, `+`, `-`, `!`, `*` modifiers; the rest is the name
pub fn parse_environment_name(raw: &str) -> EnvironmentName {
    let mut parsed = EnvironmentName {
        action: None,
        permanent: true,
        system: false,
        name: String::new(),
    };

    for (i, c) in raw.char_indices() {
        match c {
            '=' => parsed.action = Some(EnvironmentAction::Set),
            '+' => parsed.action = Some(EnvironmentAction::Create),
            '-' => parsed.permanent = false,
            '!' => parsed.action = Some(EnvironmentAction::Remove),
            '*' => parsed.system = true,
            _ => {
                parsed.name = raw[i..].to_string();
                break;
            }
        }
    }

    parsed
}

/// Where an environment value goes relative to the existing value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentPart {
    /// Value is placed before the existing value
    First,
    /// Value is placed after the existing value
    Last,
}

impl EnvironmentPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentPart::First => "first",
            EnvironmentPart::Last => "last",
        }
    }
}

/// Environment.Value decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentValue {
    pub part: Option<EnvironmentPart>,
    pub separator: Option<String>,
    pub value: Option<String>,
}

/// `[~];value` appends with `;`, `value;[~]` prepends with `;`
pub fn parse_environment_value(raw: &str) -> EnvironmentValue {
    let sep = MULTI_STRING_SEPARATOR;

    if let Some(rest) = raw.strip_prefix(sep) {
        let mut chars = rest.chars();
        return match chars.next() {
            Some(separator) => EnvironmentValue {
                part: Some(EnvironmentPart::Last),
                separator: Some(separator.to_string()),
                value: Some(chars.as_str().to_string()).filter(|v| !v.is_empty()),
            },
            None => EnvironmentValue {
                part: Some(EnvironmentPart::Last),
                separator: None,
                value: None,
            },
        };
    }

    if let Some(rest) = raw.strip_suffix(sep) {
        let mut chars = rest.chars();
        return match chars.next_back() {
            Some(separator) => EnvironmentValue {
                part: Some(EnvironmentPart::First),
                separator: Some(separator.to_string()),
                value: Some(chars.as_str().to_string()).filter(|v| !v.is_empty()),
            },
            None => EnvironmentValue {
                part: Some(EnvironmentPart::First),
                separator: None,
                value: None,
            },
        };
    }

    EnvironmentValue {
        part: None,
        separator: None,
        value: Some(raw.to_string()),
    }
}

/// Date and time unpacked from an MSI integer date.
///
/// No calendar validation happens: day 0 and month 0 are reported as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsiDateTime {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
}

/// Unpack `date << 16 | time` into its fields
pub fn decode_integer_date(value: i64) -> MsiDateTime {
    let date = value / 65536;
    let time = value % 65536;

    MsiDateTime {
        year: 1980 + date / 512,
        month: (date % 512) / 32,
        day: date % 32,
        hour: time / 2048,
        minute: (time % 2048) / 32,
        second: (time % 32) * 2,
    }
}

impl fmt::Display for MsiDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

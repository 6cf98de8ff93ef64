//! Built-in definitions of the standard installer tables
//!
//! Databases opened from disk carry their own column metadata; these
//! definitions are used for synthetic snapshots, for ordering tables by
//! foreign key, and for telling standard tables from custom ones.

use crate::types::{ColumnCategory as C, ColumnDefinition, ColumnType, TableDefinition};

/// Tables the decompiler consumes without producing anything for them
pub const INTERNAL_TABLES: &[&str] = &[
    "_Columns",
    "_Storages",
    "_Streams",
    "_Tables",
    "_TransformView",
    "_Validation",
    "ModuleComponents",
    "MsiFileHash",
];

/// Standard tables with no dedicated decoder
pub const UNIMPLEMENTED_TABLES: &[&str] = &[
    "BBControl",
    "Billboard",
    "Complus",
    "FileSFPCatalog",
    "IsolatedComponent",
    "ModuleConfiguration",
    "ModuleSubstitution",
    "MsiAssembly",
    "MsiAssemblyName",
    "MsiDigitalCertificate",
    "MsiDigitalSignature",
    "MsiEmbeddedChainer",
    "MsiEmbeddedUI",
    "MsiLockPermissionsEx",
    "MsiPackageCertificate",
    "MsiPatchCertificate",
    "MsiPatchHeaders",
    "MsiServiceConfig",
    "MsiServiceConfigFailureActions",
    "MsiShortcutProperty",
    "Patch",
    "PatchPackage",
    "SFPCatalog",
];

/// Names of the package sequence tables
pub const SEQUENCE_TABLES: &[&str] = &[
    "AdminExecuteSequence",
    "AdminUISequence",
    "AdvtExecuteSequence",
    "AdvtUISequence",
    "InstallExecuteSequence",
    "InstallUISequence",
];

/// Names of the merge-module sequence tables
pub const MODULE_SEQUENCE_TABLES: &[&str] = &[
    "ModuleAdminExecuteSequence",
    "ModuleAdminUISequence",
    "ModuleAdvtExecuteSequence",
    "ModuleAdvtUISequence",
    "ModuleInstallExecuteSequence",
    "ModuleInstallUISequence",
];

/// True for tables defined by Windows Installer itself
pub fn is_standard_table(name: &str) -> bool {
    INTERNAL_TABLES.contains(&name)
        || UNIMPLEMENTED_TABLES.contains(&name)
        || standard_definition(name).is_some()
}

pub fn is_internal_table(name: &str) -> bool {
    INTERNAL_TABLES.contains(&name)
}

fn s(name: &str, width: usize, category: C) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::String(width), category)
}

fn ident(name: &str) -> ColumnDefinition {
    s(name, 72, C::Identifier)
}

fn key(name: &str) -> ColumnDefinition {
    ident(name).primary_key()
}

fn fk(name: &str, table: &str) -> ColumnDefinition {
    ident(name).references(table, 1)
}

fn text(name: &str, width: usize) -> ColumnDefinition {
    s(name, width, C::Text).nullable()
}

fn formatted(name: &str, width: usize) -> ColumnDefinition {
    s(name, width, C::Formatted).nullable()
}

fn condition(name: &str) -> ColumnDefinition {
    s(name, 255, C::Condition).nullable()
}

fn guid(name: &str) -> ColumnDefinition {
    s(name, 38, C::Guid)
}

fn short(name: &str) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::Int16, C::Integer)
}

fn long(name: &str) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::Int32, C::DoubleInteger)
}

fn binary(name: &str) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::Binary, C::Binary)
}

fn component() -> ColumnDefinition {
    fk("Component_", "Component")
}

fn sequence_columns() -> Vec<ColumnDefinition> {
    vec![
        key("Action"),
        condition("Condition"),
        short("Sequence").nullable(),
    ]
}

fn module_sequence_columns(table: &str) -> Vec<ColumnDefinition> {
    vec![
        s("Action", 64, C::Identifier).primary_key(),
        short("Sequence").nullable(),
        s("BaseAction", 64, C::Identifier).nullable().references(table, 1),
        short("After").nullable().range(0, 1),
        condition("Condition"),
    ]
}

fn list_columns(with_binary: bool) -> Vec<ColumnDefinition> {
    let mut columns = vec![
        key("Property"),
        short("Order").primary_key(),
        s("Value", 64, C::Formatted),
        text("Text", 64).localizable(),
    ];
    if with_binary {
        columns.push(fk("Binary_", "Binary").nullable());
    }
    columns
}

/// Column definitions of a standard table
pub fn standard_definition(name: &str) -> Option<TableDefinition> {
    if SEQUENCE_TABLES.contains(&name) {
        return Some(TableDefinition::new(name, sequence_columns()));
    }
    if MODULE_SEQUENCE_TABLES.contains(&name) {
        return Some(TableDefinition::new(name, module_sequence_columns(name)));
    }

    let columns = match name {
        "_SummaryInformation" => vec![
            short("PropertyId").primary_key(),
            text("Value", 0),
        ],
        "ActionText" => vec![
            key("Action"),
            text("Description", 0).localizable(),
            s("Template", 0, C::Template).nullable().localizable(),
        ],
        "AppId" => vec![
            guid("AppId").primary_key(),
            formatted("RemoteServerName", 255),
            formatted("LocalService", 255),
            formatted("ServiceParameters", 255),
            formatted("DllSurrogate", 255),
            short("ActivateAtStorage").nullable().range(0, 1),
            short("RunAsInteractiveUser").nullable().range(0, 1),
        ],
        "AppSearch" => vec![
            key("Property"),
            key("Signature_").references("Signature", 1),
        ],
        "Binary" => vec![key("Name"), binary("Data")],
        "BindImage" => vec![
            key("File_").references("File", 1),
            s("Path", 255, C::Paths).nullable(),
        ],
        "CCPSearch" => vec![key("Signature_").references("Signature", 1)],
        "CheckBox" => vec![key("Property"), formatted("Value", 64)],
        "Class" => vec![
            guid("CLSID").primary_key(),
            s("Context", 32, C::Identifier).primary_key(),
            component().primary_key(),
            text("ProgId_Default", 255),
            text("Description", 255).localizable(),
            guid("AppId_").nullable().references("AppId", 1),
            text("FileTypeMask", 255),
            fk("Icon_", "Icon").nullable(),
            short("IconIndex").nullable(),
            s("DefInprocHandler", 32, C::Filename).nullable(),
            formatted("Argument", 255),
            s("Feature_", 38, C::Identifier).references("Feature", 1),
            short("Attributes").nullable(),
        ],
        "ComboBox" => list_columns(false),
        "CompLocator" => vec![
            key("Signature_"),
            guid("ComponentId"),
            short("Type").nullable().range(0, 1),
        ],
        "Component" => vec![
            key("Component"),
            guid("ComponentId").nullable(),
            fk("Directory_", "Directory"),
            short("Attributes"),
            condition("Condition"),
            ident("KeyPath").nullable(),
        ],
        "Condition" => vec![
            s("Feature_", 38, C::Identifier)
                .primary_key()
                .references("Feature", 1),
            short("Level").primary_key(),
            condition("Condition"),
        ],
        "Control" => vec![
            key("Dialog_").references("Dialog", 1),
            s("Control", 50, C::Identifier).primary_key(),
            s("Type", 20, C::Identifier),
            short("X"),
            short("Y"),
            short("Width"),
            short("Height"),
            long("Attributes").nullable(),
            ident("Property").nullable(),
            formatted("Text", 0).localizable(),
            s("Control_Next", 50, C::Identifier).nullable(),
            text("Help", 50).localizable(),
        ],
        "ControlCondition" => vec![
            key("Dialog_").references("Dialog", 1),
            s("Control_", 50, C::Identifier)
                .primary_key()
                .references("Control", 2),
            s("Action", 50, C::Text).primary_key(),
            s("Condition", 255, C::Condition).primary_key(),
        ],
        "ControlEvent" => vec![
            key("Dialog_").references("Dialog", 1),
            s("Control_", 50, C::Identifier)
                .primary_key()
                .references("Control", 2),
            s("Event", 50, C::Formatted).primary_key(),
            s("Argument", 255, C::Formatted).primary_key(),
            s("Condition", 255, C::Condition).primary_key(),
            short("Ordering").nullable(),
        ],
        "CreateFolder" => vec![
            key("Directory_").references("Directory", 1),
            component().primary_key(),
        ],
        "CustomAction" => vec![
            key("Action"),
            short("Type"),
            s("Source", 72, C::CustomSource).nullable(),
            formatted("Target", 255),
            long("ExtendedType").nullable(),
        ],
        "Dialog" => vec![
            key("Dialog"),
            short("HCentering").range(0, 100),
            short("VCentering").range(0, 100),
            short("Width"),
            short("Height"),
            long("Attributes").nullable(),
            formatted("Title", 128).localizable(),
            s("Control_First", 50, C::Identifier),
            s("Control_Default", 50, C::Identifier).nullable(),
            s("Control_Cancel", 50, C::Identifier).nullable(),
        ],
        "Directory" => vec![
            key("Directory"),
            fk("Directory_Parent", "Directory").nullable(),
            s("DefaultDir", 255, C::DefaultDir).localizable(),
        ],
        "DrLocator" => vec![
            key("Signature_"),
            ident("Parent").primary_key().nullable(),
            s("Path", 255, C::AnyPath).primary_key().nullable(),
            short("Depth").nullable(),
        ],
        "DuplicateFile" => vec![
            key("FileKey"),
            component(),
            fk("File_", "File"),
            s("DestName", 255, C::Filename).nullable().localizable(),
            ident("DestFolder").nullable(),
        ],
        "Environment" => vec![
            key("Environment"),
            s("Name", 255, C::Text).localizable(),
            formatted("Value", 255).localizable(),
            component(),
        ],
        "Error" => vec![
            short("Error").primary_key(),
            s("Message", 0, C::Template).nullable().localizable(),
        ],
        "EventMapping" => vec![
            key("Dialog_").references("Dialog", 1),
            s("Control_", 50, C::Identifier)
                .primary_key()
                .references("Control", 2),
            s("Event", 50, C::Identifier).primary_key(),
            s("Attribute", 50, C::Identifier),
        ],
        "Extension" => vec![
            s("Extension", 255, C::Text).primary_key(),
            component().primary_key(),
            text("ProgId_", 255).references("ProgId", 1),
            text("MIME_", 64),
            s("Feature_", 38, C::Identifier).references("Feature", 1),
        ],
        "ExternalFiles" => vec![
            s("Family", 8, C::Identifier)
                .primary_key()
                .references("ImageFamilies", 1),
            s("FTK", 128, C::Text).primary_key(),
            s("FilePath", 255, C::Paths).primary_key(),
            s("SymbolPaths", 0, C::Paths).nullable(),
            text("IgnoreOffsets", 0),
            text("IgnoreLengths", 0),
            text("RetainOffsets", 0),
            short("Order").nullable(),
        ],
        "FamilyFileRanges" => vec![
            s("Family", 8, C::Identifier)
                .primary_key()
                .references("ImageFamilies", 1),
            s("FTK", 128, C::Text).primary_key(),
            text("RetainOffsets", 128),
            text("RetainLengths", 128),
        ],
        "Feature" => vec![
            s("Feature", 38, C::Identifier).primary_key(),
            s("Feature_Parent", 38, C::Identifier)
                .nullable()
                .references("Feature", 1),
            text("Title", 64).localizable(),
            text("Description", 255).localizable(),
            short("Display").nullable(),
            short("Level"),
            s("Directory_", 72, C::UpperCase)
                .nullable()
                .references("Directory", 1),
            short("Attributes"),
        ],
        "FeatureComponents" => vec![
            s("Feature_", 38, C::Identifier)
                .primary_key()
                .references("Feature", 1),
            component().primary_key(),
        ],
        "File" => vec![
            key("File"),
            component(),
            s("FileName", 255, C::Filename).localizable(),
            long("FileSize"),
            s("Version", 72, C::Version).nullable(),
            s("Language", 20, C::Language).nullable(),
            short("Attributes").nullable(),
            long("Sequence"),
        ],
        "Font" => vec![
            key("File_").references("File", 1),
            text("FontTitle", 128),
        ],
        "Icon" => vec![key("Name"), binary("Data")],
        "ImageFamilies" => vec![
            s("Family", 8, C::Identifier).primary_key(),
            s("MediaSrcPropName", 72, C::Identifier).nullable(),
            short("MediaDiskId").nullable(),
            long("FileSequenceStart").nullable(),
            text("DiskPrompt", 128),
            text("VolumeLabel", 32),
        ],
        "IniFile" => vec![
            key("IniFile"),
            s("FileName", 255, C::Filename).localizable(),
            ident("DirProperty").nullable(),
            s("Section", 96, C::Formatted).localizable(),
            s("Key", 128, C::Formatted).localizable(),
            s("Value", 255, C::Formatted).localizable(),
            short("Action"),
            component(),
        ],
        "IniLocator" => vec![
            key("Signature_"),
            s("FileName", 255, C::Filename),
            s("Section", 96, C::Text),
            s("Key", 128, C::Text),
            short("Field").nullable(),
            short("Type").nullable(),
        ],
        "LaunchCondition" => vec![
            s("Condition", 255, C::Condition).primary_key(),
            s("Description", 255, C::Formatted).localizable(),
        ],
        "ListBox" => list_columns(false),
        "ListView" => list_columns(true),
        "LockPermissions" => vec![
            key("LockObject"),
            s("Table", 32, C::Identifier).primary_key(),
            formatted("Domain", 255).primary_key().nullable(),
            s("User", 255, C::Formatted).primary_key(),
            long("Permission").nullable(),
        ],
        "Media" => vec![
            short("DiskId").primary_key(),
            long("LastSequence"),
            text("DiskPrompt", 64).localizable(),
            s("Cabinet", 255, C::Cabinet).nullable(),
            text("VolumeLabel", 32),
            s("Source", 72, C::Property).nullable(),
        ],
        "MIME" => vec![
            s("ContentType", 64, C::Text).primary_key(),
            text("Extension_", 255).references("Extension", 1),
            guid("CLSID").nullable(),
        ],
        "ModuleDependency" => vec![
            key("ModuleID").references("ModuleSignature", 1),
            short("ModuleLanguage").primary_key(),
            key("RequiredID"),
            short("RequiredLanguage").primary_key(),
            s("RequiredVersion", 32, C::Version).nullable(),
        ],
        "ModuleExclusion" => vec![
            key("ModuleID").references("ModuleSignature", 1),
            short("ModuleLanguage").primary_key(),
            key("ExcludedID"),
            short("ExcludedLanguage").primary_key(),
            s("ExcludedMinVersion", 32, C::Version).nullable(),
            s("ExcludedMaxVersion", 32, C::Version).nullable(),
        ],
        "ModuleIgnoreTable" => vec![key("Table")],
        "ModuleSignature" => vec![
            key("ModuleID"),
            short("Language").primary_key(),
            s("Version", 32, C::Version),
        ],
        "MoveFile" => vec![
            key("FileKey"),
            component(),
            s("SourceName", 255, C::Text).nullable().localizable(),
            s("DestName", 255, C::Filename).nullable().localizable(),
            ident("SourceFolder").nullable(),
            ident("DestFolder"),
            short("Options").range(0, 1),
        ],
        "ODBCAttribute" => vec![
            key("Driver_").references("ODBCDriver", 1),
            s("Attribute", 40, C::Text).primary_key(),
            text("Value", 255),
        ],
        "ODBCDataSource" => vec![
            key("DataSource"),
            component(),
            s("Description", 255, C::Text),
            s("DriverDescription", 255, C::Text),
            short("Registration").range(0, 1),
        ],
        "ODBCDriver" => vec![
            key("Driver"),
            component(),
            s("Description", 255, C::Text),
            fk("File_", "File"),
            fk("File_Setup", "File").nullable(),
        ],
        "ODBCSourceAttribute" => vec![
            key("DataSource_").references("ODBCDataSource", 1),
            s("Attribute", 32, C::Text).primary_key(),
            text("Value", 255),
        ],
        "ODBCTranslator" => vec![
            key("Translator"),
            component(),
            s("Description", 255, C::Text),
            fk("File_", "File"),
            fk("File_Setup", "File").nullable(),
        ],
        "PatchMetadata" => vec![
            text("Company", 72).primary_key().nullable(),
            key("Property"),
            s("Value", 0, C::Text).localizable(),
        ],
        "PatchSequence" => vec![
            key("PatchFamily"),
            ident("Target").primary_key().nullable(),
            s("Sequence", 72, C::Version).nullable(),
            long("Supersede").nullable(),
        ],
        "ProgId" => vec![
            s("ProgId", 255, C::Text).primary_key(),
            text("ProgId_Parent", 255).references("ProgId", 1),
            guid("Class_").nullable().references("Class", 1),
            text("Description", 255).localizable(),
            fk("Icon_", "Icon").nullable(),
            short("IconIndex").nullable(),
        ],
        "Properties" => vec![key("Name"), s("Value", 0, C::Text)],
        "Property" => vec![key("Property"), s("Value", 0, C::Text).localizable()],
        "PublishComponent" => vec![
            guid("ComponentId").primary_key(),
            s("Qualifier", 255, C::Text).primary_key(),
            component().primary_key(),
            text("AppData", 255).localizable(),
            s("Feature_", 38, C::Identifier).references("Feature", 1),
        ],
        "RadioButton" => vec![
            key("Property"),
            short("Order").primary_key(),
            s("Value", 64, C::Formatted),
            short("X"),
            short("Y"),
            short("Width"),
            short("Height"),
            text("Text", 0).localizable(),
            text("Help", 50).localizable(),
        ],
        "RegLocator" => vec![
            key("Signature_"),
            short("Root").range(0, 3),
            s("Key", 255, C::RegPath),
            formatted("Name", 255),
            short("Type").nullable(),
        ],
        "Registry" => vec![
            key("Registry"),
            short("Root").range(-1, 3),
            s("Key", 255, C::RegPath).localizable(),
            formatted("Name", 255).localizable(),
            formatted("Value", 0).localizable(),
            component(),
        ],
        "RemoveFile" => vec![
            key("FileKey"),
            component(),
            s("FileName", 255, C::WildCardFilename).nullable().localizable(),
            ident("DirProperty"),
            short("InstallMode").range(1, 3),
        ],
        "RemoveIniFile" => vec![
            key("RemoveIniFile"),
            s("FileName", 255, C::Filename).localizable(),
            ident("DirProperty").nullable(),
            s("Section", 96, C::Formatted).localizable(),
            s("Key", 128, C::Formatted).localizable(),
            formatted("Value", 255).localizable(),
            short("Action"),
            component(),
        ],
        "RemoveRegistry" => vec![
            key("RemoveRegistry"),
            short("Root").range(-1, 3),
            s("Key", 255, C::RegPath).localizable(),
            formatted("Name", 255).localizable(),
            component(),
        ],
        "ReserveCost" => vec![
            key("ReserveKey"),
            component(),
            ident("ReserveFolder").nullable(),
            long("ReserveLocal"),
            long("ReserveSource"),
        ],
        "SelfReg" => vec![
            key("File_").references("File", 1),
            short("Cost").nullable(),
        ],
        "ServiceControl" => vec![
            key("ServiceControl"),
            s("Name", 255, C::Formatted).localizable(),
            short("Event"),
            formatted("Arguments", 255).localizable(),
            short("Wait").nullable(),
            component(),
        ],
        "ServiceInstall" => vec![
            key("ServiceInstall"),
            s("Name", 255, C::Formatted),
            formatted("DisplayName", 255).localizable(),
            long("ServiceType"),
            long("StartType"),
            long("ErrorControl"),
            formatted("LoadOrderGroup", 255),
            formatted("Dependencies", 255),
            formatted("StartName", 255),
            formatted("Password", 255),
            formatted("Arguments", 255),
            component(),
            formatted("Description", 255).localizable(),
        ],
        "Shortcut" => vec![
            key("Shortcut"),
            fk("Directory_", "Directory"),
            s("Name", 128, C::Filename).localizable(),
            component(),
            s("Target", 72, C::Shortcut),
            formatted("Arguments", 255),
            text("Description", 255).localizable(),
            short("Hotkey").nullable(),
            fk("Icon_", "Icon").nullable(),
            short("IconIndex").nullable(),
            short("ShowCmd").nullable(),
            ident("WkDir").nullable(),
            formatted("DisplayResourceDLL", 255),
            long("DisplayResourceId").nullable(),
            formatted("DescriptionResourceDLL", 255),
            long("DescriptionResourceId").nullable(),
        ],
        "Signature" => vec![
            key("Signature"),
            s("FileName", 255, C::Filename),
            text("MinVersion", 20),
            text("MaxVersion", 20),
            long("MinSize").nullable(),
            long("MaxSize").nullable(),
            long("MinDate").nullable(),
            long("MaxDate").nullable(),
            s("Languages", 255, C::Language).nullable(),
        ],
        "TargetFiles_OptionalData" => vec![
            s("Target", 13, C::Identifier)
                .primary_key()
                .references("TargetImages", 1),
            s("FTK", 255, C::Text).primary_key(),
            s("SymbolPaths", 0, C::Paths).nullable(),
            text("IgnoreOffsets", 0),
            text("IgnoreLengths", 0),
            text("RetainOffsets", 0),
        ],
        "TargetImages" => vec![
            s("Target", 13, C::Identifier).primary_key(),
            s("MsiPath", 255, C::Path),
            s("SymbolPaths", 0, C::Paths).nullable(),
            s("Upgraded", 13, C::Identifier).references("UpgradedImages", 1),
            short("Order"),
            text("ProductValidateFlags", 16),
            short("IgnoreMissingSrcFiles"),
        ],
        "TextStyle" => vec![
            key("TextStyle"),
            s("FaceName", 32, C::Text),
            short("Size"),
            long("Color").nullable(),
            short("StyleBits").nullable(),
        ],
        "TypeLib" => vec![
            guid("LibID").primary_key(),
            short("Language").primary_key(),
            component().primary_key(),
            long("Version").nullable(),
            text("Description", 128).localizable(),
            fk("Directory_", "Directory").nullable(),
            s("Feature_", 38, C::Identifier).references("Feature", 1),
            long("Cost").nullable(),
        ],
        "UIText" => vec![key("Key"), text("Text", 255).localizable()],
        "Upgrade" => vec![
            guid("UpgradeCode").primary_key(),
            text("VersionMin", 20).primary_key().nullable(),
            text("VersionMax", 20).primary_key().nullable(),
            s("Language", 255, C::Language).primary_key().nullable(),
            long("Attributes").primary_key(),
            formatted("Remove", 255),
            s("ActionProperty", 72, C::UpperCase),
        ],
        "UpgradedFiles_OptionalData" => vec![
            s("Upgraded", 13, C::Identifier)
                .primary_key()
                .references("UpgradedImages", 1),
            s("FTK", 255, C::Text).primary_key(),
            s("SymbolPaths", 0, C::Paths).nullable(),
            short("AllowIgnoreOnPatchError").nullable(),
            short("IncludeWholeFile").nullable(),
        ],
        "UpgradedFilesToIgnore" => vec![
            s("Upgraded", 13, C::Text).primary_key(),
            s("FTK", 255, C::Text).primary_key(),
        ],
        "UpgradedImages" => vec![
            s("Upgraded", 13, C::Identifier).primary_key(),
            s("MsiPath", 255, C::Path),
            s("PatchMsiPath", 255, C::Path).nullable(),
            s("SymbolPaths", 0, C::Paths).nullable(),
            s("Family", 8, C::Identifier).references("ImageFamilies", 1),
        ],
        "Verb" => vec![
            s("Extension_", 255, C::Text)
                .primary_key()
                .references("Extension", 1),
            s("Verb", 32, C::Text).primary_key(),
            short("Sequence").nullable(),
            formatted("Command", 255).localizable(),
            formatted("Argument", 255).localizable(),
        ],
        _ => return None,
    };

    Some(TableDefinition::new(name, columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_event_primary_key() {
        let def = standard_definition("ControlEvent").unwrap();
        assert_eq!(
            def.primary_keys(),
            vec!["Dialog_", "Control_", "Event", "Argument", "Condition"]
        );
    }

    #[test]
    fn test_sequence_tables_share_columns() {
        for name in SEQUENCE_TABLES {
            let def = standard_definition(name).unwrap();
            assert_eq!(def.column_index("Sequence"), Some(2));
        }
        let module = standard_definition("ModuleInstallExecuteSequence").unwrap();
        assert_eq!(module.columns[2].referenced_tables(), vec!["ModuleInstallExecuteSequence"]);
    }

    #[test]
    fn test_standard_vs_custom() {
        assert!(is_standard_table("Component"));
        assert!(is_standard_table("_Validation"));
        assert!(is_standard_table("Billboard"));
        assert!(!is_standard_table("MyCustomTable"));
        assert!(is_internal_table("MsiFileHash"));
    }

    #[test]
    fn test_foreign_keys_point_at_known_tables() {
        for name in ["Component", "File", "Registry", "Control", "Feature", "Shortcut"] {
            let def = standard_definition(name).unwrap();
            for column in &def.columns {
                for target in column.referenced_tables() {
                    assert!(standard_definition(target).is_some(), "{} -> {}", name, target);
                }
            }
        }
    }
}

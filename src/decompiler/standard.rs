//! Well-known directories and actions

/// Directories Windows Installer resolves itself
const STANDARD_DIRECTORIES: &[&str] = &[
    "AdminToolsFolder",
    "AppDataFolder",
    "CommonAppDataFolder",
    "CommonFiles64Folder",
    "CommonFilesFolder",
    "DesktopFolder",
    "FavoritesFolder",
    "FontsFolder",
    "LocalAppDataFolder",
    "MyPicturesFolder",
    "NetHoodFolder",
    "PersonalFolder",
    "PrintHoodFolder",
    "ProgramFiles64Folder",
    "ProgramFilesFolder",
    "ProgramMenuFolder",
    "RecentFolder",
    "SendToFolder",
    "StartMenuFolder",
    "StartupFolder",
    "System16Folder",
    "System64Folder",
    "SystemFolder",
    "TARGETDIR",
    "TempFolder",
    "TemplateFolder",
    "WindowsFolder",
    "WindowsVolume",
];

pub const TARGETDIR: &str = "TARGETDIR";

/// Expected DefaultDir of the TARGETDIR row
pub const SOURCE_DIR: &str = "SourceDir";

/// Action property of the upgrade row written for a major upgrade
pub const UPGRADE_DETECTED: &str = "WIX_UPGRADE_DETECTED";

/// Action property of the downgrade-detection row written for a major upgrade
pub const DOWNGRADE_DETECTED: &str = "WIX_DOWNGRADE_DETECTED";

/// Launch condition carrying the downgrade error message
pub const DOWNGRADE_CONDITION: &str = "NOT WIX_DOWNGRADE_DETECTED";

/// Parent signature of a DrLocator that searches the compliance drive
pub const CCP_DRIVE: &str = "CCP_DRIVE";

pub fn is_standard_directory(id: &str) -> bool {
    STANDARD_DIRECTORIES.binary_search(&id).is_ok()
}

/// Every action Windows Installer implements
const STANDARD_ACTIONS: &[&str] = &[
    "AllocateRegistrySpace",
    "AppSearch",
    "BindImage",
    "CCPSearch",
    "CostFinalize",
    "CostInitialize",
    "CreateFolders",
    "CreateShortcuts",
    "DeleteServices",
    "DisableRollback",
    "DuplicateFiles",
    "ExecuteAction",
    "FileCost",
    "FindRelatedProducts",
    "ForceReboot",
    "InstallAdminPackage",
    "InstallExecute",
    "InstallExecuteAgain",
    "InstallFiles",
    "InstallFinalize",
    "InstallInitialize",
    "InstallODBC",
    "InstallSFPCatalogFile",
    "InstallServices",
    "InstallValidate",
    "IsolateComponents",
    "LaunchConditions",
    "MigrateFeatureStates",
    "MoveFiles",
    "MsiConfigureServices",
    "MsiPublishAssemblies",
    "MsiUnpublishAssemblies",
    "PatchFiles",
    "ProcessComponents",
    "PublishComponents",
    "PublishFeatures",
    "PublishProduct",
    "RMCCPSearch",
    "RegisterClassInfo",
    "RegisterComPlus",
    "RegisterExtensionInfo",
    "RegisterFonts",
    "RegisterMIMEInfo",
    "RegisterProduct",
    "RegisterProgIdInfo",
    "RegisterTypeLibraries",
    "RegisterUser",
    "RemoveDuplicateFiles",
    "RemoveEnvironmentStrings",
    "RemoveExistingProducts",
    "RemoveFiles",
    "RemoveFolders",
    "RemoveIniValues",
    "RemoveODBC",
    "RemoveRegistryValues",
    "RemoveShortcuts",
    "ResolveSource",
    "ScheduleReboot",
    "SelfRegModules",
    "SelfUnregModules",
    "SetODBCFolders",
    "StartServices",
    "StopServices",
    "UnpublishComponents",
    "UnpublishFeatures",
    "UnregisterClassInfo",
    "UnregisterComPlus",
    "UnregisterExtensionInfo",
    "UnregisterFonts",
    "UnregisterMIMEInfo",
    "UnregisterProgIdInfo",
    "UnregisterTypeLibraries",
    "ValidateProductID",
    "WriteEnvironmentStrings",
    "WriteIniValues",
    "WriteRegistryValues",
];

pub fn is_standard_action(action: &str) -> bool {
    STANDARD_ACTIONS.binary_search(&action).is_ok()
}

/// Default scheduling of a standard action within one sequence table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAction {
    pub sequence: i64,
    pub condition: Option<&'static str>,
}

const fn at(sequence: i64) -> DefaultAction {
    DefaultAction {
        sequence,
        condition: None,
    }
}

const INSTALL_EXECUTE: &[(&str, DefaultAction)] = &[
    ("FindRelatedProducts", at(25)),
    ("AppSearch", at(50)),
    ("LaunchConditions", at(100)),
    ("ValidateProductID", at(700)),
    ("CostInitialize", at(800)),
    ("FileCost", at(900)),
    ("CostFinalize", at(1000)),
    ("MigrateFeatureStates", at(1200)),
    ("InstallValidate", at(1400)),
    ("InstallInitialize", at(1500)),
    ("AllocateRegistrySpace", at(1550)),
    ("ProcessComponents", at(1600)),
    ("MsiUnpublishAssemblies", at(1750)),
    ("UnpublishFeatures", at(1800)),
    ("StopServices", at(1900)),
    ("DeleteServices", at(2000)),
    ("UnregisterComPlus", at(2100)),
    ("SelfUnregModules", at(2200)),
    ("UnregisterTypeLibraries", at(2300)),
    ("RemoveODBC", at(2400)),
    ("UnregisterFonts", at(2500)),
    ("RemoveRegistryValues", at(2600)),
    ("UnregisterClassInfo", at(2700)),
    ("UnregisterExtensionInfo", at(2800)),
    ("UnregisterProgIdInfo", at(2900)),
    ("UnregisterMIMEInfo", at(3000)),
    ("RemoveIniValues", at(3100)),
    ("RemoveShortcuts", at(3200)),
    ("RemoveEnvironmentStrings", at(3300)),
    ("RemoveDuplicateFiles", at(3400)),
    ("RemoveFiles", at(3500)),
    ("RemoveFolders", at(3600)),
    ("CreateFolders", at(3700)),
    ("MoveFiles", at(3800)),
    ("InstallFiles", at(4000)),
    ("PatchFiles", at(4090)),
    ("DuplicateFiles", at(4210)),
    ("BindImage", at(4300)),
    ("CreateShortcuts", at(4500)),
    ("RegisterClassInfo", at(4600)),
    ("RegisterExtensionInfo", at(4700)),
    ("RegisterProgIdInfo", at(4800)),
    ("RegisterMIMEInfo", at(4900)),
    ("WriteRegistryValues", at(5000)),
    ("WriteIniValues", at(5100)),
    ("WriteEnvironmentStrings", at(5200)),
    ("RegisterFonts", at(5300)),
    ("InstallODBC", at(5400)),
    ("RegisterTypeLibraries", at(5500)),
    ("SelfRegModules", at(5600)),
    ("RegisterComPlus", at(5700)),
    ("InstallServices", at(5800)),
    ("StartServices", at(5900)),
    ("RegisterUser", at(6000)),
    ("RegisterProduct", at(6100)),
    ("PublishComponents", at(6200)),
    ("MsiPublishAssemblies", at(6250)),
    ("PublishFeatures", at(6300)),
    ("PublishProduct", at(6400)),
    ("InstallFinalize", at(6600)),
];

const INSTALL_UI: &[(&str, DefaultAction)] = &[
    ("FindRelatedProducts", at(25)),
    ("AppSearch", at(50)),
    ("LaunchConditions", at(100)),
    ("ValidateProductID", at(700)),
    ("CostInitialize", at(800)),
    ("FileCost", at(900)),
    ("CostFinalize", at(1000)),
    ("MigrateFeatureStates", at(1200)),
    ("ExecuteAction", at(1300)),
];

const ADMIN_EXECUTE: &[(&str, DefaultAction)] = &[
    ("CostInitialize", at(800)),
    ("FileCost", at(900)),
    ("CostFinalize", at(1000)),
    ("InstallValidate", at(1400)),
    ("InstallInitialize", at(1500)),
    ("InstallAdminPackage", at(3900)),
    ("InstallFiles", at(4000)),
    ("InstallFinalize", at(6600)),
];

const ADMIN_UI: &[(&str, DefaultAction)] = &[
    ("CostInitialize", at(800)),
    ("FileCost", at(900)),
    ("CostFinalize", at(1000)),
    ("ExecuteAction", at(1300)),
];

const ADVT_EXECUTE: &[(&str, DefaultAction)] = &[
    ("CostInitialize", at(800)),
    ("CostFinalize", at(1000)),
    ("InstallValidate", at(1400)),
    ("InstallInitialize", at(1500)),
    ("CreateShortcuts", at(4500)),
    ("RegisterClassInfo", at(4600)),
    ("RegisterExtensionInfo", at(4700)),
    ("RegisterProgIdInfo", at(4800)),
    ("RegisterMIMEInfo", at(4900)),
    ("PublishComponents", at(6200)),
    ("MsiPublishAssemblies", at(6250)),
    ("PublishFeatures", at(6300)),
    ("PublishProduct", at(6400)),
    ("InstallFinalize", at(6600)),
];

/// Default scheduling of `action` in `table`, if it has one there.
///
/// Module sequence tables share the defaults of their package counterparts.
pub fn default_action(table: &str, action: &str) -> Option<DefaultAction> {
    let table = table.strip_prefix("Module").unwrap_or(table);
    let defaults = match table {
        "InstallExecuteSequence" => INSTALL_EXECUTE,
        "InstallUISequence" => INSTALL_UI,
        "AdminExecuteSequence" => ADMIN_EXECUTE,
        "AdminUISequence" => ADMIN_UI,
        "AdvtExecuteSequence" => ADVT_EXECUTE,
        _ => return None,
    };
    defaults
        .iter()
        .find(|(name, _)| *name == action)
        .map(|(_, default)| *default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_sorted() {
        assert!(STANDARD_DIRECTORIES.windows(2).all(|w| w[0] < w[1]));
        assert!(STANDARD_ACTIONS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_defaults_are_standard_actions() {
        for table in [INSTALL_EXECUTE, INSTALL_UI, ADMIN_EXECUTE, ADMIN_UI, ADVT_EXECUTE] {
            for (name, _) in table {
                assert!(is_standard_action(name), "{}", name);
            }
            assert!(table.windows(2).all(|w| w[0].1.sequence < w[1].1.sequence));
        }
    }

    #[test]
    fn test_default_action_lookup() {
        assert_eq!(default_action("InstallExecuteSequence", "InstallValidate").map(|d| d.sequence), Some(1400));
        assert_eq!(default_action("ModuleInstallExecuteSequence", "InstallFiles").map(|d| d.sequence), Some(4000));
        assert_eq!(default_action("InstallUISequence", "InstallFiles"), None);
        assert!(is_standard_directory("ProgramFilesFolder"));
        assert!(!is_standard_directory("INSTALLFOLDER"));
    }
}

//! Bit layouts of the integer attribute columns

use bitflags::bitflags;

bitflags! {
    /// Component.Attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ComponentAttributes: u32 {
        const SOURCE_ONLY = 0x0001;
        const OPTIONAL = 0x0002;
        const REGISTRY_KEY_PATH = 0x0004;
        const SHARED_DLL_REF_COUNT = 0x0008;
        const PERMANENT = 0x0010;
        const ODBC_DATA_SOURCE = 0x0020;
        const TRANSITIVE = 0x0040;
        const NEVER_OVERWRITE = 0x0080;
        const BITNESS_64 = 0x0100;
        const DISABLE_REGISTRY_REFLECTION = 0x0200;
        const UNINSTALL_ON_SUPERSEDENCE = 0x0400;
        const SHARED = 0x0800;
    }
}

bitflags! {
    /// File.Attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileAttributes: u32 {
        const READ_ONLY = 0x0001;
        const HIDDEN = 0x0002;
        const SYSTEM = 0x0004;
        const VITAL = 0x0200;
        const CHECKSUM = 0x0400;
        const PATCH_ADDED = 0x1000;
        const NONCOMPRESSED = 0x2000;
        const COMPRESSED = 0x4000;
    }
}

bitflags! {
    /// Feature.Attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FeatureAttributes: u32 {
        const FAVOR_SOURCE = 0x0001;
        const FOLLOW_PARENT = 0x0002;
        const FAVOR_ADVERTISE = 0x0004;
        const DISALLOW_ADVERTISE = 0x0008;
        const UI_DISALLOW_ABSENT = 0x0010;
        const NO_UNSUPPORTED_ADVERTISE = 0x0020;
    }
}

bitflags! {
    /// Upgrade.Attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UpgradeAttributes: u32 {
        const MIGRATE_FEATURES = 0x0001;
        const ONLY_DETECT = 0x0002;
        const IGNORE_REMOVE_FAILURE = 0x0004;
        const VERSION_MIN_INCLUSIVE = 0x0100;
        const VERSION_MAX_INCLUSIVE = 0x0200;
        const LANGUAGES_EXCLUSIVE = 0x0400;
    }
}

bitflags! {
    /// Dialog.Attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DialogAttributes: u32 {
        const VISIBLE = 0x0001;
        const MODAL = 0x0002;
        const MINIMIZE = 0x0004;
        const SYS_MODAL = 0x0008;
        const KEEP_MODELESS = 0x0010;
        const TRACK_DISK_SPACE = 0x0020;
        const USE_CUSTOM_PALETTE = 0x0040;
        const RTL_RO = 0x0080;
        const RIGHT_ALIGNED = 0x0100;
        const LEFT_SCROLL = 0x0200;
        const ERROR = 0x10000;
    }
}

bitflags! {
    /// Low bits of Control.Attributes shared by every control type
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlAttributes: u32 {
        const VISIBLE = 0x0001;
        const ENABLED = 0x0002;
        const SUNKEN = 0x0004;
        const INDIRECT = 0x0008;
        const INTEGER = 0x0010;
        const RTL_RO = 0x0020;
        const RIGHT_ALIGNED = 0x0040;
        const LEFT_SCROLL = 0x0080;
    }
}

bitflags! {
    /// TextStyle.StyleBits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TextStyleBits: u32 {
        const BOLD = 0x1;
        const ITALIC = 0x2;
        const UNDERLINE = 0x4;
        const STRIKE = 0x8;
    }
}

bitflags! {
    /// Option bits of CustomAction.Type above the execute field
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CustomActionOptions: u32 {
        const NO_IMPERSONATE = 0x0800;
        const BITNESS_64 = 0x1000;
        const HIDE_TARGET = 0x2000;
        const TS_AWARE = 0x4000;
        const PATCH_UNINSTALL = 0x8000;
    }
}

bitflags! {
    /// ServiceControl.Event
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ServiceEvents: u32 {
        const INSTALL_START = 0x01;
        const INSTALL_STOP = 0x02;
        const INSTALL_DELETE = 0x08;
        const UNINSTALL_START = 0x10;
        const UNINSTALL_STOP = 0x20;
        const UNINSTALL_DELETE = 0x80;
    }
}

/// Bits of `value` outside the flags a type knows about
pub fn unknown_bits(value: i64, known: u32) -> i64 {
    value & !(known as i64)
}

/// Named bits of a column whose meaning depends on another column
pub type BitTable = &'static [(u32, &'static str)];

/// Control.Attributes high bits, per control type
pub fn control_type_bits(control_type: &str) -> (BitTable, bool) {
    const TEXT: BitTable = &[
        (0x10000, "Transparent"),
        (0x20000, "NoPrefix"),
        (0x40000, "NoWrap"),
        (0x80000, "FormatSize"),
        (0x100000, "UserLanguage"),
    ];
    const EDIT: BitTable = &[(0x10000, "Multiline"), (0x200000, "Password")];
    const PROGRESS: BitTable = &[(0x10000, "ProgressBlocks")];
    const VOLUME: BitTable = &[
        (0x10000, "Removable"),
        (0x20000, "Fixed"),
        (0x40000, "Remote"),
        (0x80000, "CDROM"),
        (0x100000, "RAMDisk"),
        (0x200000, "Floppy"),
        (0x400000, "ShowRollbackCost"),
    ];
    const LIST: BitTable = &[(0x10000, "Sorted"), (0x20000, "ComboList")];
    const BUTTON: BitTable = &[
        (0x20000, "PushLike"),
        (0x40000, "Bitmap"),
        (0x80000, "Icon"),
        (0x100000, "FixedSize"),
        (0x800000, "ElevationShield"),
        (0x1000000, "HasBorder"),
    ];
    const IMAGE: BitTable = &[(0x10000, "Image"), (0x100000, "FixedSize")];
    const NONE: BitTable = &[];

    match control_type {
        "Text" => (TEXT, false),
        "Edit" | "MaskedEdit" | "PathEdit" => (EDIT, false),
        "ProgressBar" => (PROGRESS, false),
        "VolumeSelectCombo" | "VolumeCostList" | "DirectoryCombo" => (VOLUME, false),
        "ListBox" | "ComboBox" | "ListView" | "DirectoryList" => (LIST, false),
        "PushButton" | "CheckBox" | "RadioButtonGroup" => (BUTTON, true),
        "Bitmap" | "Icon" => (IMAGE, true),
        _ => (NONE, false),
    }
}

/// Mask of the icon size field shared by button and image controls
pub const ICON_SIZE_MASK: u32 = 0x600000;

/// IconSize attribute for the icon size field
pub fn icon_size(bits: u32) -> Option<&'static str> {
    match bits & ICON_SIZE_MASK {
        0x200000 => Some("16"),
        0x400000 => Some("32"),
        0x600000 => Some("48"),
        _ => None,
    }
}

/// Right bits of a LockPermissions row, per locked object
pub fn permission_bits(table: &str) -> Option<BitTable> {
    const FOLDER: BitTable = &[
        (0x1, "Read"),
        (0x2, "CreateFile"),
        (0x4, "CreateChild"),
        (0x8, "ReadExtendedAttributes"),
        (0x10, "WriteExtendedAttributes"),
        (0x20, "Traverse"),
        (0x40, "DeleteChild"),
        (0x80, "ReadAttributes"),
        (0x100, "WriteAttributes"),
    ];
    const FILE: BitTable = &[
        (0x1, "Read"),
        (0x2, "Write"),
        (0x4, "Append"),
        (0x8, "ReadExtendedAttributes"),
        (0x10, "WriteExtendedAttributes"),
        (0x20, "Execute"),
        (0x80, "ReadAttributes"),
        (0x100, "WriteAttributes"),
    ];
    const REGISTRY: BitTable = &[
        (0x1, "Read"),
        (0x2, "Write"),
        (0x4, "CreateSubkeys"),
        (0x8, "EnumerateSubkeys"),
        (0x10, "Notify"),
        (0x20, "CreateLink"),
    ];
    const SERVICE: BitTable = &[
        (0x1, "ServiceQueryConfig"),
        (0x2, "ServiceChangeConfig"),
        (0x4, "ServiceQueryStatus"),
        (0x8, "ServiceEnumerateDependents"),
        (0x10, "ServiceStart"),
        (0x20, "ServiceStop"),
        (0x40, "ServicePauseContinue"),
        (0x80, "ServiceInterrogate"),
        (0x100, "ServiceUserDefinedControl"),
    ];

    match table {
        "CreateFolder" => Some(FOLDER),
        "File" => Some(FILE),
        "Registry" => Some(REGISTRY),
        "ServiceInstall" => Some(SERVICE),
        _ => None,
    }
}

/// Standard and generic rights valid for every locked object
pub const COMMON_PERMISSION_BITS: BitTable = &[
    (0x10000, "Delete"),
    (0x20000, "ReadPermission"),
    (0x40000, "ChangePermission"),
    (0x80000, "TakeOwnership"),
    (0x100000, "Synchronize"),
    (0x10000000, "GenericAll"),
    (0x20000000, "GenericExecute"),
    (0x40000000, "GenericWrite"),
    (0x80000000, "GenericRead"),
];

/// Union of the bits in a table
pub fn table_mask(table: BitTable) -> u32 {
    table.iter().fold(0, |mask, (bit, _)| mask | bit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_bits() {
        let known = ComponentAttributes::all().bits();
        assert_eq!(unknown_bits(0x0810, known), 0);
        assert_eq!(unknown_bits(0x1010, known), 0x1000);
    }

    #[test]
    fn test_control_bit_tables_do_not_overlap_icon_size() {
        for control in ["PushButton", "CheckBox", "RadioButtonGroup", "Bitmap", "Icon"] {
            let (bits, has_icon_size) = control_type_bits(control);
            assert!(has_icon_size);
            assert_eq!(table_mask(bits) & ICON_SIZE_MASK, 0, "{}", control);
        }
    }

    #[test]
    fn test_icon_size() {
        assert_eq!(icon_size(0x200000), Some("16"));
        assert_eq!(icon_size(0x600000 | 0x1), Some("48"));
        assert_eq!(icon_size(0x1), None);
    }

    #[test]
    fn test_permission_tables() {
        assert!(permission_bits("File").is_some());
        assert!(permission_bits("Shortcut").is_none());
        assert_eq!(table_mask(COMMON_PERMISSION_BITS) & 0x1ff, 0);
    }
}

use std::collections::HashMap;

use crate::error::SolgError;
use crate::id::Id;

/// Solution folder project type
pub const SOLUTION_FOLDER: Id = Id::from_u128(0x2150_E333_8FDC_42A3_9474_1A39_56D4_6DE8);
/// Legacy (non SDK-style) C# project type. Default for unknown legacy projects.
pub const LEGACY_CSHARP: Id = Id::from_u128(0xFAE0_4EC0_301F_11D3_BF4B_00C0_4F79_EFBC);
/// SDK-style C# project type. Default for unknown SDK-style projects.
pub const SDK_CSHARP: Id = Id::from_u128(0x9A19_103F_16F7_4668_BE54_9A1E_7A4F_7556);
/// Service Fabric application. The only category deployable by default.
pub const SERVICE_FABRIC: Id = Id::from_u128(0xA07B_5EB6_E848_4116_A8D0_A826_331D_98C6);

static LEGACY: phf::Map<&'static str, Id> = phf::phf_map! {
    ".ccproj" => Id::from_u128(0xCC5F_D16D_436D_48AD_A40C_5A42_4C6E_3E79),
    ".csproj" => LEGACY_CSHARP,
    ".dcproj" => Id::from_u128(0xE533_39B2_1760_4266_BCC7_CA92_3CBC_F16C),
    ".esproj" => Id::from_u128(0x54A9_0642_561A_4BB1_A94E_469A_DEE6_0C69),
    ".fsproj" => Id::from_u128(0xF2A7_1F9B_5D33_465A_A702_920D_7727_9786),
    ".njsproj" => Id::from_u128(0x9092_AA53_FB77_4645_B42D_1CCC_A6BD_08BD),
    ".nuproj" => Id::from_u128(0xFF28_6327_C783_4F7A_AB73_9BCB_AD0D_4460),
    ".pyproj" => Id::from_u128(0x8888_88A0_9F3D_457C_B088_3A50_42F7_5D52),
    ".sfproj" => SERVICE_FABRIC,
    ".shproj" => Id::from_u128(0xD954_291E_2A0B_460D_934E_DC6B_0785_DB48),
    ".sqlproj" => Id::from_u128(0x00D1_A9C2_B5F0_4AF3_8072_F6C6_2B43_3612),
    ".vbproj" => Id::from_u128(0xF184_B08F_C81C_45F6_A57F_5ABD_9991_F28F),
    ".vcxproj" => Id::from_u128(0x8BC9_CEB8_8B4A_11D0_8D11_00A0_C91B_C942),
    ".wapproj" => Id::from_u128(0xC716_7F0D_BC9F_4E6E_AFE1_012C_56B4_8DB5),
    ".wixproj" => Id::from_u128(0x930C_7802_8A8C_48F9_8165_6886_3BCC_D9DD),
};

static SDK: phf::Map<&'static str, Id> = phf::phf_map! {
    ".csproj" => SDK_CSHARP,
    ".fsproj" => Id::from_u128(0x6EC3_EE1D_3C4E_46DD_8F32_0CC8_E756_5705),
    ".vbproj" => Id::from_u128(0x778D_AE3C_4631_46EA_AA77_85C1_3144_64D9),
};

/// Project type (category) resolution table.
///
/// Built-in tables are immutable statics, custom per-extension overrides are
/// owned by the value so that every generation run carries its own.
#[derive(Debug, Clone, Default)]
pub struct Categories {
    overrides: HashMap<String, Id>,
}

impl Categories {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers custom project type for the extension specified (`.proj` or `proj`)
    pub fn add_override(&mut self, extension: &str, category: Id) {
        self.overrides.insert(normalize_extension(extension), category);
    }

    /// Same as [`Categories::add_override`] but takes raw identifier text
    pub fn add_raw_override(&mut self, extension: &str, category: &str) -> Result<(), SolgError> {
        let id = Id::parse(category).ok_or_else(|| SolgError::InvalidCategory {
            extension: extension.to_owned(),
            value: category.to_owned(),
        })?;
        self.add_override(extension, id);
        Ok(())
    }

    /// Resolves category: custom override, then well-known table
    /// (SDK-style or legacy), then the default of the project style.
    #[must_use]
    pub fn resolve(&self, extension: &str, is_sdk_style: bool) -> Id {
        let key = normalize_extension(extension);
        if let Some(id) = self.overrides.get(&key) {
            return *id;
        }
        let known = if is_sdk_style {
            SDK.get(key.as_str()).or_else(|| LEGACY.get(key.as_str()))
        } else {
            LEGACY.get(key.as_str())
        };
        match known {
            Some(id) => *id,
            None if is_sdk_style => SDK_CSHARP,
            None => LEGACY_CSHARP,
        }
    }
}

/// Whether the extension belongs to a project type this crate knows about
#[must_use]
pub fn is_known_extension(extension: &str) -> bool {
    LEGACY.contains_key(normalize_extension(extension).as_str())
}

/// All known project file extensions without leading dot
pub fn known_extensions() -> impl Iterator<Item = &'static str> {
    LEGACY.keys().map(|k: &&'static str| (*k).trim_start_matches('.'))
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.trim().to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

use std::fmt;
use std::str::FromStr;

/// Kind of asset a report line asks for.
///
/// The kind decides both the folder on the origin and the local folder under
/// the destination root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Rom,
    Bios,
    Chd,
    Sample,
}

/// All kinds, in the order they are listed to users.
const ALL_KINDS: &[AssetKind] = &[
    AssetKind::Rom,
    AssetKind::Bios,
    AssetKind::Chd,
    AssetKind::Sample,
];

impl AssetKind {
    /// Short name used for CLI filters and display.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Rom => "rom",
            Self::Bios => "bios",
            Self::Chd => "chd",
            Self::Sample => "sample",
        }
    }

    /// Top-level folder for this kind, both on the origin and locally.
    ///
    /// CHDs are further nested per set; see [`Obligation::remote_path`].
    pub fn folder(&self) -> &'static str {
        match self {
            Self::Rom => "currentroms",
            Self::Bios => "bios",
            Self::Chd => "CHDs",
            Self::Sample => "samples",
        }
    }

    pub fn all() -> &'static [AssetKind] {
        ALL_KINDS
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Error returned when a string does not name an [`AssetKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown asset kind: {0} (expected rom, bios, chd or sample)")]
pub struct AssetKindParseError(pub String);

impl FromStr for AssetKind {
    type Err = AssetKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rom" | "roms" => Ok(Self::Rom),
            "bios" => Ok(Self::Bios),
            "chd" | "chds" | "disk" | "disks" => Ok(Self::Chd),
            "sample" | "samples" => Ok(Self::Sample),
            _ => Err(AssetKindParseError(s.to_string())),
        }
    }
}

/// One download requirement parsed from an audit report.
///
/// Obligations are immutable once built. Their position in the parsed list
/// is the download order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Obligation {
    set_name: String,
    file_name: String,
    kind: AssetKind,
}

/// De-duplication identity of an obligation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// One archive per set and kind (ROMs, BIOS, samples).
    Set(String, AssetKind),
    /// One disk image per file name.
    Disk(String),
}

impl Obligation {
    pub fn new(set_name: impl Into<String>, file_name: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            set_name: set_name.into(),
            file_name: file_name.into(),
            kind,
        }
    }

    /// The set's ROM archive, `<set>.zip`.
    pub fn rom_archive(set_name: &str) -> Self {
        Self::new(set_name, format!("{set_name}.zip"), AssetKind::Rom)
    }

    /// The set's sample archive, `<set>.zip`.
    pub fn sample_archive(set_name: &str) -> Self {
        Self::new(set_name, format!("{set_name}.zip"), AssetKind::Sample)
    }

    /// A disk image owned by a set.
    pub fn disk(set_name: &str, file_name: impl Into<String>) -> Self {
        Self::new(set_name, file_name, AssetKind::Chd)
    }

    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn dedup_key(&self) -> DedupKey {
        match self.kind {
            AssetKind::Chd => DedupKey::Disk(self.file_name.clone()),
            kind => DedupKey::Set(self.set_name.clone(), kind),
        }
    }

    /// URL path segments of this item relative to the origin root.
    pub fn remote_segments(&self) -> Vec<&str> {
        let mut segments = self.local_folder();
        segments.push(&self.file_name);
        segments
    }

    /// Path of this item relative to the origin root, e.g. `CHDs/kinst/kinst.chd`.
    pub fn remote_path(&self) -> String {
        self.remote_segments().join("/")
    }

    /// Folder segments of this item relative to the destination root.
    pub fn local_folder(&self) -> Vec<&str> {
        match self.kind {
            AssetKind::Chd => vec![self.kind.folder(), &self.set_name],
            kind => vec![kind.folder()],
        }
    }
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, set {})", self.file_name, self.kind, self.set_name)
    }
}

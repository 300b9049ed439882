//! Operating-system detection.
use std::fmt;

/// Detected operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux distributions.
    Linux,
    /// Microsoft Windows.
    Windows,
    /// macOS and other Darwin derivatives.
    Darwin,
    /// FreeBSD, OpenBSD, NetBSD, DragonFly.
    Bsd,
    /// Solaris and illumos.
    Solaris,
    /// Anything else.
    Unknown,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "Linux"),
            Self::Windows => write!(f, "Windows"),
            Self::Darwin => write!(f, "Darwin"),
            Self::Bsd => write!(f, "BSD"),
            Self::Solaris => write!(f, "Solaris"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

impl Os {
    /// Map a `std::env::consts::OS` identifier to its family.
    #[must_use]
    pub fn from_target(os: &str) -> Self {
        match os {
            "linux" | "android" => Self::Linux,
            "windows" => Self::Windows,
            "macos" | "ios" => Self::Darwin,
            "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Self::Bsd,
            "solaris" | "illumos" => Self::Solaris,
            _ => Self::Unknown,
        }
    }

    /// Case-insensitive comparison against a configured family name.
    #[must_use]
    pub fn matches(self, name: &str) -> bool {
        self.to_string().eq_ignore_ascii_case(name.trim())
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, Copy)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            os: Os::from_target(std::env::consts::OS),
        }
    }

    /// Create a platform with an explicit OS family.
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    /// Return `true` when running on Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Whether a failed symlink may fall back to junctions, hard links or copies.
    ///
    /// Only Windows restricts symlink creation to privileged users.
    #[must_use]
    pub fn supports_link_fallback(&self) -> bool {
        self.is_windows()
    }
}

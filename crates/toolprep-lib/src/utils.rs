use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Host architectures vendors publish Linux builds for.
#[derive(Clone, Copy, Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    I386,
    Amd64,
}

impl Architecture {
    pub const ALL: [Architecture; 2] = [Architecture::I386, Architecture::Amd64];

    /// Architecture of the running host, in Debian naming.
    pub fn current() -> Option<Self> {
        Self::from_machine(std::env::consts::ARCH)
    }

    /// Map a machine name (`uname -m` / Rust target arch) to an architecture.
    pub fn from_machine(machine: &str) -> Option<Self> {
        match machine {
            "x86_64" | "amd64" => Some(Self::Amd64),
            "x86" | "i386" | "i586" | "i686" => Some(Self::I386),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I386 => "i386",
            Self::Amd64 => "amd64",
        }
    }

    pub fn bits(&self) -> &'static str {
        match self {
            Self::I386 => "32",
            Self::Amd64 => "64",
        }
    }
}

impl Display for Architecture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_machine(s).ok_or_else(|| format!("unsupported architecture: {s}"))
    }
}

pub fn arch_matches(supported: &[Architecture], architecture: Architecture) -> bool {
    supported.contains(&architecture)
}

/// Per-vendor spelling of an architecture inside file names.
#[derive(Clone, Copy, Debug)]
pub struct ArchNames {
    pub i386: &'static str,
    pub amd64: &'static str,
}

impl ArchNames {
    pub const fn new(i386: &'static str, amd64: &'static str) -> Self {
        Self { i386, amd64 }
    }

    pub fn get(&self, architecture: Architecture) -> &'static str {
        match architecture {
            Architecture::I386 => self.i386,
            Architecture::Amd64 => self.amd64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_matches_single_architecture() {
        assert!(arch_matches(&[Architecture::Amd64], Architecture::Amd64));
        assert!(!arch_matches(&[Architecture::Amd64], Architecture::I386));
    }

    #[test]
    fn test_arch_matches_with_multiple_architectures() {
        let supported = [Architecture::I386, Architecture::Amd64];

        assert!(arch_matches(&supported, Architecture::Amd64));
        assert!(arch_matches(&supported, Architecture::I386));
    }

    #[test]
    fn test_arch_matches_with_no_architecture() {
        assert!(!arch_matches(&[], Architecture::Amd64));
    }

    #[test]
    fn test_machine_names() {
        assert_eq!(Architecture::from_machine("x86_64"), Some(Architecture::Amd64));
        assert_eq!(Architecture::from_machine("i686"), Some(Architecture::I386));
        assert_eq!(Architecture::from_machine("aarch64"), None);
        assert_eq!("amd64".parse::<Architecture>(), Ok(Architecture::Amd64));
        assert!("arm64".parse::<Architecture>().is_err());
    }

    #[test]
    fn test_vendor_names() {
        let names = ArchNames::new("ia32", "x64");
        assert_eq!(names.get(Architecture::I386), "ia32");
        assert_eq!(names.get(Architecture::Amd64), "x64");
        assert_eq!(Architecture::Amd64.to_string(), "amd64");
        assert_eq!(Architecture::I386.bits(), "32");
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating systems a module can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Os {
  Android,
  Linux,
  Darwin,
  Windows,
}

impl Os {
  /// Every supported OS, in declaration order
  pub const ALL: [Os; 4] = [Self::Android, Self::Linux, Self::Darwin, Self::Windows];

  /// Detect the operating system of the running machine
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::Darwin),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the identifier used in `target: { ... }` conditions and variation keys
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Android => "android",
      Self::Linux => "linux",
      Self::Darwin => "darwin",
      Self::Windows => "windows",
    }
  }

  /// Whether modules built for this OS run on the build machine
  pub fn is_host(&self) -> bool {
    !matches!(self, Self::Android)
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Os {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|os| os.as_str() == s)
      .ok_or_else(|| format!("unknown operating system \"{}\"", s))
  }
}

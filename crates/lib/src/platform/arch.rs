use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CPU architectures a module can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
  Arm,
  Arm64,
  X86,
  #[serde(rename = "x86_64")]
  X86_64,
  Riscv64,
}

impl Arch {
  /// Every supported architecture, in declaration order
  pub const ALL: [Arch; 5] = [Self::Arm, Self::Arm64, Self::X86, Self::X86_64, Self::Riscv64];

  /// Detect the architecture of the running machine
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "arm" => Some(Self::Arm),
      "aarch64" => Some(Self::Arm64),
      "x86" => Some(Self::X86),
      "x86_64" => Some(Self::X86_64),
      "riscv64" => Some(Self::Riscv64),
      _ => None,
    }
  }

  /// Returns the identifier used in `arch: { ... }` conditions and variation keys
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Arm => "arm",
      Self::Arm64 => "arm64",
      Self::X86 => "x86",
      Self::X86_64 => "x86_64",
      Self::Riscv64 => "riscv64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Arch {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|arch| arch.as_str() == s)
      .ok_or_else(|| format!("unknown architecture \"{}\"", s))
  }
}

pub mod arch;
pub mod os;

pub use arch::Arch;
pub use os::Os;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A build target combining OS and architecture (e.g., "linux-x86_64")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
  pub os: Os,
  pub arch: Arch,
}

impl Target {
  /// Create a new target
  pub fn new(os: Os, arch: Arch) -> Self {
    Self { os, arch }
  }

  /// Detect the build machine's target
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      os: Os::current()?,
      arch: Arch::current()?,
    })
  }

  /// Returns the target string (e.g., "linux-x86_64")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.os, self.arch)
  }
}

impl Default for Target {
  fn default() -> Self {
    Self::current().unwrap_or(Self::new(Os::Linux, Arch::X86_64))
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

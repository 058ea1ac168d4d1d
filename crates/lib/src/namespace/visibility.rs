//! Visibility rules.
//!
//! Rules are written as labels:
//! - `//visibility:public`, `//visibility:private`, `//visibility:legacy_public`
//! - `//visibility:override`, only as the first label
//! - `//pkg:__pkg__` / `//pkg:__subpackages__`, or `:__pkg__` /
//!   `:__subpackages__` for the declaring package
//!
//! `public`, `private` and `legacy_public` stand alone: they cannot be
//! combined with other labels except a leading `override`.

use std::fmt;

use thiserror::Error;

/// A parsed visibility rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VisibilityRule {
  Public,
  Private,
  /// Discards inherited rules; carries no permission of its own.
  Override,
  /// The implicit rule for modules with no visibility anywhere.
  LegacyPublic,
  /// Exactly this package.
  Package(String),
  /// This package and everything below it.
  Subpackages(String),
}

impl VisibilityRule {
  fn is_exclusive(&self) -> bool {
    matches!(
      self,
      VisibilityRule::Public | VisibilityRule::Private | VisibilityRule::LegacyPublic
    )
  }

  fn parse(package: &str, label: &str) -> Result<Self, VisibilityRuleError> {
    let unknown = || VisibilityRuleError::Unknown {
      label: label.to_string(),
    };

    if let Some(special) = label.strip_prefix("//visibility:") {
      return match special {
        "public" => Ok(VisibilityRule::Public),
        "private" => Ok(VisibilityRule::Private),
        "override" => Ok(VisibilityRule::Override),
        "legacy_public" => Ok(VisibilityRule::LegacyPublic),
        _ => Err(unknown()),
      };
    }

    let (scope, target) = if let Some(rest) = label.strip_prefix("//") {
      rest.split_once(':').ok_or_else(unknown)?
    } else if let Some(target) = label.strip_prefix(':') {
      (package, target)
    } else {
      return Err(unknown());
    };

    match target {
      "__pkg__" => Ok(VisibilityRule::Package(scope.to_string())),
      "__subpackages__" => Ok(VisibilityRule::Subpackages(scope.to_string())),
      _ => Err(unknown()),
    }
  }
}

impl fmt::Display for VisibilityRule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VisibilityRule::Public => f.write_str("//visibility:public"),
      VisibilityRule::Private => f.write_str("//visibility:private"),
      VisibilityRule::Override => f.write_str("//visibility:override"),
      VisibilityRule::LegacyPublic => f.write_str("//visibility:legacy_public"),
      VisibilityRule::Package(pkg) => write!(f, "//{}:__pkg__", pkg),
      VisibilityRule::Subpackages(pkg) => write!(f, "//{}:__subpackages__", pkg),
    }
  }
}

/// Errors in a visibility label list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisibilityRuleError {
  /// A label that is not a recognized visibility rule.
  #[error("unrecognized visibility rule \"{label}\"")]
  Unknown { label: String },

  /// `public`, `private` or `legacy_public` listed alongside other rules.
  #[error("visibility rule \"{label}\" may not be combined with other rules")]
  NotExclusive { label: String },

  /// `//visibility:override` anywhere but first.
  #[error("\"//visibility:override\" may only be the first rule")]
  OverrideNotFirst,

  /// An empty label list.
  #[error("visibility rule list is empty")]
  Empty,
}

/// Parse a visibility label list declared in `package`.
pub fn parse_rules(package: &str, labels: &[String]) -> Result<Vec<VisibilityRule>, VisibilityRuleError> {
  let rules = labels
    .iter()
    .map(|label| VisibilityRule::parse(package, label))
    .collect::<Result<Vec<_>, _>>()?;

  let rest = match rules.split_first() {
    None => return Err(VisibilityRuleError::Empty),
    Some((VisibilityRule::Override, rest)) => rest,
    Some(_) => &rules[..],
  };
  if rest.contains(&VisibilityRule::Override) {
    return Err(VisibilityRuleError::OverrideNotFirst);
  }
  if rest.len() > 1
    && let Some(exclusive) = rest.iter().find(|r| r.is_exclusive())
  {
    return Err(VisibilityRuleError::NotExclusive {
      label: exclusive.to_string(),
    });
  }

  Ok(rules)
}

/// Whether `rules` let `from_package` depend on the module they guard.
pub fn rules_allow(rules: &[VisibilityRule], from_package: &str) -> bool {
  rules.iter().any(|rule| match rule {
    VisibilityRule::Public | VisibilityRule::LegacyPublic => true,
    VisibilityRule::Private | VisibilityRule::Override => false,
    VisibilityRule::Package(pkg) => from_package == pkg,
    VisibilityRule::Subpackages(pkg) => is_within(from_package, pkg),
  })
}

/// Whether `package` is `ancestor` or below it.
pub(crate) fn is_within(package: &str, ancestor: &str) -> bool {
  ancestor.is_empty()
    || package == ancestor
    || package
      .strip_prefix(ancestor)
      .is_some_and(|rest| rest.starts_with('/'))
}

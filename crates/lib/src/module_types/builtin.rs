//! Built-in module types.

use super::{Capability, ModuleType, ModuleTypeRegistry};
use crate::graph::DependencyRole;
use crate::property::{Condition, FieldKind, Schema};

/// Properties every module type carries.
pub fn common_schema() -> Schema {
  Schema::new()
    .with("defaults", FieldKind::StringList)
    .with("visibility", FieldKind::StringList)
    .with_variant("enabled", FieldKind::Bool)
    .with("host_supported", FieldKind::Bool)
    .with("device_supported", FieldKind::Bool)
    .with(
      "external_build",
      FieldKind::Struct(
        Schema::new()
          .with("label", FieldKind::String)
          .with("available", FieldKind::Bool),
      ),
    )
    .with("soong_config_variables", FieldKind::ConfigVariables)
}

fn cc_common() -> Schema {
  Schema::new()
    .with_variant("srcs", FieldKind::StringList)
    .with_variant("exclude_srcs", FieldKind::StringList)
    .with_variant("cflags", FieldKind::StringList)
    .with_variant("ldflags", FieldKind::StringList)
    .with_variant("export_include_dirs", FieldKind::StringList)
    .with_variant("shared_libs", FieldKind::Deps(DependencyRole::SharedLib))
    .with_variant("static_libs", FieldKind::Deps(DependencyRole::StaticLib))
    .with_variant("data", FieldKind::Deps(DependencyRole::Data))
    .with_variant("stl", FieldKind::String)
    .with("arch", FieldKind::Conditional(Condition::Arch))
    .with("target", FieldKind::Conditional(Condition::Target))
}

fn cc_library() -> Schema {
  cc_common().with("link", FieldKind::Conditional(Condition::Link))
}

fn cc_binary() -> Schema {
  cc_common()
    .with_variant("stem", FieldKind::String)
    .with_variant("static_executable", FieldKind::Bool)
}

fn genrule() -> Schema {
  Schema::new()
    .with_variant("cmd", FieldKind::String)
    .with_variant("srcs", FieldKind::StringList)
    .with_variant("exclude_srcs", FieldKind::StringList)
    .with("out", FieldKind::StringList)
    .with_variant("tools", FieldKind::Deps(DependencyRole::Tool))
    .with_variant("tool_files", FieldKind::StringList)
    .with("depfile", FieldKind::Bool)
    .with_variant("export_include_dirs", FieldKind::StringList)
    .with("arch", FieldKind::Conditional(Condition::Arch))
    .with("target", FieldKind::Conditional(Condition::Target))
}

fn filegroup() -> Schema {
  Schema::new()
    .with("srcs", FieldKind::StringList)
    .with("exclude_srcs", FieldKind::StringList)
    .with("path", FieldKind::String)
}

fn defaults_of(fields: Schema) -> Schema {
  fields.with("defaults_visibility", FieldKind::StringList)
}

/// Register `cc_library`, `cc_binary`, `cc_defaults`, `genrule`,
/// `genrule_defaults` and `filegroup`.
pub fn register_builtin_types(registry: &mut ModuleTypeRegistry) {
  use Capability::*;

  registry.register(ModuleType::new(
    "cc_library",
    cc_library(),
    &[OsVariants, ArchVariants, LinkVariants, ExternalBuildable],
  ));
  registry.register(ModuleType::new(
    "cc_binary",
    cc_binary(),
    &[OsVariants, ArchVariants, HostToolProvider, ExternalBuildable],
  ));
  registry.register(ModuleType::new(
    "cc_defaults",
    defaults_of(cc_library().extend(&cc_binary())),
    &[Defaults],
  ));
  registry.register(ModuleType::new(
    "genrule",
    genrule(),
    &[OsVariants, ArchVariants, ExternalBuildable],
  ));
  registry.register(ModuleType::new("genrule_defaults", defaults_of(genrule()), &[Defaults]));
  registry.register(ModuleType::new("filegroup", filegroup(), &[ExternalBuildable]));
}

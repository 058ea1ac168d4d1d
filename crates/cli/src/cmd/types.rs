//! Implementation of the `modgraph types` command.

use anyhow::Result;
use modgraph_lib::module_types::{ModuleType, ModuleTypeRegistry};
use modgraph_lib::property::FieldKind;

use crate::output::{OutputFormat, print_info, print_json, print_stat};

pub fn cmd_types(format: OutputFormat) -> Result<()> {
  let registry = ModuleTypeRegistry::with_builtins();

  if format.is_json() {
    let types: Vec<_> = registry.iter().map(describe).collect();
    return print_json(&types);
  }

  for module_type in registry.iter() {
    print_info(&module_type.name);
    let capabilities: Vec<&str> = module_type.capabilities.iter().map(|c| c.as_str()).collect();
    print_stat("Capabilities", &capabilities.join(", "));
    let fields: Vec<&str> = module_type.schema.fields().map(|(name, _)| name).collect();
    print_stat("Fields", &fields.join(", "));
  }
  Ok(())
}

fn describe(module_type: &ModuleType) -> serde_json::Value {
  let fields: serde_json::Map<String, serde_json::Value> = module_type
    .schema
    .fields()
    .map(|(name, field)| {
      let value = serde_json::json!({ "kind": kind_name(&field.kind), "variant": field.variant });
      (name.to_string(), value)
    })
    .collect();
  serde_json::json!({
    "name": module_type.name,
    "capabilities": module_type.capabilities.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
    "fields": fields,
  })
}

fn kind_name(kind: &FieldKind) -> String {
  match kind {
    FieldKind::Bool => "bool".to_string(),
    FieldKind::Int => "int".to_string(),
    FieldKind::String => "string".to_string(),
    FieldKind::StringList => "string_list".to_string(),
    FieldKind::Deps(role) => format!("deps({})", role),
    FieldKind::Struct(_) => "struct".to_string(),
    FieldKind::Conditional(condition) => format!("conditional({})", condition.axis()),
    FieldKind::ConfigVariables => "config_variables".to_string(),
  }
}

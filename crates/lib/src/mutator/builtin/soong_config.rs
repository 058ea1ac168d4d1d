//! `soong_config_variables`: properties chosen by configuration variables.

use tracing::trace;

use crate::config::{SoongConfig, VariableDecl};
use crate::consts::CONDITIONS_DEFAULT;
use crate::module_types::Capability;
use crate::mutator::{Direction, Mutator, MutatorContext};
use crate::property::{Properties, Value, append_properties};

const FIELD: &str = "soong_config_variables";

/// Folds each configuration variable's properties into the module.
pub struct SoongConfigMutator;

impl Mutator for SoongConfigMutator {
  fn name(&self) -> &str {
    "soong_config"
  }

  fn direction(&self) -> Direction {
    Direction::TopDown
  }

  fn mutate(&self, ctx: &mut MutatorContext<'_>) {
    if ctx.has_capability(Capability::Defaults) {
      return;
    }
    let Some(variables) = ctx.properties().get_map(FIELD).cloned() else {
      return;
    };
    ctx.properties_mut().remove(FIELD);

    let soong_config = &ctx.config().soong_config;
    for (name, value) in variables.iter() {
      let path = format!("{}.{}", FIELD, name);
      let Some(branches) = value.as_map() else {
        ctx.property_error(&path, format!("expected a map, found {}", value.kind_name()));
        continue;
      };

      match choose(soong_config, name, branches) {
        Ok(Some(chosen)) => {
          trace!(module = %ctx.module().name, variable = %name, "applying soong config properties");
          if let Err(err) = append_properties(ctx.properties_mut(), &chosen) {
            ctx.report(err);
          }
        }
        Ok(None) => {}
        Err(message) => ctx.property_error(&path, message),
      }
    }
  }
}

/// The properties variable `name` contributes, given its current value.
fn choose(config: &SoongConfig, name: &str, branches: &Properties) -> Result<Option<Properties>, String> {
  let Some(decl) = config.variables.get(name) else {
    return Err(format!("unknown soong config variable \"{}\"", name));
  };
  let default = || branches.get_map(CONDITIONS_DEFAULT).cloned();
  let value = config.value(name);

  match decl {
    VariableDecl::Bool => match value {
      Some(v) if is_truthy(v) => Ok(Some(without_default(branches))),
      _ => Ok(default()),
    },
    VariableDecl::String { values } => match value {
      None => Ok(default()),
      Some(v) if !values.iter().any(|allowed| allowed == v) => Err(format!(
        "soong config property \"{}\" must be one of [{}], found \"{}\"",
        name,
        values.join(" "),
        v
      )),
      Some(v) => Ok(branches.get_map(v).cloned().or_else(default)),
    },
    VariableDecl::Value => match value {
      Some(v) => Ok(Some(substitute(&without_default(branches), v))),
      None => Ok(default()),
    },
  }
}

fn is_truthy(value: &str) -> bool {
  matches!(value, "y" | "yes" | "true" | "1")
}

fn without_default(branches: &Properties) -> Properties {
  let mut props = branches.clone();
  props.remove(CONDITIONS_DEFAULT);
  props
}

/// Replace `%s` with `value` in every string of `props`.
fn substitute(props: &Properties, value: &str) -> Properties {
  props
    .iter()
    .map(|(name, v)| (name.clone(), substitute_value(v, value)))
    .collect()
}

fn substitute_value(v: &Value, value: &str) -> Value {
  match v {
    Value::String(s) => Value::String(s.replace("%s", value)),
    Value::List(items) => Value::List(items.iter().map(|s| s.replace("%s", value)).collect()),
    Value::Map(map) => Value::Map(substitute(map, value)),
    other => other.clone(),
  }
}

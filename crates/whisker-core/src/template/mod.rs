//! Canonical template evaluator.
//!
//! Rendering runs three passes over the passage text: conditional chains are
//! resolved first, then script blocks are executed (or replaced with a
//! placeholder), then `{{identifier}}` interpolation fills in values. The
//! evaluator never fails; malformed markup is left in the output as text.

pub mod condition;
pub mod conditional;
pub mod interpolate;
pub mod script;

pub use condition::evaluate;
pub use conditional::{resolve_conditionals, MAX_CONDITIONAL_PASSES};
pub use interpolate::interpolate;
pub use script::{process_scripts, ScriptRuntime};

use crate::pipeline::RenderConfig;
use crate::story::VariableEnv;

/// Template renderer.
///
/// Borrows an optional script runtime for its own lifetime; the runtime is
/// owned by the host.
#[derive(Default, Clone)]
pub struct Renderer<'rt> {
    config: RenderConfig,
    runtime: Option<&'rt dyn ScriptRuntime>,
}

impl<'rt> Renderer<'rt> {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            runtime: None,
        }
    }

    pub fn with_runtime(mut self, runtime: &'rt dyn ScriptRuntime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `template` against `env`.
    ///
    /// `env` is only written to by the script runtime, if one is attached.
    pub fn render(&self, template: &str, env: &mut dyn VariableEnv) -> String {
        if template.is_empty() {
            return String::new();
        }
        let content = resolve_conditionals(template, env);
        let content = process_scripts(&content, env, self.runtime, &self.config);
        interpolate(&content, env, self.config.markup)
    }
}

impl std::fmt::Debug for Renderer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("runtime", &self.runtime.is_some())
            .finish()
    }
}

/// Render with the default config and no script runtime.
pub fn render(template: &str, env: &mut dyn VariableEnv) -> String {
    Renderer::default().render(template, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScriptError;
    use crate::story::{Value, Variables};

    fn plain() -> Renderer<'static> {
        Renderer::new(RenderConfig::plain())
    }

    #[test]
    fn empty_template_renders_empty() {
        assert_eq!(render("", &mut Variables::new()), "");
    }

    #[test]
    fn conditional_then_interpolation() {
        let mut vars = Variables::new();
        vars.insert("health".into(), Value::from(50));
        let text = "{{#if health >= 50}}Strong: {{health}}{{else}}Weak{{/if}}";
        assert_eq!(plain().render(text, &mut vars), "Strong: 50");
    }

    #[test]
    fn missing_variable_placeholder_by_default_is_html() {
        assert_eq!(
            render("Hi {{who}}", &mut Variables::new()),
            "Hi <span style=\"color: #61dafb;\">[who]</span>"
        );
    }

    #[test]
    fn scripts_inside_losing_arm_never_run() {
        struct Panics;
        impl ScriptRuntime for Panics {
            fn execute(&self, _: &str, _: &mut dyn VariableEnv) -> Result<(), ScriptError> {
                panic!("script in a discarded arm was executed");
            }
        }

        let mut vars = Variables::new();
        let text = "{{#if flag}}{{script: boom()}}{{/if}}ok";
        let out = plain().with_runtime(&Panics).render(text, &mut vars);
        assert_eq!(out, "ok");
    }

    #[test]
    fn script_writes_are_visible_to_interpolation() {
        struct SetGold;
        impl ScriptRuntime for SetGold {
            fn execute(&self, _: &str, env: &mut dyn VariableEnv) -> Result<(), ScriptError> {
                env.set("gold", Value::from(7));
                Ok(())
            }
        }

        let mut vars = Variables::new();
        let out = plain()
            .with_runtime(&SetGold)
            .render("{{script: anything}}Gold: {{gold}}", &mut vars);
        assert_eq!(out, "Gold: 7");
        assert_eq!(vars.get("gold"), Some(&Value::Num(7.0)));
    }

    #[test]
    fn converted_passage_previews_without_runtime() {
        let mut vars = Variables::new();
        vars.insert("hasKey".into(), Value::from(false));
        let text = "{{script: game_state:set(\"gold\", 100)}}{{#if hasKey}}Open{{else}}Locked{{/if}}";
        assert_eq!(
            plain().render(text, &mut vars),
            "[script: game_state:set(\"gold\", 100)]Locked"
        );
    }
}

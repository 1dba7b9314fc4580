//! Rendering composed templates through a per-request minijinja environment

use minijinja::{AutoEscape, Environment};

use super::types::{RenderContext, TemplateError, TemplateResult};

/// Build an environment holding every `(name, source)` pair.
///
/// Output is HTML-escaped regardless of the template name; the page itself is
/// registered without an extension.
pub fn environment<'a, I>(templates: I) -> TemplateResult<Environment<'static>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);

    for (name, source) in templates {
        env.add_template_owned(name.to_string(), source.to_string())
            .map_err(|err| TemplateError::Parse {
                name: name.to_string(),
                line: err.line().unwrap_or(0),
                message: err.to_string(),
            })?;
    }

    Ok(env)
}

/// Render `name` against `ctx` into a buffered string.
pub fn render(env: &Environment<'_>, name: &str, ctx: &RenderContext) -> TemplateResult<String> {
    let execution = |err: minijinja::Error| TemplateError::Execution {
        name: err.name().unwrap_or(name).to_string(),
        line: err.line().unwrap_or(0),
        message: err.to_string(),
    };

    env.get_template(name).map_err(execution)?.render(ctx).map_err(execution)
}

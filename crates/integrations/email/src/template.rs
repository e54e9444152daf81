use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use tracing::debug;

use crate::error::EmailError;

/// Upper bound on template execution steps, so a runaway loop in a
/// template cannot hang the sender.
const FUEL_LIMIT: u64 = 50_000;

/// Renders `MiniJinja` templates stored under an assets directory.
///
/// Template names are paths relative to the directory (e.g.
/// `"welcome.html"` or `"orders/shipped.html"`). By default values
/// substituted into files ending in `.html` are HTML-escaped, so a
/// placeholder carrying markup renders as text. Use
/// [`with_auto_escape(false)`](Self::with_auto_escape) when context values
/// hold trusted HTML fragments.
pub struct TemplateRenderer {
    assets_dir: PathBuf,
    env: Environment<'static>,
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("assets_dir", &self.assets_dir)
            .finish_non_exhaustive()
    }
}

impl TemplateRenderer {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        let assets_dir = assets_dir.into();
        let mut env = Environment::new();
        env.set_fuel(Some(FUEL_LIMIT));
        env.set_loader(minijinja::path_loader(&assets_dir));
        Self { assets_dir, env }
    }

    /// Turn HTML escaping of `.html` templates on or off.
    #[must_use]
    pub fn with_auto_escape(mut self, auto_escape: bool) -> Self {
        if !auto_escape {
            self.env.set_auto_escape_callback(|_| AutoEscape::None);
        }
        self
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Render the template `name` with `context` as its variables.
    pub fn render<S: Serialize>(&self, name: &str, context: &S) -> Result<String, EmailError> {
        debug!(template = name, "rendering email template");
        let template = self.env.get_template(name)?;
        let rendered = template.render(minijinja::Value::from_serialize(context))?;
        Ok(rendered)
    }
}

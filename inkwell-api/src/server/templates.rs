use crate::server::html::Html;
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

const TEMPLATES: [(&str, &str); 4] = [
    ("layout", include_str!("../../templates/layout.hbs")),
    ("index", include_str!("../../templates/index.hbs")),
    ("add", include_str!("../../templates/add.hbs")),
    ("update", include_str!("../../templates/update.hbs")),
];

/// The page templates, compiled once at startup.
#[derive(Debug)]
pub struct Templates {
    handlebars: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, Box<TemplateError>> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        for (name, source) in TEMPLATES {
            handlebars
                .register_template_string(name, source)
                .map_err(Box::new)?;
        }

        Ok(Self { handlebars })
    }

    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<Html, RenderError> {
        self.handlebars.render(name, context).map(Html)
    }
}

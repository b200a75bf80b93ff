use std::sync::Arc;

use anyhow::Context;
use bookdemo_templates_contracts::{Template, TemplateService, BASE_TEMPLATE, TEMPLATES};
use tera::Tera;

#[derive(Debug, Clone)]
pub struct TemplateServiceImpl {
    tera: Arc<Tera>,
}

impl TemplateServiceImpl {
    /// Compiles all templates. Fails if any of them contains a syntax error.
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();

        let (name, template) = BASE_TEMPLATE;
        tera.add_raw_template(name, template)
            .with_context(|| format!("Failed to compile template {name}"))?;

        for &(name, template) in TEMPLATES {
            tera.add_raw_template(name, template)
                .with_context(|| format!("Failed to compile template {name}"))?;
        }

        Ok(Self { tera: tera.into() })
    }
}

impl TemplateService for TemplateServiceImpl {
    fn render<T: Template>(&self, template: &T) -> anyhow::Result<String> {
        let context = tera::Context::from_serialize(template)?;
        self.tera.render(T::NAME, &context).map_err(Into::into)
    }
}

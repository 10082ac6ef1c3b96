use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

#[derive(Serialize)]
pub struct IndexTemplate {
    pub heading: String,
    pub token: String,
    pub dashboard_url: String,
}

pub struct Templates<'a> {
    hb: Handlebars<'a>,
}

impl<'a> Templates<'a> {
    pub fn render_index(&self, data: &IndexTemplate) -> Result<String, RenderError> {
        self.hb.render("index", data)
    }
}

pub fn load() -> Result<Templates<'static>, TemplateError> {
    let mut hb = Handlebars::new();

    hb.register_template_string("layout", include_str!("../templates/_layout.handlebars"))?;
    hb.register_template_string("index", include_str!("../templates/index.handlebars"))?;

    Ok(Templates { hb })
}

pub fn with_templates(
    templates: Arc<Templates<'static>>,
) -> impl Filter<Extract = (Arc<Templates<'static>>,), Error = Infallible> + Clone {
    warp::any().map(move || templates.clone())
}

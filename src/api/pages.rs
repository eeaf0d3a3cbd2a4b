//! Server-rendered pages
//!
//! The list page links to the browser; the browse page embeds one panel per
//! broker and drives them through the JSON API.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

use super::routes::PanelDescriptor;

const LIST_TEMPLATE: &str = include_str!("../../templates/list.hbs");
const BROWSE_TEMPLATE: &str = include_str!("../../templates/browse.hbs");

#[derive(Serialize)]
struct ListPage<'a> {
    title: &'a str,
    browse_url: &'a str,
}

#[derive(Serialize)]
struct BrowsePage<'a> {
    title: &'a str,
    selector_id: &'a str,
    heading_id: &'a str,
    brokers: &'a [PanelDescriptor],
}

pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_helper("json", Box::new(json_helper));
        handlebars
            .register_template_string("list", LIST_TEMPLATE)
            .context("Failed to register list template")?;
        handlebars
            .register_template_string("browse", BROWSE_TEMPLATE)
            .context("Failed to register browse template")?;
        Ok(Self { handlebars })
    }

    pub fn render_list(&self) -> Result<String> {
        let page = ListPage {
            title: "Alerts",
            browse_url: "/alerts/browse/",
        };
        self.handlebars
            .render("list", &page)
            .context("Failed to render list page")
    }

    pub fn render_browse(&self, brokers: &[PanelDescriptor]) -> Result<String> {
        let page = BrowsePage {
            title: "Browse Alerts",
            selector_id: crate::dash::wiring::BROKER_SELECTOR_ID,
            heading_id: crate::dash::wiring::PAGE_HEADING_ID,
            brokers,
        };
        self.handlebars
            .render("browse", &page)
            .context("Failed to render browse page")
    }
}

/// `{{json value}}`: the value as compact JSON, for embedding in scripts.
fn json_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    if let Some(v) = h.param(0) {
        out.write(&serde_json::to_string(v.value()).unwrap_or_default())?;
    }
    Ok(())
}

use std::io::{stdout, Write};

use anyhow::{Context, Result};
use designation::Catalog;

use crate::info::{setup_handlebars, Format};

pub fn catalog(catalog: &Catalog, format: &Format) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), catalog).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(catalog)?;
            stdout()
                .write_all(str::as_bytes(&data))
                .context("writing to stdout")
        }
    }
}

fn render_text(catalog: &Catalog) -> Result<String> {
    let mut hb = setup_handlebars();
    hb.register_template_string("template", CATALOG_TEMPLATE)
        .context("registering template")?;

    hb.render("template", catalog).context("rendering text")
}

const CATALOG_TEMPLATE: &str = r"-----------------------------------------------
Station  Name
-----------------------------------------------
{{ #each stations }}{{ lpad 7 id }}  {{ name }}
{{ /each ~}}
-----------------------------------------------
SCID     Name
-----------------------------------------------
{{ #each spacecrafts }}{{ lpad 7 id }}  {{ name }}
{{ /each ~}}
";

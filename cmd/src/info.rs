use std::{
    io::{stdout, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use designation::{Catalog, Header, Summary};
use handlebars::handlebars_helper;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    station: Option<String>,
    spacecraft: Option<String>,
    header: Header,
    summary: Summary,
    distinct_targets: usize,
}

fn summarize(fpath: &Path, catalog: &Catalog) -> Result<Info> {
    let dat = std::fs::read(fpath).with_context(|| format!("reading {fpath:?}"))?;
    let file = designation::decode(&dat).with_context(|| format!("decoding {fpath:?}"))?;
    debug!("decoded {} records from {fpath:?}", file.records.len());

    let summary = Summary::from_records(&file.records);
    Ok(Info {
        filename: fpath.to_string_lossy().to_string(),
        station: catalog
            .station(file.header.station_id)
            .map(|s| s.name.clone()),
        spacecraft: catalog
            .spacecraft(file.header.spacecraft_id)
            .map(|s| s.name.clone()),
        distinct_targets: summary.distinct_targets(),
        header: file.header,
        summary,
    })
}

pub fn info(inputs: &[PathBuf], format: &Format, catalog: &Catalog) -> Result<()> {
    let infos = inputs
        .par_iter()
        .map(|fpath| summarize(fpath, catalog))
        .collect::<Result<Vec<Info>>>()?;

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &infos).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(&infos).context("serializing info")?;
            stdout()
                .write_all(str::as_bytes(&data))
                .context("writing to stdout")
        }
    }
}

pub(crate) fn setup_handlebars() -> handlebars::Handlebars<'static> {
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);

    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => String::new(),
            _ => v.to_string()
        };
        let num = usize::try_from(num).unwrap_or(0).max(v.len());
        format!("{v:>num$}")
    });
    hb.register_helper("lpad", Box::new(left_pad));

    handlebars_helper!(right_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => String::new(),
            _ => v.to_string()
        };
        let num = usize::try_from(num).unwrap_or(0).max(v.len());
        format!("{v:<num$}")
    });
    hb.register_helper("rpad", Box::new(right_pad));

    hb
}

#[derive(Serialize)]
struct InfosRenderData<'a> {
    infos: &'a [Info],
}

fn render_text(infos: &[Info]) -> Result<String> {
    let mut hb = setup_handlebars();
    hb.register_template_string("info", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("info", &InfosRenderData { infos })
        .context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ #each infos }}{{ filename }}
===============================================================================
Format:       {{ header.format_version }} ({{ header.byte_order }} endian)
Created:      {{ header.creation_time }}
Station:      {{ header.station_id }} {{ station }}
Spacecraft:   {{ header.spacecraft_id }} {{ spacecraft }}
Session:      {{ header.session_id }}
Window:       {{ header.session_start }} - {{ header.session_end }}
-------------------------------------------------------------------------------
Records:      {{ summary.count }}
First:        {{ summary.first_time }}
Last:         {{ summary.last_time }}
Duration:     {{ summary.duration_ms }} ms
Targets:      {{ distinct_targets }}
Priority:     {{ summary.priority }}
Calibration:  {{ summary.calibration }}
-------------------------------------------------------------------------------
Mode            Count
-------------------------------------------------------------------------------
{{ #each summary.modes }}{{ rpad 12 @key }} {{ lpad 8 this }}
{{ /each }}
{{ /each ~}}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_helpers() {
        let hb = setup_handlebars();
        let out = hb
            .render_template(
                "[{{ lpad 4 x }}][{{ rpad 4 x }}][{{ lpad 1 y }}]",
                &serde_json::json!({"x": 7, "y": "abc"}),
            )
            .unwrap();
        assert_eq!(out, "[   7][7   ][abc]");
    }
}

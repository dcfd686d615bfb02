use std::{
    io::{stdout, Write},
    path::Path,
};

use anyhow::{Context, Result};
use tracing::info;

pub fn records(fpath: &Path, pretty: bool) -> Result<()> {
    let dat = std::fs::read(fpath).with_context(|| format!("reading {fpath:?}"))?;
    let file = designation::decode(&dat).with_context(|| format!("decoding {fpath:?}"))?;
    info!("{} records in {fpath:?}", file.records.len());

    let mut out = stdout().lock();
    let written = if pretty {
        serde_json::to_writer_pretty(&mut out, &file)
    } else {
        serde_json::to_writer(&mut out, &file)
    };
    written.context("serializing to json")?;
    writeln!(out).context("writing to stdout")
}

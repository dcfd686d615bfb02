use std::{
    io::{stdout, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use designation::{DecodeError, DecodeOptions, Decoder};
use rayon::prelude::*;
use tracing::debug;

fn check(fpath: &Path, decoder: &Decoder) -> Result<std::result::Result<(), DecodeError>> {
    let dat = std::fs::read(fpath).with_context(|| format!("reading {fpath:?}"))?;
    Ok(decoder.decode(&dat).map(|file| {
        debug!("{fpath:?}: {} records", file.records.len());
    }))
}

pub fn validate(inputs: &[PathBuf], options: DecodeOptions) -> Result<()> {
    let decoder = Decoder::new(options);
    let results = inputs
        .par_iter()
        .map(|fpath| check(fpath, &decoder))
        .collect::<Result<Vec<_>>>()?;

    let mut out = stdout().lock();
    let mut failed = 0;
    for (fpath, result) in inputs.iter().zip(results) {
        let written = match result {
            Ok(()) => writeln!(out, "{}: ok", fpath.display()),
            Err(err) => {
                failed += 1;
                let json = serde_json::to_string(&err).context("serializing to json")?;
                writeln!(out, "{}: {json}", fpath.display())
            }
        };
        written.context("writing to stdout")?;
    }

    if failed > 0 {
        bail!("{failed} of {} files failed validation", inputs.len());
    }
    Ok(())
}

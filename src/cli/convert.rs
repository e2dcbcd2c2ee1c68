//! `convert`: rewrite the front matter of all content with `hugo convert`.

use crate::config::{Dialect, Options};
use crate::generator::{Generator, GeneratorArgs};
use crate::log;
use anyhow::{Result, bail};
use std::path::Path;

pub fn convert(
    options: &Options,
    generator: &Generator,
    to: Dialect,
    unsafe_: bool,
    output: Option<&Path>,
) -> Result<()> {
    if !unsafe_ && output.is_none() {
        bail!("converting in place rewrites every content file; pass --unsafe or --output <dir>");
    }
    let site = options.site()?;
    let args = GeneratorArgs::for_convert(to, unsafe_)
        .value_opt("-o", output.map(|p| p.to_string_lossy().into_owned()));

    let result = generator.run(&args, site.root())?;
    for line in result.stdout.lines().filter(|l| !l.trim().is_empty()) {
        log!("convert"; "{}", line.trim());
    }
    log!("convert"; "front matter converted to {}", to.format_name());
    Ok(())
}

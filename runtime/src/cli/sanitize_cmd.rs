//! `sitewalk sanitize <path>`: strip unsafe markup from an HTML file (`-` for stdin).

use crate::trust::html_sanitizer;
use anyhow::{Context, Result};
use std::io::Read;

/// Run the sanitize command.
pub fn run(path: &str) -> Result<()> {
    let html = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?
    };

    println!("{}", html_sanitizer::sanitize(&html));
    Ok(())
}

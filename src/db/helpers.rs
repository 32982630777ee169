use anyhow::{anyhow, bail, Context, Result};

use crate::models::StrokePath;

pub fn parse_percentage(value: &str) -> Result<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid stored percentage '{value}'"))?;
    if !parsed.is_finite() {
        bail!("stored percentage '{value}' is not finite");
    }
    Ok(parsed)
}

pub fn parse_path(value: &str) -> Result<StrokePath> {
    serde_json::from_str(value).context("failed to parse stored stroke path")
}

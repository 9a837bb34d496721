use anyhow::{Context, Result};
use clap::ArgMatches;
use luna2d_deploy::Platform;
use std::path::PathBuf;

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        format!("1 {}", word)
    } else {
        format!("{} {}s", count, word)
    }
}

pub fn format_duration(duration: std::time::Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

pub fn platform(matches: &ArgMatches) -> Result<Platform> {
    let value = matches
        .get_one::<String>("platform")
        .context("--platform is required")?;
    Ok(value.parse()?)
}

pub fn path(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .with_context(|| format!("--{} is required", name))
}

pub fn string(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("--{} is required", name))
}

/// Value of a boolish option; absent means false
pub fn flag(matches: &ArgMatches, name: &str) -> bool {
    matches.get_one::<bool>(name).copied().unwrap_or(false)
}

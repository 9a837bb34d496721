use anyhow::Result;
use clap::ArgMatches;
use luna2d_deploy::{engine_build, DeployConfig};
use std::time::Instant;

use crate::cli::utils;

pub fn handle_build_engine(matches: &ArgMatches, config: &DeployConfig) -> Result<()> {
    let platform = utils::platform(matches)?;
    let build_type = matches
        .get_one::<String>("build_type")
        .map(|s| s.as_str())
        .unwrap_or("Release");
    let luna2d_path = config.luna2d_path()?;
    let start = Instant::now();

    println!("Building luna2d for {} ({})", platform, build_type);
    let steps = engine_build::build_engine(&luna2d_path, platform, build_type, &config.cmake)?;

    println!(
        "Finished {} in {}",
        utils::pluralize("build configuration", steps),
        utils::format_duration(start.elapsed())
    );
    Ok(())
}

use std::env;

use anyhow::{Result, Context, anyhow};
use log::info;

use libRustDeflect::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let input_file = match args.len() {
        1 => "input.toml".to_string(),
        2 => args[1].clone(),
        _ => return Err(anyhow!("Too many command line arguments. RustDeflect accepts 0 (use 'input.toml') or 1 (input file name).")),
    };

    let (options, configs) = input::input(&input_file)?;

    for (index, config) in configs.iter().enumerate() {
        info!("Capacitor {}: r = {} m, R = {} m, L = {} m, V = {} m/s, T = {} s; {}; {} {}",
            index, config.capacitor.inner_radius, config.capacitor.outer_radius, config.capacitor.length,
            config.kinematics.velocity, config.kinematics.transit_time(), config.field_scale, config.shape, config.orientation);
    }
    info!("{}", options.root_finder);
    info!("{}", options.integrator);

    let results = sweep(&configs, options.num_threads);

    output::write_results(&options, &results)
        .with_context(|| format!("Output error: could not write results for {}.", options.name))?;

    info!("Finished!");
    Ok(())
}

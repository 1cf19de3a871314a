use super::*;
use std::fs::File;

fn open_output_file(options: &Options, suffix: &str) -> Result<BufWriter<File>> {
    let file_name = format!("{}{}", options.name, suffix);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&file_name)
        .with_context(|| format!("Output error: could not open output file {}.", file_name))?;
    Ok(BufWriter::with_capacity(options.write_buffer_size, file))
}

/// Simulation-wide summary output tracker: one line per capacitor run.
pub struct Summary {
    pub num_runs: usize,
    pub num_exited: usize,
    pub num_struck: usize,
    pub num_failed: usize,
    summary_stream_file: BufWriter<File>,
}

impl Summary {
    pub fn new(options: &Options) -> Result<Summary> {
        let mut summary_stream_file = open_output_file(options, "summary.output")?;
        writeln!(summary_stream_file, "index, inner_radius, outer_radius, length, velocity, transit_time, critical_voltage, field_scale, y_exit, vy_exit, deflection_angle, outcome")
            .with_context(|| format!("Output error: could not write to {}summary.output.", options.name))?;

        Ok(Summary {
            num_runs: 0,
            num_exited: 0,
            num_struck: 0,
            num_failed: 0,
            summary_stream_file,
        })
    }

    pub fn update(&mut self, index: usize, result: &std::result::Result<Simulation, SimulationError>) -> Result<()> {
        self.num_runs += 1;

        match result {
            Ok(simulation) => {
                let capacitor = &simulation.config.capacitor;
                let kinematics = &simulation.config.kinematics;
                let critical_voltage = simulation.critical_field.map(|critical_field| critical_field.voltage).unwrap_or(f64::NAN);

                match simulation.trajectory.outcome() {
                    TransitOutcome::EXITED => self.num_exited += 1,
                    TransitOutcome::STRUCK_PLATE{..} => self.num_struck += 1,
                }

                if let Some(exit_state) = simulation.exit_state() {
                    writeln!(self.summary_stream_file, "{}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
                        index, capacitor.inner_radius, capacitor.outer_radius, capacitor.length,
                        kinematics.velocity, kinematics.transit_time(), critical_voltage, simulation.field.field_scale,
                        exit_state.y, exit_state.vy, exit_state.deflection_angle, exit_state.outcome)?;
                }
            },
            Err(error) => {
                self.num_failed += 1;
                writeln!(self.summary_stream_file, "{}, failed: {}", index, error)?;
            },
        }
        Ok(())
    }

    pub fn print(&mut self) -> Result<()> {
        self.summary_stream_file.flush()?;
        info!("{} runs: {} exited, {} struck a plate, {} failed.", self.num_runs, self.num_exited, self.num_struck, self.num_failed);
        Ok(())
    }
}

/// Writes t, x, y, vy, ay, outside_gap for every sample of a run.
pub fn write_trajectory(options: &Options, index: usize, simulation: &Simulation) -> Result<()> {
    let suffix = format!("trajectory_{}.output", index);
    let mut stream = open_output_file(options, &suffix)?;

    let axial_positions = simulation.axial_positions();
    for (sample, x) in izip!(simulation.trajectory.samples(), axial_positions) {
        writeln!(stream, "{},{},{},{},{},{}", sample.t, x, sample.y, sample.vy, sample.ay, sample.outside_gap as u8)
            .with_context(|| format!("Output error: could not write to {}{}.", options.name, suffix))?;
    }
    stream.flush()?;
    Ok(())
}

/// Writes the summary and, if enabled, the per-run trajectories.
pub fn write_results(options: &Options, results: &[std::result::Result<Simulation, SimulationError>]) -> Result<Summary> {
    let mut summary = Summary::new(options)?;

    for (index, result) in results.iter().enumerate() {
        summary.update(index, result)?;

        match result {
            Ok(simulation) => {
                if options.write_trajectories {
                    write_trajectory(options, index, simulation)?;
                }
                if let Some(exit_state) = simulation.exit_state() {
                    info!("Capacitor {}: {}", index, exit_state);
                }
            },
            Err(error) => error!("Capacitor {}: {}", index, error),
        }
    }

    summary.print()?;
    Ok(summary)
}

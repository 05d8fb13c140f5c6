use crate::simulation_engine::simulator::{TrialOutcome, TrialSummary};
use plotters::prelude::*;
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Trials averaged into each point of the success-rate line.
const SUCCESS_WINDOW: usize = 10;

// Generic helper to append records to a CSV file, writing headers only once.
fn log_to_csv<T: serde::Serialize>(path: &Path, records: &[T]) -> Result<(), Box<dyn Error>> {
    let file_exists = path.exists();
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Appends one row per trial to `path`.
pub fn log_trials_to_csv<P: AsRef<Path>>(
    path: P,
    trials: &[TrialSummary],
) -> Result<(), Box<dyn Error>> {
    log_to_csv(path.as_ref(), trials)
}

pub fn read_trials_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TrialSummary>, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut trials = Vec::new();
    for result in rdr.deserialize() {
        let record: TrialSummary = result?;
        trials.push(record);
    }
    Ok(trials)
}

/// Success rate over a trailing window, one value per trial.
pub fn rolling_success_rate(trials: &[TrialSummary], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..trials.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &trials[start..=i];
            let successes = slice
                .iter()
                .filter(|t| t.outcome == TrialOutcome::Success)
                .count();
            successes as f64 / slice.len() as f64
        })
        .collect()
}

/// Draws reward per trial (upper panel) and rolling success rate (lower panel).
pub fn plot_learning_curve<P: AsRef<Path>>(
    path: P,
    trials: &[TrialSummary],
) -> Result<(), Box<dyn Error>> {
    if trials.is_empty() {
        println!("No trials to plot.");
        return Ok(());
    }

    let n = trials.len();
    let min_reward = trials
        .iter()
        .map(|t| t.total_reward)
        .fold(f64::INFINITY, f64::min)
        .min(0.0);
    let max_reward = trials
        .iter()
        .map(|t| t.total_reward)
        .fold(f64::NEG_INFINITY, f64::max)
        .max(min_reward + 1.0);

    let root = BitMapBackend::new(path.as_ref(), (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(300);

    let mut reward_chart = ChartBuilder::on(&upper)
        .caption("Total reward per trial", ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0..n, min_reward..max_reward)?;
    reward_chart.configure_mesh().draw()?;
    reward_chart.draw_series(trials.iter().map(|t| {
        let color = match t.outcome {
            TrialOutcome::Success => GREEN.filled(),
            TrialOutcome::Failure => RED.filled(),
            TrialOutcome::Timeout => BLACK.filled(),
        };
        Circle::new((t.trial, t.total_reward), 3, color)
    }))?;

    let mut success_chart = ChartBuilder::on(&lower)
        .caption(
            format!("Success rate (last {} trials)", SUCCESS_WINDOW),
            ("sans-serif", 20),
        )
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0..n, 0.0..1.0)?;
    success_chart.configure_mesh().draw()?;
    success_chart.draw_series(LineSeries::new(
        rolling_success_rate(trials, SUCCESS_WINDOW)
            .into_iter()
            .enumerate(),
        &BLUE,
    ))?;

    root.present()?;
    println!("Learning curve saved to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(trial: usize, outcome: TrialOutcome) -> TrialSummary {
        TrialSummary {
            trial,
            outcome,
            ticks: 12,
            total_reward: 20.5,
            deadline_remaining: if outcome == TrialOutcome::Success {
                Some(4)
            } else {
                None
            },
            penalties: 1,
            learned_entries: Some(9),
        }
    }

    #[test]
    fn rolling_rate_uses_trailing_window() {
        let trials = vec![
            trial(0, TrialOutcome::Failure),
            trial(1, TrialOutcome::Success),
            trial(2, TrialOutcome::Success),
            trial(3, TrialOutcome::Timeout),
        ];
        assert_eq!(rolling_success_rate(&trials, 2), vec![0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn csv_keeps_every_trial() {
        let path = std::env::temp_dir().join(format!(
            "smartcab_trials_{}.csv",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let first = vec![trial(0, TrialOutcome::Success)];
        let second = vec![trial(1, TrialOutcome::Failure)];
        log_trials_to_csv(&path, &first).unwrap();
        log_trials_to_csv(&path, &second).unwrap();

        let read = read_trials_from_csv(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(read, vec![first[0].clone(), second[0].clone()]);
    }
}

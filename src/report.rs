use std::io::{self, Write};

use crate::export::TIME_FORMAT;
use crate::propagation::{Propagation, Sample};

const RULE_WIDTH: usize = 80;
const EDGE_ROWS: usize = 3;

/// Print a propagation summary table to stdout
pub fn print_propagation(propagation: &Propagation, show_all: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_propagation(&mut out, propagation, show_all)
}

pub fn write_propagation<W: Write>(
    out: &mut W,
    propagation: &Propagation,
    show_all: bool,
) -> io::Result<()> {
    let samples = &propagation.samples;
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return writeln!(out, "No results to display");
    };

    let rule = "=".repeat(RULE_WIDTH);
    let thin = "-".repeat(RULE_WIDTH);

    writeln!(out, "{}", rule)?;
    writeln!(out, "ORBITAL PROPAGATION RESULTS")?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "Total time points: {}", samples.len())?;
    writeln!(
        out,
        "Time span: {} to {}",
        first.epoch.format(TIME_FORMAT),
        last.epoch.format(TIME_FORMAT)
    )?;
    if let Some(avg) = propagation.average_altitude_km() {
        writeln!(out, "Average altitude: {:.2} km", avg)?;
    }
    if !propagation.skipped.is_empty() {
        writeln!(out, "Skipped epochs: {}", propagation.skipped.len())?;
    }

    writeln!(out, "{}", thin)?;
    writeln!(
        out,
        "{:<20} {:>10} {:>10} {:>10} {:>12}",
        "Time (UTC)", "Lat (°)", "Lon (°)", "Alt (km)", "Speed (km/s)"
    )?;
    writeln!(out, "{}", thin)?;

    if show_all || samples.len() <= 2 * EDGE_ROWS {
        for s in samples {
            write_row(out, s)?;
        }
    } else {
        for s in &samples[..EDGE_ROWS] {
            write_row(out, s)?;
        }
        if samples.len() > 2 * EDGE_ROWS + 1 {
            write_ellipsis(out)?;
            write_row(out, &samples[samples.len() / 2])?;
            write_ellipsis(out)?;
        }
        for s in &samples[samples.len() - EDGE_ROWS..] {
            write_row(out, s)?;
        }
    }

    writeln!(out, "{}", rule)
}

fn write_row<W: Write>(out: &mut W, s: &Sample) -> io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>10.3} {:>10.3} {:>10.2} {:>12.3}",
        s.epoch.format(TIME_FORMAT).to_string(),
        s.latitude_deg,
        s.longitude_deg,
        s.altitude_km,
        s.speed_km_s
    )
}

fn write_ellipsis<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>10} {:>10} {:>10} {:>12}",
        "...", "...", "...", "...", "..."
    )
}

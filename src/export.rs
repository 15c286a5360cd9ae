use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::propagation::Sample;
use crate::track::GroundTrack;

pub const CSV_HEADER: &str = "time_str,lat_deg,lon_deg,alt_km,speed_km_s";
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn write_csv<W: Write>(out: &mut W, samples: &[Sample]) -> io::Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;
    for s in samples {
        writeln!(
            out,
            "{},{:.6},{:.6},{:.6},{:.6}",
            s.epoch.format(TIME_FORMAT),
            s.latitude_deg,
            s.longitude_deg,
            s.altitude_km,
            s.speed_km_s
        )?;
    }
    Ok(())
}

pub fn save_csv(path: &Path, samples: &[Sample]) -> Result<(), ExportError> {
    let mut out = BufWriter::new(create(path)?);
    write_csv(&mut out, samples)?;
    out.flush()?;
    log::info!("Wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}

pub fn save_track(path: &Path, track: &GroundTrack) -> Result<(), ExportError> {
    let mut out = BufWriter::new(create(path)?);
    serde_json::to_writer_pretty(&mut out, track)?;
    out.flush()?;
    log::info!(
        "Wrote {} segments and {} orbits to {}",
        track.segments.len(),
        track.orbits.len(),
        path.display()
    );
    Ok(())
}

fn create(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodetic::j2000;
    use chrono::Duration;

    #[test]
    fn csv_layout() {
        let samples = vec![
            Sample {
                epoch: j2000(),
                position_eci_km: [6778.0, 0.0, 0.0],
                velocity_eci_km_s: [0.0, 7.67, 0.0],
                latitude_deg: 51.5,
                longitude_deg: -0.125,
                altitude_km: 408.25,
                speed_km_s: 7.66,
            },
            Sample {
                epoch: j2000() + Duration::minutes(5) + Duration::milliseconds(400),
                position_eci_km: [6778.0, 0.0, 0.0],
                velocity_eci_km_s: [0.0, 7.67, 0.0],
                latitude_deg: -12.0,
                longitude_deg: 179.9999999,
                altitude_km: 410.0,
                speed_km_s: 7.65,
            },
        ];

        let mut buf = Vec::new();
        write_csv(&mut buf, &samples).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "2000-01-01 12:00:00,51.500000,-0.125000,408.250000,7.660000"
        );
        assert_eq!(
            lines[2],
            "2000-01-01 12:05:00,-12.000000,180.000000,410.000000,7.650000"
        );
    }

    #[test]
    fn empty_csv_has_header_only() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), format!("{}\n", CSV_HEADER));
    }
}

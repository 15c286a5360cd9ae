use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::propagation::error::TleError;

const MINUTES_PER_DAY: f64 = 1440.0;

/// Validated element set plus the name used to label output.
pub struct Satellite {
    pub name: String,
    pub elements: Elements,
    /// SGP4 initialisation of `elements`, computed once at load time
    pub constants: Constants,
}

impl fmt::Debug for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Satellite")
            .field("name", &self.name)
            .field("norad_id", &self.elements.norad_id)
            .finish_non_exhaustive()
    }
}

/// Orbital elements as shown to the user
#[derive(Debug, Clone)]
pub struct ElementSummary {
    pub norad_id: u64,
    pub epoch: DateTime<Utc>,
    pub inclination_deg: f64,
    pub right_ascension_deg: f64,
    pub eccentricity: f64,
    pub argument_of_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub mean_motion_rev_per_day: f64,
    /// B* drag term, 1/earth radii
    pub bstar: f64,
    pub period_minutes: f64,
}

impl Satellite {
    pub fn from_lines(name: Option<String>, line1: &str, line2: &str) -> Result<Self, TleError> {
        let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())?;
        // Rejects element sets SGP4 cannot initialise from
        let constants = Constants::from_elements(&elements)?;

        let name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));
        Ok(Self {
            name,
            elements,
            constants,
        })
    }

    pub fn orbital_period_minutes(&self) -> f64 {
        MINUTES_PER_DAY / self.elements.mean_motion
    }

    pub fn describe(&self) -> ElementSummary {
        ElementSummary {
            norad_id: self.elements.norad_id,
            epoch: self.elements.datetime.and_utc(),
            inclination_deg: self.elements.inclination,
            right_ascension_deg: self.elements.right_ascension,
            eccentricity: self.elements.eccentricity,
            argument_of_perigee_deg: self.elements.argument_of_perigee,
            mean_anomaly_deg: self.elements.mean_anomaly,
            mean_motion_rev_per_day: self.elements.mean_motion,
            bstar: self.elements.drag_term,
            period_minutes: self.orbital_period_minutes(),
        }
    }
}

/// Load the first satellite found in a TLE file
pub fn load_satellite(path: &Path) -> Result<Satellite, TleError> {
    let content = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let (name, line1, line2) =
        parse_tle(&content).ok_or_else(|| TleError::InvalidFormat {
            file: filename.clone(),
            message: "expected lines starting with '1 ' and '2 '".into(),
        })?;

    let satellite = Satellite::from_lines(name, &line1, &line2)?;
    log::debug!(
        "Loaded {} (NORAD {}) from {}",
        satellite.name,
        satellite.elements.norad_id,
        filename
    );
    Ok(satellite)
}

/// Find the first 2-line or 3-line TLE entry in `content`
pub fn parse_tle(content: &str) -> Option<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut i = 0;
    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            return Some((None, lines[i].to_string(), lines[i + 1].to_string()));
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // 3-line TLE (with name)
            return Some((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
        }
        i += 1;
    }

    None
}

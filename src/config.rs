use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::propagation::SamplingPlan;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// A ground-track run as read from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub tle: PathBuf,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default = "default_step")]
    pub step: String,
    #[serde(default = "default_orbits")]
    pub orbits: usize,
    #[serde(default)]
    pub period_minutes: Option<f64>,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub csv: Option<PathBuf>,
    pub track: Option<PathBuf>,
}

fn default_duration() -> String {
    "6h".to_string()
}

fn default_step() -> String {
    "5m".to_string()
}

fn default_orbits() -> usize {
    3
}

fn default_workers() -> usize {
    1
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        // Relative paths in the file are relative to the file itself
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.orbits == 0 {
            return Err(invalid("orbits", "must be at least 1".into()));
        }
        if let Some(period) = self.period_minutes {
            if !(period.is_finite() && period > 0.0) {
                return Err(invalid("period_minutes", format!("must be positive, got {}", period)));
            }
        }
        let step = parse_duration(&self.step).map_err(|e| invalid("step", e))?;
        if step <= Duration::zero() {
            return Err(invalid("step", "must be positive".into()));
        }
        parse_duration(&self.duration).map_err(|e| invalid("duration", e))?;
        if let Some(start) = &self.start {
            parse_start(start, Utc::now()).map_err(|e| invalid("start", e))?;
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.tle);
        if let Some(p) = self.output.csv.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.output.track.as_mut() {
            resolve(p);
        }
    }

    /// Build the sampling plan, resolving a missing or relative start against `now`.
    pub fn sampling_plan(&self, now: DateTime<Utc>) -> Result<SamplingPlan, ConfigError> {
        let start = match &self.start {
            Some(s) => parse_start(s, now).map_err(|e| invalid("start", e))?,
            None => now,
        };
        let duration = parse_duration(&self.duration).map_err(|e| invalid("duration", e))?;
        let step = parse_duration(&self.step).map_err(|e| invalid("step", e))?;
        Ok(SamplingPlan::new(start, duration, step).with_workers(self.workers))
    }
}

fn invalid(field: &'static str, message: String) -> ConfigError {
    ConfigError::Invalid { field, message }
}

/// Parse `T+10m`, `T-1h`, `now` or an RFC 3339 timestamp
pub fn parse_start(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    let s = s.trim();

    if s.eq_ignore_ascii_case("now") {
        return Ok(now);
    }

    if s.to_lowercase().starts_with('t') {
        let rest = &s[1..];
        let (neg, rest) = match rest.strip_prefix('-') {
            Some(r) => (true, r),
            None => (false, rest.strip_prefix('+').unwrap_or(rest)),
        };
        let dur = parse_duration(rest)?;
        return Ok(if neg { now - dur } else { now + dur });
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

pub fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 11, 0, 0, 0).unwrap()
    }

    #[test]
    fn defaults() {
        let config = RunConfig::from_str("tle: iss_tle.txt\n").unwrap();
        assert_eq!(config.orbits, 3);
        assert_eq!(config.workers, 1);
        assert!(config.output.csv.is_none());

        let plan = config.sampling_plan(now()).unwrap();
        assert_eq!(plan.start, now());
        assert_eq!(plan.duration, Duration::hours(6));
        assert_eq!(plan.step, Duration::minutes(5));
        assert_eq!(plan.epochs().unwrap().len(), 73);
    }

    #[test]
    fn full_config() {
        let yaml = r#"
tle: data/iss.tle
start: 2026-01-11T06:00:00Z
duration: 24h
step: 30m
orbits: 5
period_minutes: 92.7
workers: 4
output:
  csv: out/results.csv
  track: out/track.json
"#;
        let config = RunConfig::from_str(yaml).unwrap();
        assert_eq!(config.period_minutes, Some(92.7));
        assert_eq!(config.output.track, Some(PathBuf::from("out/track.json")));

        let plan = config.sampling_plan(now()).unwrap();
        assert_eq!(plan.start, now() + Duration::hours(6));
        assert_eq!(plan.workers, 4);
        assert_eq!(plan.epochs().unwrap().len(), 49);
    }

    #[test]
    fn relative_start() {
        assert_eq!(parse_start("T+10m", now()).unwrap(), now() + Duration::minutes(10));
        assert_eq!(parse_start("t-1h", now()).unwrap(), now() - Duration::hours(1));
        assert_eq!(parse_start("now", now()).unwrap(), now());
        assert!(parse_start("yesterday", now()).is_err());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            RunConfig::from_str("tle: a\nstep: 0s\n"),
            Err(ConfigError::Invalid { field: "step", .. })
        ));
        assert!(matches!(
            RunConfig::from_str("tle: a\nduration: forever\n"),
            Err(ConfigError::Invalid { field: "duration", .. })
        ));
        assert!(matches!(
            RunConfig::from_str("tle: a\norbits: 0\n"),
            Err(ConfigError::Invalid { field: "orbits", .. })
        ));
        assert!(matches!(
            RunConfig::from_str("tle: a\nperiod_minutes: -3\n"),
            Err(ConfigError::Invalid { field: "period_minutes", .. })
        ));
        assert!(matches!(
            RunConfig::from_str("duration: 1h\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn resolves_relative_paths() {
        let mut config = RunConfig::from_str("tle: iss.tle\noutput:\n  csv: out.csv\n").unwrap();
        config.resolve_paths(Path::new("/srv/runs"));
        assert_eq!(config.tle, PathBuf::from("/srv/runs/iss.tle"));
        assert_eq!(config.output.csv, Some(PathBuf::from("/srv/runs/out.csv")));

        let mut config = RunConfig::from_str("tle: /abs/iss.tle\n").unwrap();
        config.resolve_paths(Path::new("/srv/runs"));
        assert_eq!(config.tle, PathBuf::from("/abs/iss.tle"));
    }
}

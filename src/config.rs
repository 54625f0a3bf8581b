//! Report settings from the environment or a JSON file.
//!
//! Every field has a default. Mail settings are only needed for `--email`.

use anyhow::{Context, Result, anyhow, ensure};
use chrono::FixedOffset;
use serde::Deserialize;

use crate::colour::{ColourScale, DEFAULT_SATURATION_CAP};
use crate::zone::ReportZone;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// IANA zone name, e.g. `America/Chicago`.
    pub zone: String,
    /// Label shown when `zone` cannot be resolved.
    pub fallback_zone: String,
    /// Seconds east of UTC for the fallback zone.
    pub fallback_offset_secs: i32,
    /// Rows (hours) requested from the feed.
    pub hours: u32,
    pub saturation_cap: f64,
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_user: String,
    pub smtp_password: String,
    pub from: String,
    pub to: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            zone: "America/Chicago".to_string(),
            fallback_zone: "Austin".to_string(),
            fallback_offset_secs: -6 * 60 * 60,
            hours: 24,
            saturation_cap: DEFAULT_SATURATION_CAP,
            mail: None,
        }
    }
}

impl ReportConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let cfg: Self = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file '{path}'"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(zone) = lookup("REPORT_ZONE") {
            cfg.zone = zone;
        }
        if let Some(label) = lookup("REPORT_FALLBACK_ZONE") {
            cfg.fallback_zone = label;
        }
        if let Some(v) = lookup("REPORT_FALLBACK_OFFSET_SECS") {
            cfg.fallback_offset_secs = v
                .parse()
                .with_context(|| format!("REPORT_FALLBACK_OFFSET_SECS is not an integer: {v}"))?;
        }
        if let Some(v) = lookup("REPORT_HOURS") {
            cfg.hours = v
                .parse()
                .with_context(|| format!("REPORT_HOURS is not an integer: {v}"))?;
        }
        if let Some(v) = lookup("SATURATION_CAP") {
            cfg.saturation_cap = v
                .parse()
                .with_context(|| format!("SATURATION_CAP is not a number: {v}"))?;
        }

        cfg.mail = match lookup("SMTP_HOST") {
            Some(smtp_host) => {
                let required = |key: &str| {
                    lookup(key).ok_or_else(|| anyhow!("{key} must be set when SMTP_HOST is set"))
                };
                Some(MailConfig {
                    smtp_host,
                    smtp_user: required("SMTP_USER")?,
                    smtp_password: required("SMTP_PASSWORD")?,
                    from: required("MAIL_FROM")?,
                    to: required("MAIL_TO")?,
                })
            }
            None => None,
        };

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.hours > 0, "hours must be at least 1");
        ensure!(
            self.saturation_cap.is_finite() && self.saturation_cap > 0.0,
            "saturation cap must be a positive number, got {}",
            self.saturation_cap
        );
        self.fallback_offset()?;
        Ok(())
    }

    pub fn fallback_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.fallback_offset_secs).ok_or_else(|| {
            anyhow!(
                "fallback offset {} seconds is out of range",
                self.fallback_offset_secs
            )
        })
    }

    pub fn report_zone(&self) -> Result<ReportZone> {
        Ok(ReportZone::resolve(
            &self.zone,
            &self.fallback_zone,
            self.fallback_offset()?,
        ))
    }

    pub fn colour_scale(&self) -> ColourScale {
        ColourScale::with_cap(self.saturation_cap)
    }
}

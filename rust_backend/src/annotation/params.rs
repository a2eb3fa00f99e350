//! Invocation parameters and their validation.
//!
//! [`AnnotateParams`] carries the raw values handed over by the host (`source`,
//! `pattern`, `geo`, `timezone`). [`AnnotateParams::resolve`] validates them into a
//! [`ResolvedParams`] before any record is read.

use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::AnnotateConfig;
use crate::error::{AnnotationError, AnnotationResult};
use crate::parsing::filepath::TimestampPattern;
use crate::solar::GeoCoordinate;
use crate::time::zone::resolve_timezone;

/// Where each record's timestamp comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampSource {
    #[serde(rename = "filepath")]
    Filepath,
    #[serde(rename = "createdAt")]
    CreatedAt,
}

impl TimestampSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampSource::Filepath => "filepath",
            TimestampSource::CreatedAt => "createdAt",
        }
    }
}

impl fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimestampSource {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filepath" => Ok(TimestampSource::Filepath),
            "createdAt" => Ok(TimestampSource::CreatedAt),
            other => Err(AnnotationError::invalid_configuration(format!(
                "parameters not allowed: unknown source '{}' (expected 'filepath' or 'createdAt')",
                other
            ))),
        }
    }
}

/// Raw invocation parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotateParams {
    pub source: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub geo: Option<Vec<f64>>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl AnnotateParams {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_geo(mut self, geo: Vec<f64>) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Validate the parameters.
    ///
    /// `filepath` requires a pattern; `createdAt` ignores one. The timezone falls back to
    /// `config.timezone`. A `geo` that is not a two-element sequence disables day phases.
    ///
    /// # Errors
    /// [`AnnotationError::InvalidConfiguration`] for any other source/pattern combination,
    /// an invalid pattern, an unknown timezone or out-of-range coordinates.
    pub fn resolve(&self, config: &AnnotateConfig) -> AnnotationResult<ResolvedParams> {
        let source = match (self.source.parse::<TimestampSource>()?, &self.pattern) {
            (TimestampSource::Filepath, Some(pattern)) => {
                SourcePlan::Filepath(TimestampPattern::new(pattern)?)
            }
            (TimestampSource::Filepath, None) => {
                return Err(AnnotationError::invalid_configuration(
                    "parameters not allowed: source 'filepath' requires a pattern",
                ))
            }
            (TimestampSource::CreatedAt, _) => SourcePlan::CreatedAt,
        };

        let zone_name = self.timezone.as_deref().unwrap_or(&config.timezone);
        let zone = resolve_timezone(zone_name)?;

        let geo = match &self.geo {
            Some(values) => GeoCoordinate::from_slice(values)?,
            None => None,
        };

        Ok(ResolvedParams { source, zone, geo })
    }
}

/// Validated timestamp source.
#[derive(Debug, Clone)]
pub enum SourcePlan {
    Filepath(TimestampPattern),
    CreatedAt,
}

impl SourcePlan {
    pub fn source(&self) -> TimestampSource {
        match self {
            SourcePlan::Filepath(_) => TimestampSource::Filepath,
            SourcePlan::CreatedAt => TimestampSource::CreatedAt,
        }
    }
}

/// Parameters after validation.
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    pub source: SourcePlan,
    pub zone: Tz,
    pub geo: Option<GeoCoordinate>,
}

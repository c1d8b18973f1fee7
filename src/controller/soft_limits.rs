//! Pre-execution envelope check
//!
//! A table mapping axis -> `(min, max)` in machine-space mm, checked inside
//! the Controller's step phase immediately before `executor.execute`.

use crate::config::SoftLimitsConfig;
use crate::error::{Error, Result};
use crate::primitive::{MotionPrimitive, PrimitiveKind};

/// Envelope check against configured per-axis soft limits.
pub struct SoftLimits {
    config: SoftLimitsConfig,
}

impl SoftLimits {
    /// Build a checker from configuration.
    pub fn new(config: SoftLimitsConfig) -> Self {
        Self { config }
    }

    /// Validate both endpoints of `primitive` against the configured
    /// per-axis bounds. Rapids are checked unless `check_rapids` is false.
    pub fn check(&self, primitive: &MotionPrimitive) -> Result<()> {
        if primitive.kind == PrimitiveKind::Rapid && !self.config.check_rapids {
            return Ok(());
        }

        self.check_point(primitive.line_number, "X", primitive.start.x)?;
        self.check_point(primitive.line_number, "X", primitive.end.x)?;
        self.check_point(primitive.line_number, "Y", primitive.start.y)?;
        self.check_point(primitive.line_number, "Y", primitive.end.y)?;
        self.check_point(primitive.line_number, "Z", primitive.start.z)?;
        self.check_point(primitive.line_number, "Z", primitive.end.z)?;
        Ok(())
    }

    fn check_point(&self, line_number: u32, axis: &str, value: f64) -> Result<()> {
        if let Some(&(min, max)) = self.config.bounds.get(axis) {
            if value < min || value > max {
                return Err(Error::SoftLimitViolation {
                    line_number: Some(line_number),
                    axis: axis.to_string(),
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

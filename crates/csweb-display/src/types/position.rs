//! Widget positions.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::StructuralError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionType {
    Absolute,
    Relative,
}

/// CSS-length position of a widget. Relative positions leave x and y empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub x: SmolStr,
    pub y: SmolStr,
    pub width: SmolStr,
    pub height: SmolStr,
    pub margin: SmolStr,
    pub padding: SmolStr,
    pub min_width: SmolStr,
    pub max_width: SmolStr,
    pub min_height: SmolStr,
    pub position_type: PositionType,
}

/// Optional box constraints shared by both position kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxConstraints {
    pub margin: SmolStr,
    pub padding: SmolStr,
    pub min_width: SmolStr,
    pub max_width: SmolStr,
    pub min_height: SmolStr,
}

impl Position {
    /// Absolute position; every coordinate and size must be non-empty.
    pub fn absolute(
        x: impl Into<SmolStr>,
        y: impl Into<SmolStr>,
        width: impl Into<SmolStr>,
        height: impl Into<SmolStr>,
    ) -> Result<Self, StructuralError> {
        Self::absolute_with(x, y, width, height, BoxConstraints::default())
    }

    pub fn absolute_with(
        x: impl Into<SmolStr>,
        y: impl Into<SmolStr>,
        width: impl Into<SmolStr>,
        height: impl Into<SmolStr>,
        constraints: BoxConstraints,
    ) -> Result<Self, StructuralError> {
        let (x, y, width, height) = (x.into(), y.into(), width.into(), height.into());
        if x.is_empty() || y.is_empty() || width.is_empty() || height.is_empty() {
            return Err(StructuralError::InvalidPosition {
                x,
                y,
                width,
                height,
            });
        }
        Ok(Self::build(
            x,
            y,
            width,
            height,
            constraints,
            PositionType::Absolute,
        ))
    }

    #[must_use]
    pub fn relative(width: impl Into<SmolStr>, height: impl Into<SmolStr>) -> Self {
        Self::relative_with(width, height, BoxConstraints::default())
    }

    #[must_use]
    pub fn relative_with(
        width: impl Into<SmolStr>,
        height: impl Into<SmolStr>,
        constraints: BoxConstraints,
    ) -> Self {
        Self::build(
            SmolStr::default(),
            SmolStr::default(),
            width.into(),
            height.into(),
            constraints,
            PositionType::Relative,
        )
    }

    fn build(
        x: SmolStr,
        y: SmolStr,
        width: SmolStr,
        height: SmolStr,
        constraints: BoxConstraints,
        position_type: PositionType,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            margin: constraints.margin,
            padding: constraints.padding,
            min_width: constraints.min_width,
            max_width: constraints.max_width,
            min_height: constraints.min_height,
            position_type,
        }
    }

    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.position_type == PositionType::Relative
    }

    /// Same sizes, converted to a relative position with x and y dropped.
    #[must_use]
    pub fn into_relative(self) -> Self {
        Self {
            x: SmolStr::default(),
            y: SmolStr::default(),
            position_type: PositionType::Relative,
            ..self
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position_type {
            PositionType::Relative => {
                write!(f, "RelativePosition ({},{})", self.width, self.height)
            }
            PositionType::Absolute => write!(
                f,
                "AbsolutePosition ({},{},{},{})",
                self.x, self.y, self.width, self.height
            ),
        }
    }
}

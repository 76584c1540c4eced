use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Points {
    pub values: Vec<Point>,
}

impl Points {
    #[must_use]
    pub fn new(values: Vec<Point>) -> Self {
        Self { values }
    }
}

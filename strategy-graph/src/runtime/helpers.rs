//! Small stateful and stateless building blocks used by generated code

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

const EPSILON: f64 = 1e-9;

/// Compare two numbers with a `select` operator; NaN on either side is false
pub fn compare(a: f64, operator: &str, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    match operator {
        ">" => a > b,
        "<" => a < b,
        ">=" => a >= b,
        "<=" => a <= b,
        "==" => (a - b).abs() < EPSILON,
        "!=" => (a - b).abs() >= EPSILON,
        _ => false,
    }
}

/// Apply a `math` block operation; division by zero yields NaN
pub fn arithmetic(operation: &str, a: f64, b: f64) -> f64 {
    match operation {
        "add" => a + b,
        "subtract" => a - b,
        "multiply" => a * b,
        "divide" if b.abs() < EPSILON => f64::NAN,
        "divide" => a / b,
        "min" => a.min(b),
        "max" => a.max(b),
        _ => f64::NAN,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossDirection {
    Above,
    Below,
}

/// Detects the tick on which a fast series crosses a slow one
#[derive(Debug, Clone)]
pub struct Crossover {
    direction: CrossDirection,
    previous_diff: Option<f64>,
}

impl Crossover {
    /// `direction` is the `select` value: "below" or anything else for above
    pub fn new(direction: &str) -> Self {
        let direction = if direction.eq_ignore_ascii_case("below") {
            CrossDirection::Below
        } else {
            CrossDirection::Above
        };
        Self {
            direction,
            previous_diff: None,
        }
    }

    pub fn update(&mut self, fast: f64, slow: f64) -> bool {
        let diff = fast - slow;
        if diff.is_nan() {
            self.previous_diff = None;
            return false;
        }
        let crossed = match (self.previous_diff, self.direction) {
            (Some(prev), CrossDirection::Above) => prev <= 0.0 && diff > 0.0,
            (Some(prev), CrossDirection::Below) => prev >= 0.0 && diff < 0.0,
            (None, _) => false,
        };
        self.previous_diff = Some(diff);
        crossed
    }
}

/// Minimum spacing between orders emitted by one action block
#[derive(Debug, Clone)]
pub struct Cooldown {
    seconds: f64,
    last_fired: Option<DateTime<Utc>>,
}

impl Cooldown {
    pub fn new(seconds: f64) -> Self {
        Self {
            seconds: if seconds.is_finite() { seconds.max(0.0) } else { 0.0 },
            last_fired: None,
        }
    }

    pub fn ready(&self, now: DateTime<Utc>) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => (now - last).num_milliseconds() as f64 >= self.seconds * 1000.0,
        }
    }

    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.last_fired = Some(now);
    }

    pub fn last_fired(&self) -> Option<DateTime<Utc>> {
        self.last_fired
    }
}

/// Rolling window of the most recent values
#[derive(Debug, Clone)]
pub struct Window {
    capacity: usize,
    values: VecDeque<f64>,
}

impl Window {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Oldest first
    pub fn values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Emit the value reaching a `log` block through `tracing`
pub fn log_value(block_id: &str, level: &str, message: &str, value: &str) {
    match level {
        "warn" => tracing::warn!(block_id, value, "{}", message),
        "debug" => tracing::debug!(block_id, value, "{}", message),
        _ => tracing::info!(block_id, value, "{}", message),
    }
}

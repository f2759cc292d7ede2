//! Model parameters and their key/value file format.
//!
//! Parameter files use a properties-style layout:
//!
//! ```text
//! # reference 100x100 profile
//! INIT_SHEEP=400
//! SHEEP_GAIN_FROM_FOOD=4
//! GRID_X: 100
//! ```
//!
//! Blank lines and lines starting with `#` or `!` are ignored. Every key
//! in [`ModelParams::KEYS`] is required; unknown keys are ignored; a
//! repeated key keeps its last value.

use std::path::Path;

use indexmap::IndexMap;

use crate::agent::AgentKind;
use crate::error::ParamsError;

/// Ecological and grid parameters for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelParams {
    /// Initial number of sheep. Default: 400.
    pub init_sheep: u32,
    /// Energy a sheep gains from eating grass. Default: 4.
    pub sheep_gain_from_food: u32,
    /// Energy a sheep must exceed to reproduce. Default: 2.
    pub sheep_reproduce_threshold: u32,
    /// Sheep reproduction probability, in percent. Default: 4.
    pub sheep_reproduce_prob: u32,
    /// Initial number of wolves. Default: 200.
    pub init_wolves: u32,
    /// Energy a wolf gains from eating a sheep. Default: 20.
    pub wolves_gain_from_food: u32,
    /// Energy a wolf must exceed to reproduce. Default: 2.
    pub wolves_reproduce_threshold: u32,
    /// Wolf reproduction probability, in percent. Default: 5.
    pub wolves_reproduce_prob: u32,
    /// Ticks for eaten grass to regrow. Default: 10.
    pub grass_restart: u32,
    /// Grid width (cells per row). Default: 100.
    pub grid_x: u32,
    /// Grid height (rows). Default: 100.
    pub grid_y: u32,
    /// Number of iterations after initialisation. Default: 4000.
    pub iters: u32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            init_sheep: 400,
            sheep_gain_from_food: 4,
            sheep_reproduce_threshold: 2,
            sheep_reproduce_prob: 4,
            init_wolves: 200,
            wolves_gain_from_food: 20,
            wolves_reproduce_threshold: 2,
            wolves_reproduce_prob: 5,
            grass_restart: 10,
            grid_x: 100,
            grid_y: 100,
            iters: 4000,
        }
    }
}

impl ModelParams {
    /// Every recognised key, in canonical file order.
    pub const KEYS: [&'static str; 12] = [
        "INIT_SHEEP",
        "SHEEP_GAIN_FROM_FOOD",
        "SHEEP_REPRODUCE_THRESHOLD",
        "SHEEP_REPRODUCE_PROB",
        "INIT_WOLVES",
        "WOLVES_GAIN_FROM_FOOD",
        "WOLVES_REPRODUCE_THRESHOLD",
        "WOLVES_REPRODUCE_PROB",
        "GRASS_RESTART",
        "GRID_X",
        "GRID_Y",
        "ITERS",
    ];

    /// Largest gain accepted; keeps `1 + 2 * gain` and energy sums in `i32`.
    pub const MAX_GAIN: u32 = (i32::MAX as u32) / 4;

    /// Parse and validate a parameter file's contents.
    pub fn parse(source: &str) -> Result<Self, ParamsError> {
        let mut raw: IndexMap<&str, &str> = IndexMap::new();
        for (i, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some(split) = line.find(['=', ':']) else {
                return Err(ParamsError::Malformed {
                    line: i + 1,
                    content: line.to_string(),
                });
            };
            raw.insert(line[..split].trim(), line[split + 1..].trim());
        }

        let get = |key: &'static str| -> Result<u32, ParamsError> {
            let value = raw.get(key).ok_or(ParamsError::Missing { key })?;
            value.parse::<u32>().map_err(|_| ParamsError::Invalid {
                key,
                value: value.to_string(),
            })
        };

        let params = Self {
            init_sheep: get("INIT_SHEEP")?,
            sheep_gain_from_food: get("SHEEP_GAIN_FROM_FOOD")?,
            sheep_reproduce_threshold: get("SHEEP_REPRODUCE_THRESHOLD")?,
            sheep_reproduce_prob: get("SHEEP_REPRODUCE_PROB")?,
            init_wolves: get("INIT_WOLVES")?,
            wolves_gain_from_food: get("WOLVES_GAIN_FROM_FOOD")?,
            wolves_reproduce_threshold: get("WOLVES_REPRODUCE_THRESHOLD")?,
            wolves_reproduce_prob: get("WOLVES_REPRODUCE_PROB")?,
            grass_restart: get("GRASS_RESTART")?,
            grid_x: get("GRID_X")?,
            grid_y: get("GRID_Y")?,
            iters: get("ITERS")?,
        };
        params.validate()?;
        Ok(params)
    }

    /// Read, parse and validate a parameter file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ParamsError::Io {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::parse(&source)
    }

    /// Check the model constraints.
    pub fn validate(&self) -> Result<(), ParamsError> {
        // 1. Grid must be non-empty and indexable with u32.
        if self.grid_x == 0 {
            return Err(out_of_range("GRID_X", "must be at least 1"));
        }
        if self.grid_y == 0 {
            return Err(out_of_range("GRID_Y", "must be at least 1"));
        }
        if u32::try_from(self.cell_count()).is_err() {
            return Err(out_of_range("GRID_Y", "GRID_X * GRID_Y exceeds u32::MAX"));
        }
        // 2. Gains seed initial energy as 1 + rand(2 * gain).
        for (key, gain) in [
            ("SHEEP_GAIN_FROM_FOOD", self.sheep_gain_from_food),
            ("WOLVES_GAIN_FROM_FOOD", self.wolves_gain_from_food),
        ] {
            if gain == 0 || gain > Self::MAX_GAIN {
                return Err(out_of_range(
                    key,
                    &format!("must be in 1..={}", Self::MAX_GAIN),
                ));
            }
        }
        // 3. Probabilities are percentages.
        for (key, prob) in [
            ("SHEEP_REPRODUCE_PROB", self.sheep_reproduce_prob),
            ("WOLVES_REPRODUCE_PROB", self.wolves_reproduce_prob),
        ] {
            if prob > 100 {
                return Err(out_of_range(key, "must be in 0..=100"));
            }
        }
        // 4. Grass restart is the upper bound of the initial countdown draw.
        if self.grass_restart == 0 {
            return Err(out_of_range("GRASS_RESTART", "must be at least 1"));
        }
        if self.grass_restart > i32::MAX as u32 {
            return Err(out_of_range("GRASS_RESTART", "exceeds i32::MAX"));
        }
        Ok(())
    }

    /// Number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.grid_x as usize * self.grid_y as usize
    }

    /// Initial population of `kind`.
    pub fn initial_count(&self, kind: AgentKind) -> u32 {
        match kind {
            AgentKind::Sheep => self.init_sheep,
            AgentKind::Wolf => self.init_wolves,
        }
    }

    /// Energy gained by `kind` when eating.
    pub fn gain_from_food(&self, kind: AgentKind) -> i32 {
        let gain = match kind {
            AgentKind::Sheep => self.sheep_gain_from_food,
            AgentKind::Wolf => self.wolves_gain_from_food,
        };
        gain.min(Self::MAX_GAIN) as i32
    }

    /// Energy `kind` must exceed before it may reproduce.
    pub fn reproduce_threshold(&self, kind: AgentKind) -> i64 {
        i64::from(match kind {
            AgentKind::Sheep => self.sheep_reproduce_threshold,
            AgentKind::Wolf => self.wolves_reproduce_threshold,
        })
    }

    /// Reproduction probability of `kind`, in percent.
    pub fn reproduce_prob(&self, kind: AgentKind) -> u32 {
        match kind {
            AgentKind::Sheep => self.sheep_reproduce_prob,
            AgentKind::Wolf => self.wolves_reproduce_prob,
        }
    }

    /// Render the parameters in the file format accepted by [`parse`](Self::parse).
    pub fn to_properties(&self) -> String {
        let values = [
            self.init_sheep,
            self.sheep_gain_from_food,
            self.sheep_reproduce_threshold,
            self.sheep_reproduce_prob,
            self.init_wolves,
            self.wolves_gain_from_food,
            self.wolves_reproduce_threshold,
            self.wolves_reproduce_prob,
            self.grass_restart,
            self.grid_x,
            self.grid_y,
            self.iters,
        ];
        Self::KEYS
            .iter()
            .zip(values)
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }
}

fn out_of_range(key: &'static str, reason: &str) -> ParamsError {
    ParamsError::OutOfRange {
        key,
        reason: reason.to_string(),
    }
}

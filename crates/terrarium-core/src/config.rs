//! Configuration types for the simulation.

use crate::types::Ruleset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Energy economy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Energy gained by a successful grow action
    pub grow_amount: f32,
    /// Energy cost of a successful move
    pub move_cost: f32,
    /// Moving requires more energy than this
    pub move_min_energy: f32,
    /// Energy lost on an idle or failed turn
    pub idle_decay: f32,
    /// Starting energy for a new plant
    pub plant_initial_energy: f32,
    /// Plants reproduce above this energy
    pub plant_reproduce_threshold: f32,
    /// Plants grow below this energy
    pub plant_grow_ceiling: f32,
    /// Starting energy for a new herbivore
    pub herbivore_initial_energy: f32,
    /// Herbivores reproduce above this energy
    pub herbivore_reproduce_threshold: f32,
    /// Herbivores become hungry below this energy
    pub herbivore_hunger_threshold: f32,
    /// Chance that a herbivore keeps moving along a clear facing direction
    pub move_probability: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            grow_amount: 0.5,
            move_cost: 0.3,
            move_min_energy: 1.0,
            idle_decay: 0.1,
            plant_initial_energy: 7.5,
            plant_reproduce_threshold: 15.0,
            plant_grow_ceiling: 20.0,
            herbivore_initial_energy: 20.0,
            herbivore_reproduce_threshold: 60.0,
            herbivore_hunger_threshold: 23.0,
            move_probability: 0.9,
        }
    }
}

/// Inputs for the random valley generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValleyConfig {
    /// Interior width, excluding the one-cell wall border
    pub width: usize,
    /// Interior height, excluding the one-cell wall border
    pub height: usize,
    /// Requested number of entities per symbol
    pub counts: BTreeMap<char, usize>,
}

impl Default for ValleyConfig {
    fn default() -> Self {
        let mut counts = BTreeMap::new();
        counts.insert('#', 15);
        counts.insert('o', 15);
        counts.insert('*', 25);

        Self {
            width: 50,
            height: 20,
            counts,
        }
    }
}

/// Top-level simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Maximum number of turns a run may last
    pub max_turns: u64,
    /// Resolution policy
    pub ruleset: Ruleset,
    /// Energy economy parameters
    pub energy: EnergyConfig,
    /// Valley generator inputs
    pub valley: ValleyConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_turns: 10_000,
            ruleset: Ruleset::Lifelike,
            energy: EnergyConfig::default(),
            valley: ValleyConfig::default(),
        }
    }
}

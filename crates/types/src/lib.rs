use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq, Hash, Ord, PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(ProjectName);
id_newtype!(SlotCode);
id_newtype!(Username);

fn default_level() -> u8 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSpec {
    #[serde(default)]
    pub responsables: Vec<Username>,
    #[serde(default)]
    pub votes: Vec<Username>,
    #[serde(default = "default_level")]
    pub difficult_level: u8,
    #[serde(default)]
    pub theme: Option<String>,
    /// Carried through untouched; no cost term reads it.
    #[serde(default)]
    pub priority_slots: Vec<SlotCode>,
}

impl Default for ProjectSpec {
    fn default() -> Self {
        Self {
            responsables: Vec::new(),
            votes: Vec::new(),
            difficult_level: default_level(),
            theme: None,
            priority_slots: Vec::new(),
        }
    }
}

/// Read-only export of the event data the optimizer works on.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: BTreeMap<ProjectName, ProjectSpec>,
    #[serde(default)]
    pub available_slots: Vec<SlotCode>,
    #[serde(default)]
    pub responsable_available_slots: BTreeMap<Username, Vec<SlotCode>>,
}

impl Snapshot {
    pub fn slot_set(&self) -> HashSet<&SlotCode> {
        self.available_slots.iter().collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct CostWeights {
    #[serde(default = "CostWeights::default_voter_overlap")]
    pub voter_overlap: u32,
    #[serde(default = "CostWeights::default_same_difficulty")]
    pub same_difficulty: u32,
    #[serde(default = "CostWeights::default_same_theme")]
    pub same_theme: u32,
    #[serde(default = "CostWeights::default_slot_population")]
    pub slot_population: u32,
    #[serde(default = "CostWeights::default_most_voted")]
    pub most_voted: u32,
}

impl CostWeights {
    fn default_voter_overlap() -> u32 {
        10
    }
    fn default_same_difficulty() -> u32 {
        5
    }
    fn default_same_theme() -> u32 {
        5
    }
    fn default_slot_population() -> u32 {
        1
    }
    fn default_most_voted() -> u32 {
        1
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            voter_overlap: Self::default_voter_overlap(),
            same_difficulty: Self::default_same_difficulty(),
            same_theme: Self::default_same_theme(),
            slot_population: Self::default_slot_population(),
            most_voted: Self::default_most_voted(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Default)]
pub struct Policy {
    #[serde(default)]
    pub weights: CostWeights,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Default)]
pub struct SolveParams {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub max_iterations: Option<usize>,
    #[serde(default)]
    pub time_limit_sec: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Eq, PartialEq)]
pub struct Assignment {
    pub project: ProjectName,
    pub slot: SlotCode,
}

impl Assignment {
    pub fn new(project: impl Into<ProjectName>, slot: impl Into<SlotCode>) -> Self {
        Self {
            project: project.into(),
            slot: slot.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct ScheduleResult {
    pub status: String,
    pub score: i64,
    pub hard_violations: u64,
    pub assignments: Vec<Assignment>,
    pub stats: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Default)]
pub struct SolveEnvelope {
    pub snapshot: Snapshot,
    #[serde(default)]
    pub params: SolveParams,
    #[serde(default)]
    pub policy: Policy,
    /// Existing schedule to start from instead of a random one.
    #[serde(default)]
    pub base: Vec<Assignment>,
}

pub fn snapshot_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(Snapshot)
}

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global_routing: GlobalRoutingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which occupant of an over-capacity edge is ripped up first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RipupPolicy {
    /// The net that reserved the edge last.
    #[default]
    MostRecent,
    /// The net that reserved the edge first.
    LeastRecent,
}

/// Order in which ripped-up nets are handed to the maze router, keyed by
/// their overflow ledger value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerouteOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalRoutingConfig {
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    #[serde(default)]
    pub ripup_policy: RipupPolicy,
    #[serde(default)]
    pub reroute_order: RerouteOrder,
}

impl Default for GlobalRoutingConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            ripup_policy: RipupPolicy::default(),
            reroute_order: RerouteOrder::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_design_file")]
    pub design_file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            design_file: default_design_file(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_route_file")]
    pub route_file: String,
    #[serde(default)]
    pub heatmap: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            route_file: default_route_file(),
            heatmap: None,
        }
    }
}

fn default_max_rounds() -> usize {
    1
}

fn default_design_file() -> String {
    "inputs/design.gr".to_string()
}

fn default_route_file() -> String {
    "output/routes.txt".to_string()
}

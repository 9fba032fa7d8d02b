/// Project root under which generation logs are stored by default
pub const METRIC_EVOLVE_DIR: &str = "METRIC_EVOLVE_DIR";

/// Per-evaluation and per-generation timing traces; any value but "0" enables them
pub const METRIC_EVOLVE_TIMING: &str = "METRIC_EVOLVE_TIMING";

/// Location of generation logs relative to the project root
pub const RECORDS_SUBDIR: [&str; 2] = ["data_generated", "records"];

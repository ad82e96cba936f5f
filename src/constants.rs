// -
// Administrative command names

/// Namespace every administrative command is issued against
pub const ADMIN_NAMESPACE: &str = "admin.$cmd";

pub const REPL_SET_INITIATE: &str = "replSetInitiate";
pub const REPL_SET_GET_STATUS: &str = "replSetGetStatus";
pub const REPL_SET_STEP_DOWN: &str = "replSetStepDown";

// -
// Member state codes reported by `replSetGetStatus`

pub const STATE_PRIMARY: i32 = 1;
pub const STATE_SECONDARY: i32 = 2;
pub const STATE_ARBITER: i32 = 7;

// -
// Topology defaults

pub(crate) const DEFAULT_REPL_SET_NAME: &str = "rs";
pub(crate) const DEFAULT_HOST: &str = "localhost";
pub(crate) const DEFAULT_START_PORT: u16 = 31000;
pub(crate) const DEFAULT_SECONDARIES: usize = 2;
pub(crate) const DEFAULT_BIN: &str = "mongod";

/// Per-node data directory prefix, joined with the node port
pub(crate) const DATA_DIR_PREFIX: &str = "data-";
pub(crate) const LOG_FILE_SUFFIX: &str = ".log";

/// Membership documents start at this version
pub(crate) const INITIAL_CONFIG_VERSION: u64 = 1;

/// Options that steer the orchestrator and never reach a node process
pub(crate) const ORCHESTRATOR_ONLY_OPTIONS: &[&str] =
    &["bin", "host", "secondaries", "arbiters", "start_port", "startPort"];

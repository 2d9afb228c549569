// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "RunLens";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "runlens";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".runlens";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "runlens.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "RUNLENS_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "RUNLENS_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "RUNLENS_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "RUNLENS_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 3000;

/// Default log filter when neither RUNLENS_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,runlens=info";

/// Default body limit for dashboard API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "RUNLENS_DATA_DIR";

/// Environment variable for the orphan span policy (`store` or `drop`)
pub const ENV_ORPHAN_SPANS: &str = "RUNLENS_ORPHAN_SPANS";

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "runlens.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// OpenTelemetry Intake
// =============================================================================

/// Environment variable to enable/disable the OTLP gRPC server
pub const ENV_OTEL_GRPC_ENABLED: &str = "RUNLENS_OTEL_GRPC_ENABLED";

/// Environment variable for the OTLP gRPC port
pub const ENV_OTEL_GRPC_PORT: &str = "RUNLENS_OTEL_GRPC_PORT";

/// Default OTLP gRPC port (standard OTLP port)
pub const DEFAULT_OTEL_GRPC_PORT: u16 = 4317;

/// Default OTLP body limit (10 MB), applied to HTTP bodies and gRPC messages
pub const DEFAULT_OTLP_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Retry-After header value (seconds) when span storage is unavailable
pub const STORE_UNAVAILABLE_RETRY_AFTER_SECS: u64 = 5;

// =============================================================================
// Run Rooms
// =============================================================================

/// Prefix of the broadcast room a run's spans are published to
pub const RUN_ROOM_PREFIX: &str = "run-";

/// Buffered messages per room before slow subscribers start lagging
pub const ROOM_CHANNEL_CAPACITY: usize = 1024;

/// SSE keep-alive interval in seconds
pub const SSE_KEEPALIVE_SECS: u64 = 30;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

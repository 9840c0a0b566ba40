/// Seconds a cached read stays fresh.
pub const DEFAULT_STALE_TIME_SECS: u64 = 300;

/// Retries for failed reads.
pub const DEFAULT_QUERY_RETRY: u32 = 2;

/// Base backoff between read retries.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Upper bound for read retry backoff.
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// Display currency for amounts.
pub const DISPLAY_CURRENCY: &str = "CAD";

/// Currency symbol used when rendering amounts.
pub const CURRENCY_SYMBOL: &str = "$";

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

// Monitor constants (no magic values)
use std::time::Duration;

/// Sleep after a transport error before the next receive attempt (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);

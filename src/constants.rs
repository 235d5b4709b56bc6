//! Application-wide constants

/// Default username displayed for unauthenticated users
pub const GUEST_USERNAME: &str = "Guest";

/// Name shown in place of the student on anonymous complaints
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Severity stored when the form leaves it empty
pub const DEFAULT_SEVERITY: &str = "Medium";

/// Status of every newly filed complaint
pub const DEFAULT_COMPLAINT_STATUS: &str = "Pending";

/// Poll created on first visit to /polls when none exist
pub const SAMPLE_POLL_QUESTION: &str = "Should strict action be taken against ragging?";
pub const SAMPLE_POLL_OPTIONS: [&str; 4] = [
    "Yes, strict punishment",
    "No, only counseling",
    "Maybe, depends on severity",
    "Not sure",
];

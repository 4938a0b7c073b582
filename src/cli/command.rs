use std::path::PathBuf;

use crate::query::OverviewParams;

/// Offline operations against the configured store. Serving is started by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Seed {
        file: PathBuf,
        format: Option<String>,
        append: bool,
    },
    Count,
    Overview(OverviewParams),
    Get {
        id: String,
    },
    Delete {
        id: String,
    },
    ErrorLogs {
        page: Option<String>,
        page_size: Option<String>,
    },
    ClearErrorLogs {
        before: Option<String>,
    },
}

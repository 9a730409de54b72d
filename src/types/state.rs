use std::fmt;

/// Lifecycle of a staged write. Only `Open` accepts writes, `commit` or `abort`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageState {
    Open,
    Committed,
    Aborted,
}

impl StageState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StageState::Open => "open",
            StageState::Committed => "committed",
            StageState::Aborted => "aborted",
        }
    }
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

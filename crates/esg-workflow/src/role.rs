use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Who is operating the workflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Registers reports and telemetry.
    #[default]
    Submitter,
    /// Attests registered reports.
    Auditor,
    /// Reads status only.
    Viewer,
}

/// A state-changing or reading step of the workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Register,
    Attest,
    Query,
}

impl Role {
    pub fn permits(&self, action: Action) -> bool {
        matches!(
            (self, action),
            (_, Action::Query) | (Role::Submitter, Action::Register) | (Role::Auditor, Action::Attest)
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitter => write!(f, "submitter"),
            Self::Auditor => write!(f, "auditor"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "submitter" => Ok(Self::Submitter),
            "auditor" => Ok(Self::Auditor),
            "viewer" => Ok(Self::Viewer),
            other => Err(format!("unknown role {other:?} (expected submitter, auditor, or viewer)")),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register => write!(f, "register"),
            Self::Attest => write!(f, "attest"),
            Self::Query => write!(f, "query"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_matrix() {
        assert!(Role::Submitter.permits(Action::Register));
        assert!(!Role::Submitter.permits(Action::Attest));
        assert!(Role::Auditor.permits(Action::Attest));
        assert!(!Role::Auditor.permits(Action::Register));
        assert!(!Role::Viewer.permits(Action::Register));
        assert!(!Role::Viewer.permits(Action::Attest));
        for role in [Role::Submitter, Role::Auditor, Role::Viewer] {
            assert!(role.permits(Action::Query));
        }
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("Auditor".parse::<Role>().unwrap(), Role::Auditor);
        assert_eq!(Role::Viewer.to_string(), "viewer");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Auditor).unwrap(), "\"auditor\"");
        let r: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(r, Role::Viewer);
    }
}

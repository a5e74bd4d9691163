use std::fmt::Display;
use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

const CANONICAL: &str = "canonical";
const REDIRECTION: &str = "redirection";
const ALL: &str = "all";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Drops query, fragment and trailing slashes.
    Canonical,
    /// Lower-cases scheme and path and forces the canonical host.
    Redirection,
    /// `Canonical`, then a fresh parse, then `Redirection`.
    All,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Canonical => write!(f, "{CANONICAL}"),
            Operation::Redirection => write!(f, "{REDIRECTION}"),
            Operation::All => write!(f, "{ALL}"),
        }
    }
}

impl FromStr for Operation {
    type Err = Report<KernelError>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CANONICAL => Ok(Operation::Canonical),
            REDIRECTION => Ok(Operation::Redirection),
            ALL => Ok(Operation::All),
            _ => Err(Report::new(KernelError::InvalidOperation)
                .attach_printable(format!("Unsupported operation: {s}"))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Operation;
    use crate::KernelError;

    #[test]
    fn parse_known_operations() {
        assert_eq!("canonical".parse::<Operation>().ok(), Some(Operation::Canonical));
        assert_eq!("redirection".parse::<Operation>().ok(), Some(Operation::Redirection));
        assert_eq!("all".parse::<Operation>().ok(), Some(Operation::All));
    }

    #[test]
    fn reject_unknown_operation() {
        for op in ["compress", "", "ALL", " canonical"] {
            let report = op.parse::<Operation>().unwrap_err();
            assert_eq!(report.current_context(), &KernelError::InvalidOperation);
        }
    }

    #[test]
    fn display_matches_selector() {
        for op in [Operation::Canonical, Operation::Redirection, Operation::All] {
            assert_eq!(op.to_string().parse::<Operation>().ok(), Some(op));
        }
    }
}

use serde::Serialize;
use std::fmt;

/// A non-fatal event recorded while assembling or annotating a residue.
///
/// Diagnostics are attached to the [`Residue`](super::residue::Residue) they
/// concern so callers can inspect or report them; nothing is printed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// An IC names an atom with no `ATOM` card; the IC was dropped.
    UnresolvedIcAtom { card: String, atom: String },
    /// A bond names an atom with no `ATOM` card; the bond was kept and the
    /// residue's error code set.
    UnresolvedBondAtom { atom1: String, atom2: String },
    /// A second `ATOM` card reused a name; the first declaration was kept.
    DuplicateAtom { atom: String },
    /// A `DELETE` card could not be read as `DELETE ATOM <name>`.
    MalformedDelete { card: String },
    /// A card whose keyword the assembler does not persist.
    IgnoredCard { keyword: String },
    /// The atom charges do not add up to the charge on the title line.
    ChargeMismatch { declared: f64, computed: f64 },
    /// More than one carbon is bonded to an oxygen in a sterol.
    AmbiguousSterolHead {
        candidates: Vec<String>,
        chosen: String,
    },
}

impl Diagnostic {
    /// Whether the event was recorded by annotation rather than assembly.
    pub fn is_annotation_event(&self) -> bool {
        matches!(self, Self::AmbiguousSterolHead { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedIcAtom { card, atom } => {
                write!(f, "IC '{}' references undeclared atom '{}'", card, atom)
            }
            Self::UnresolvedBondAtom { atom1, atom2 } => {
                write!(f, "Bond {}-{} references an undeclared atom", atom1, atom2)
            }
            Self::DuplicateAtom { atom } => write!(f, "Atom '{}' is declared twice", atom),
            Self::MalformedDelete { card } => write!(f, "Malformed DELETE card '{}'", card),
            Self::IgnoredCard { keyword } => write!(f, "Ignored '{}' card", keyword),
            Self::ChargeMismatch { declared, computed } => write!(
                f,
                "Atom charges sum to {:.4} but the residue declares {:.4}",
                computed, declared
            ),
            Self::AmbiguousSterolHead { candidates, chosen } => write!(
                f,
                "Sterol head is ambiguous among [{}]; chose '{}'",
                candidates.join(", "),
                chosen
            ),
        }
    }
}

/// Element symbol assigned to atoms whose type has not been resolved yet.
pub const UNRESOLVED_ELEMENT: &str = "?";

/// Represents an atom declared by an `ATOM` card of a residue topology.
///
/// Identity is the atom name alone: two records with the same name compare
/// equal regardless of type, charge or resolved mass. Mass and element start
/// out unresolved and are filled in from a mass table by
/// [`Residue::resolve_masses`](super::residue::Residue::resolve_masses).
#[derive(Debug, Clone)]
pub struct Atom {
    /// The atom name, upper-cased (e.g., "C21", "O3").
    pub name: String,
    /// The force field atom type (e.g., "CTL2", "OHL").
    pub atom_type: String,
    /// The partial atomic charge in elementary charge units.
    pub charge: f64,
    /// The atomic mass in amu, `0.0` until resolved.
    pub mass: f64,
    /// The element symbol, [`UNRESOLVED_ELEMENT`] until resolved.
    pub element: String,
    /// Set when the name starts with a digit, marking an atom that belongs to
    /// a patch context (e.g., "1C1" in a linking patch).
    pub in_patch: bool,
}

impl Atom {
    /// Creates a new `Atom` with unresolved mass and element.
    ///
    /// The name and type are upper-cased; `in_patch` is derived from the name.
    ///
    /// # Arguments
    ///
    /// * `name` - The atom name.
    /// * `atom_type` - The force field atom type.
    /// * `charge` - The partial charge.
    pub fn new(name: &str, atom_type: &str, charge: f64) -> Self {
        let name = name.to_ascii_uppercase();
        let in_patch = name.chars().next().is_some_and(|c| c.is_ascii_digit());
        Self {
            name,
            atom_type: atom_type.to_ascii_uppercase(),
            charge,
            mass: 0.0,
            element: UNRESOLVED_ELEMENT.to_string(),
            in_patch,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.element != UNRESOLVED_ELEMENT
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element == "H"
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Atom {}

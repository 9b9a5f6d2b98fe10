use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BondOrder {
    Single = 1,
    Double = 2,
    Triple = 3,
}

impl Default for BondOrder {
    fn default() -> Self {
        BondOrder::Single
    }
}

impl BondOrder {
    /// Integer bond order (1, 2 or 3).
    pub fn degree(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" | "bond" => Ok(Self::Single),
            "2" | "d" | "double" | "doub" => Ok(Self::Double),
            "3" | "t" | "triple" | "trip" => Ok(Self::Triple),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
            }
        )
    }
}

/// A covalent bond between two named atoms of a residue.
///
/// Equality ignores the order of the two names and the optional length, so
/// `C1-C2` and `C2-C1` of the same order compare equal.
#[derive(Debug, Clone)]
pub struct Bond {
    pub name1: String,
    pub name2: String,
    pub order: BondOrder,
    /// Equilibrium length in Angstroms, only known when an IC supplies it.
    pub length: Option<f64>,
}

impl Bond {
    pub fn new(name1: &str, name2: &str, order: BondOrder) -> Self {
        Self {
            name1: name1.to_string(),
            name2: name2.to_string(),
            order,
            length: None,
        }
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name1 == name || self.name2 == name
    }

    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.name1 == a && self.name2 == b) || (self.name1 == b && self.name2 == a)
    }
}

impl PartialEq for Bond {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.connects(&other.name1, &other.name2)
    }
}

impl Eq for Bond {}

/// A bond angle `name1 - vertex - name3`.
#[derive(Debug, Clone)]
pub struct Angle {
    pub name1: String,
    pub vertex: String,
    pub name3: String,
    pub degrees: Option<f64>,
}

impl Angle {
    pub fn new(name1: &str, vertex: &str, name3: &str) -> Self {
        Self {
            name1: name1.to_string(),
            vertex: vertex.to_string(),
            name3: name3.to_string(),
            degrees: None,
        }
    }

    pub fn with_degrees(mut self, degrees: f64) -> Self {
        self.degrees = Some(degrees);
        self
    }
}

impl PartialEq for Angle {
    // The outer atoms may be swapped; the vertex may not.
    fn eq(&self, other: &Self) -> bool {
        self.vertex == other.vertex
            && ((self.name1 == other.name1 && self.name3 == other.name3)
                || (self.name1 == other.name3 && self.name3 == other.name1))
    }
}

impl Eq for Angle {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DihedralKind {
    #[default]
    Proper,
    Improper,
}

#[derive(Debug, Error)]
#[error("Invalid dihedral kind string")]
pub struct ParseDihedralKindError;

impl FromStr for DihedralKind {
    type Err = ParseDihedralKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "proper" | "dihe" | "dihedral" => Ok(Self::Proper),
            "improper" | "impr" | "imph" => Ok(Self::Improper),
            _ => Err(ParseDihedralKindError),
        }
    }
}

impl fmt::Display for DihedralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Proper => "proper",
                Self::Improper => "improper",
            }
        )
    }
}

/// A four-atom torsion. Atom order is significant; no reversal symmetry.
#[derive(Debug, Clone)]
pub struct Dihedral {
    pub names: [String; 4],
    pub kind: DihedralKind,
    pub degrees: Option<f64>,
}

impl Dihedral {
    pub fn new(names: [&str; 4], kind: DihedralKind) -> Self {
        Self {
            names: names.map(str::to_string),
            kind,
            degrees: None,
        }
    }

    pub fn with_degrees(mut self, degrees: f64) -> Self {
        self.degrees = Some(degrees);
        self
    }
}

impl PartialEq for Dihedral {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.names == other.names
    }
}

impl Eq for Dihedral {}

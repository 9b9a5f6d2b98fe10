use super::atom::Atom;
use super::diagnostics::Diagnostic;
use super::ic::InternalCoordinate;
use super::mass::MassTable;
use super::topology::Bond;
use crate::core::annotation::Annotation;
use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Residue error code set when a bond or IC names an atom with no `ATOM` card.
pub const IC_UNRESOLVED_ATOM: i32 = -5;

// Hill-style leading elements of an empirical formula.
static FORMULA_PRIORITY: Map<&'static str, u8> = phf_map! {
    "C" => 0,
    "H" => 1,
    "N" => 2,
    "O" => 3,
    "P" => 4,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResidueKind {
    /// A complete residue (`RESI`).
    #[default]
    Resi,
    /// A patch applied to other residues (`PRES`).
    Pres,
}

#[derive(Debug, Error)]
#[error("Invalid residue kind string")]
pub struct ParseResidueKindError;

impl FromStr for ResidueKind {
    type Err = ParseResidueKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RESI" | "RESIDUE" => Ok(Self::Resi),
            "PRES" | "PATCH" => Ok(Self::Pres),
            _ => Err(ParseResidueKindError),
        }
    }
}

impl fmt::Display for ResidueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Resi => "RESI",
                Self::Pres => "PRES",
            }
        )
    }
}

/// Force field classification of a residue, supplied by the caller.
///
/// `stream` is the topology stream the residue came from (e.g., "lipid"),
/// `substream` refines it (e.g., "cholesterol", "detergent").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueMetadata {
    pub stream: Option<String>,
    pub substream: Option<String>,
}

impl ResidueMetadata {
    pub fn new(stream: &str, substream: Option<&str>) -> Self {
        Self {
            stream: Some(stream.to_lowercase()),
            substream: substream.map(str::to_lowercase),
        }
    }
}

/// One `DELETE ATOM` card of a patch. A nonzero `error_code` marks a
/// malformed card whose atom name is a best guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub atom: String,
    pub error_code: i32,
}

impl Deletion {
    pub fn is_malformed(&self) -> bool {
        self.error_code != 0
    }
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Residue '{residue}': atom '{atom}' has type '{atom_type}' with no mass table entry")]
    UnknownAtomType {
        residue: String,
        atom: String,
        atom_type: String,
    },
}

/// A residue or patch topology assembled from one RESI/PRES block.
///
/// Only atoms, groups, bonds, ICs and deletions persist. Atoms are kept in
/// declaration order and looked up through a name index owned by the
/// residue; every other record refers to atoms by name.
#[derive(Debug, Clone)]
pub struct Residue {
    pub kind: ResidueKind,
    pub name: String,
    /// Net charge from the title line.
    pub charge: f64,
    /// Free text trailing the title line.
    pub synonym: String,
    pub metadata: ResidueMetadata,
    /// True if any atom belongs to a patch context.
    pub is_patch: bool,
    /// `0` when clean, [`IC_UNRESOLVED_ATOM`] when a bond or IC names an
    /// undeclared atom.
    pub error_code: i32,
    pub(crate) atoms: Vec<Atom>,
    pub(crate) groups: Vec<Vec<usize>>,
    pub(crate) bonds: Vec<Bond>,
    pub(crate) ics: Vec<InternalCoordinate>,
    pub(crate) deletions: Vec<Deletion>,
    pub(crate) annotation: Option<Annotation>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    atom_index: HashMap<String, usize>,
    mass: Option<f64>,
}

impl Residue {
    pub(crate) fn new(
        kind: ResidueKind,
        name: &str,
        charge: f64,
        synonym: &str,
        metadata: ResidueMetadata,
    ) -> Self {
        Self {
            kind,
            name: name.to_ascii_uppercase(),
            charge,
            synonym: synonym.to_string(),
            metadata,
            is_patch: false,
            error_code: 0,
            atoms: Vec::new(),
            groups: Vec::new(),
            bonds: Vec::new(),
            ics: Vec::new(),
            deletions: Vec::new(),
            annotation: None,
            diagnostics: Vec::new(),
            atom_index: HashMap::new(),
            mass: None,
        }
    }

    /// Appends an atom and returns its index, or `None` if the name is taken.
    pub(crate) fn push_atom(&mut self, atom: Atom) -> Option<usize> {
        if self.atom_index.contains_key(&atom.name) {
            return None;
        }
        let index = self.atoms.len();
        self.atom_index.insert(atom.name.clone(), index);
        self.is_patch |= atom.in_patch;
        self.atoms.push(atom);
        Some(index)
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_patch_residue(&self) -> bool {
        self.kind == ResidueKind::Pres
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Looks up an atom by name, ignoring case.
    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atom_rank(name).map(|index| &self.atoms[index])
    }

    /// Declaration index of the named atom.
    pub fn atom_rank(&self, name: &str) -> Option<usize> {
        match self.atom_index.get(name) {
            Some(&index) => Some(index),
            None => self.atom_index.get(&name.to_ascii_uppercase()).copied(),
        }
    }

    pub fn contains_atom(&self, name: &str) -> bool {
        self.atom_rank(name).is_some()
    }

    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    pub fn atoms_in_group(&self, group: usize) -> impl Iterator<Item = &Atom> + '_ {
        self.groups
            .get(group)
            .into_iter()
            .flatten()
            .map(|&index| &self.atoms[index])
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn ics(&self) -> &[InternalCoordinate] {
        &self.ics
    }

    pub fn deletions(&self) -> &[Deletion] {
        &self.deletions
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// Total mass in amu; `0.0` until [`resolve_masses`](Self::resolve_masses) has run.
    pub fn mass(&self) -> f64 {
        self.mass.unwrap_or(0.0)
    }

    pub fn is_resolved(&self) -> bool {
        self.mass.is_some()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.is_hydrogen()).count()
    }

    pub fn charge_sum(&self) -> f64 {
        self.atoms.iter().map(|a| a.charge).sum()
    }

    /// Empirical formula: C, H, N, O and P first, then the remaining
    /// elements alphabetically. Counts of one are omitted.
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<(u8, &str), usize> = BTreeMap::new();
        for atom in &self.atoms {
            let element = atom.element.as_str();
            let priority = FORMULA_PRIORITY.get(element).copied().unwrap_or(u8::MAX);
            *counts.entry((priority, element)).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|((_, element), count)| match count {
                1 => element.to_string(),
                n => format!("{}{}", element, n),
            })
            .collect()
    }

    /// Fills in mass and element of every atom from `table` and returns the
    /// total mass.
    ///
    /// Fails without modifying the residue if any atom type is missing.
    pub fn resolve_masses(&mut self, table: &MassTable) -> Result<f64, ResolutionError> {
        let records = self
            .atoms
            .iter()
            .map(|atom| {
                table
                    .get(&atom.atom_type)
                    .ok_or_else(|| ResolutionError::UnknownAtomType {
                        residue: self.name.clone(),
                        atom: atom.name.clone(),
                        atom_type: atom.atom_type.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut total = 0.0;
        for (atom, record) in self.atoms.iter_mut().zip(records) {
            atom.mass = record.mass;
            atom.element = record.element.clone();
            total += record.mass;
        }
        self.mass = Some(total);
        Ok(total)
    }
}

use super::diagnostics::Diagnostic;
use super::ic::InternalCoordinate;
use super::residue::{IC_UNRESOLVED_ATOM, Residue, ResidueMetadata};
use super::topology::Bond;
use crate::core::io::cards::{self, CardError, CardKind, Title};
use thiserror::Error;
use tracing::{debug, warn};

/// Largest tolerated gap between the title charge and the sum of atom charges.
const CHARGE_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("Residue block contains no title line")]
    EmptyBlock,
    #[error("Invalid residue title on line {line}: {source}")]
    InvalidTitle { line: usize, source: CardError },
    #[error("Residue '{residue}', line {line}: {source}")]
    Card {
        residue: String,
        line: usize,
        source: CardError,
    },
}

/// Assembles a [`Residue`] from the cards of one RESI/PRES block.
///
/// Cards are fed in block order through [`add_card`](Self::add_card).
/// Cross-reference checks run once in [`build`](Self::build), after every
/// `ATOM` card has been seen.
pub struct ResidueBuilder {
    residue: Residue,

    // --- Card buckets, merged on build ---
    bonds: [Vec<Bond>; 3],
    ics: Vec<InternalCoordinate>,
}

impl ResidueBuilder {
    pub fn new(title: Title, metadata: ResidueMetadata) -> Self {
        let residue = Residue::new(
            title.kind,
            &title.name,
            title.charge,
            &title.synonym,
            metadata,
        );
        Self {
            residue,
            bonds: Default::default(),
            ics: Vec::new(),
        }
    }

    /// Parses a whole block: a title line followed by card lines.
    ///
    /// Blank and comment-only lines are skipped; line numbers in errors are
    /// 1-based within `block`.
    pub fn from_block(block: &str, metadata: ResidueMetadata) -> Result<Residue, BlockError> {
        let mut lines = block
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !cards::split_comment(line).0.is_empty());

        let (title_line, title) = lines.next().ok_or(BlockError::EmptyBlock)?;
        let title = cards::parse_title(title).map_err(|source| BlockError::InvalidTitle {
            line: title_line,
            source,
        })?;

        let mut builder = Self::new(title, metadata);
        for (line, text) in lines {
            builder.add_card(line, text)?;
        }
        Ok(builder.build())
    }

    /// Classifies one card line and files its records.
    pub fn add_card(&mut self, line: usize, text: &str) -> Result<&mut Self, BlockError> {
        let card = cards::split_comment(text).0.to_ascii_uppercase();
        if card.is_empty() {
            return Ok(self);
        }
        self.file_card(&card).map_err(|source| BlockError::Card {
            residue: self.residue.name.clone(),
            line,
            source,
        })?;
        Ok(self)
    }

    fn file_card(&mut self, card: &str) -> Result<(), CardError> {
        let kind = CardKind::of_card(card);
        match kind {
            CardKind::Atom => {
                let atom = cards::parse_atom(card)?;
                let name = atom.name.clone();
                match self.residue.push_atom(atom) {
                    Some(index) => {
                        if self.residue.groups.is_empty() {
                            self.residue.groups.push(Vec::new());
                        }
                        if let Some(group) = self.residue.groups.last_mut() {
                            group.push(index);
                        }
                    }
                    None => {
                        warn!(residue = %self.residue.name, atom = %name, "Duplicate ATOM card ignored.");
                        self.residue
                            .push_diagnostic(Diagnostic::DuplicateAtom { atom: name });
                    }
                }
            }
            CardKind::Group => self.residue.groups.push(Vec::new()),
            CardKind::Bond | CardKind::Double | CardKind::Triple => {
                let bonds = cards::parse_bonds(card)?;
                let bucket = match kind {
                    CardKind::Double => 1,
                    CardKind::Triple => 2,
                    _ => 0,
                };
                self.bonds[bucket].extend(bonds);
            }
            CardKind::Ic => self.ics.push(cards::parse_ic(card)?),
            CardKind::Delete => {
                let deletion = cards::parse_delete(card);
                if deletion.is_malformed() {
                    self.residue.push_diagnostic(Diagnostic::MalformedDelete {
                        card: card.to_string(),
                    });
                }
                self.residue.deletions.push(deletion);
            }
            CardKind::Angle => {
                cards::parse_angles(card)?;
                self.ignore(card);
            }
            CardKind::Dihedral | CardKind::Improper => {
                cards::parse_dihedrals(card)?;
                self.ignore(card);
            }
            _ => self.ignore(card),
        }
        Ok(())
    }

    fn ignore(&mut self, card: &str) {
        let keyword = card.split_whitespace().next().unwrap_or_default();
        self.residue.push_diagnostic(Diagnostic::IgnoredCard {
            keyword: keyword.to_string(),
        });
    }

    /// Runs the cross-reference checks and returns the finished residue.
    pub fn build(self) -> Residue {
        let Self {
            mut residue,
            bonds,
            ics,
        } = self;
        residue.bonds = bonds.into_iter().flatten().collect();

        for bond in &residue.bonds {
            if !residue.contains_atom(&bond.name1) || !residue.contains_atom(&bond.name2) {
                warn!(residue = %residue.name, atom1 = %bond.name1, atom2 = %bond.name2, "Bond references an undeclared atom.");
                residue.error_code = IC_UNRESOLVED_ATOM;
                residue.diagnostics.push(Diagnostic::UnresolvedBondAtom {
                    atom1: bond.name1.clone(),
                    atom2: bond.name2.clone(),
                });
            }
        }

        for ic in ics {
            let missing = ic.atoms.iter().find(|name| !residue.contains_atom(name));
            if let Some(atom) = missing {
                warn!(residue = %residue.name, atom = %atom, "IC references an undeclared atom; IC dropped.");
                residue.error_code = IC_UNRESOLVED_ATOM;
                residue.diagnostics.push(Diagnostic::UnresolvedIcAtom {
                    card: ic.card.clone(),
                    atom: atom.clone(),
                });
                continue;
            }
            if !ic.is_empty() {
                backfill_lengths(&mut residue.bonds, &ic);
            }
            residue.ics.push(ic);
        }

        let computed = residue.charge_sum();
        if (computed - residue.charge).abs() > CHARGE_TOLERANCE {
            warn!(residue = %residue.name, declared = residue.charge, computed, "Atom charges do not match the residue charge.");
            residue.diagnostics.push(Diagnostic::ChargeMismatch {
                declared: residue.charge,
                computed,
            });
        }

        debug!(
            residue = %residue.name,
            atoms = residue.atoms.len(),
            bonds = residue.bonds.len(),
            ics = residue.ics.len(),
            error_code = residue.error_code,
            "Residue assembled."
        );
        residue
    }
}

// The first IC to describe a bond sets its length.
fn backfill_lengths(bonds: &mut [Bond], ic: &InternalCoordinate) {
    for derived in ic.bonds() {
        if let Some(bond) = bonds
            .iter_mut()
            .find(|b| b.length.is_none() && b.connects(&derived.name1, &derived.name2))
        {
            bond.length = derived.length;
        }
    }
}

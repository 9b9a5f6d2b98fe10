use super::cards::{self, CardError, CardKind};
use crate::core::models::builder::{BlockError, ResidueBuilder};
use crate::core::models::mass::MassTable;
use crate::core::models::residue::{Residue, ResidueMetadata};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid MASS card on line {line}: {source}")]
    Mass { line: usize, source: CardError },
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// The contents of a CHARMM `.rtf` or `.str` topology section.
#[derive(Debug, Clone, Default)]
pub struct TopologyFile {
    /// Atom types declared by `MASS` cards.
    pub masses: MassTable,
    /// Residues and patches in file order.
    pub residues: Vec<Residue>,
}

impl TopologyFile {
    /// Parses topology text already held in memory.
    ///
    /// Title (`*`) lines, header directives and comments are skipped. Every
    /// RESI/PRES line opens a new block that runs until the next one; the
    /// first `END` card closes the topology section. All residues receive a
    /// copy of `metadata`. Line numbers in errors are 1-based within `text`.
    pub fn parse(text: &str, metadata: &ResidueMetadata) -> Result<Self, TopologyError> {
        let mut file = Self::default();
        let mut current: Option<ResidueBuilder> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let card = cards::split_comment(raw).0;
            if card.is_empty() || card.starts_with('*') {
                continue;
            }
            match CardKind::of_card(card) {
                CardKind::Residue | CardKind::Patch => {
                    file.finish(current.take());
                    let title = cards::parse_title(raw)
                        .map_err(|source| BlockError::InvalidTitle { line, source })?;
                    current = Some(ResidueBuilder::new(title, metadata.clone()));
                }
                CardKind::Mass => {
                    let record = cards::parse_mass(card)
                        .map_err(|source| TopologyError::Mass { line, source })?;
                    file.masses.insert(record);
                }
                CardKind::End => break,
                _ => {
                    if let Some(builder) = current.as_mut() {
                        builder.add_card(line, raw)?;
                    }
                }
            }
        }
        file.finish(current);

        info!(
            residues = file.residues.len(),
            mass_types = file.masses.len(),
            "Topology parsed."
        );
        Ok(file)
    }

    pub fn read_from_path(path: &Path, metadata: &ResidueMetadata) -> Result<Self, TopologyError> {
        let content = std::fs::read_to_string(path).map_err(|e| TopologyError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, metadata)
    }

    fn finish(&mut self, builder: Option<ResidueBuilder>) {
        if let Some(builder) = builder {
            let residue = builder.build();
            debug!(residue = %residue.name, kind = %residue.kind, "Block closed.");
            self.residues.push(residue);
        }
    }

    pub fn residue(&self, name: &str) -> Option<&Residue> {
        self.residues
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn residue_mut(&mut self, name: &str) -> Option<&mut Residue> {
        self.residues
            .iter_mut()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

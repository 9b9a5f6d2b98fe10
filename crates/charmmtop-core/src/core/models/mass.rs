use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One `MASS` card: an atom type with its mass and element.
#[derive(Debug, Clone, PartialEq)]
pub struct MassRecord {
    pub index: i32,
    pub atom_type: String,
    pub mass: f64,
    pub element: String,
}

impl MassRecord {
    /// Builds a record, inferring the element from the type when it is absent.
    pub fn new(index: i32, atom_type: &str, mass: f64, element: Option<&str>) -> Self {
        let atom_type = atom_type.to_ascii_uppercase();
        let element = match element {
            Some(e) => e.to_ascii_uppercase(),
            None => infer_element(&atom_type),
        };
        Self {
            index,
            atom_type,
            mass,
            element,
        }
    }
}

/// First alphabetic character of a type, upper-cased.
pub fn infer_element(atom_type: &str) -> String {
    atom_type
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct MassRow {
    #[serde(rename = "type")]
    atom_type: String,
    mass: f64,
    element: Option<String>,
}

#[derive(Debug, Error)]
pub enum MassTableError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

/// Atom type to mass/element lookup, shared read-only by every residue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MassTable {
    records: HashMap<String, MassRecord>,
}

impl MassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any earlier record for the same type.
    pub fn insert(&mut self, record: MassRecord) -> Option<MassRecord> {
        self.records.insert(record.atom_type.clone(), record)
    }

    pub fn get(&self, atom_type: &str) -> Option<&MassRecord> {
        self.records.get(atom_type)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MassRecord> {
        self.records.values()
    }

    /// Adds every record of `other`, overriding types present in both.
    pub fn extend(&mut self, other: &MassTable) {
        for record in other.iter() {
            self.insert(record.clone());
        }
    }

    /// Loads a mass table from a CSV file with `type,mass,element` columns.
    ///
    /// The `element` column may be left empty, in which case the element is
    /// inferred from the type.
    pub fn load_csv(path: &Path) -> Result<Self, MassTableError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| MassTableError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut table = Self::new();
        for (index, result) in reader.deserialize::<MassRow>().enumerate() {
            let row = result.map_err(|e| MassTableError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            let element = row.element.as_deref().filter(|e| !e.trim().is_empty());
            table.insert(MassRecord::new(
                -(index as i32) - 1,
                &row.atom_type,
                row.mass,
                element,
            ));
        }
        Ok(table)
    }
}

impl FromIterator<MassRecord> for MassTable {
    fn from_iter<I: IntoIterator<Item = MassRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

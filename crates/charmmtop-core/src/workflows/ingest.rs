use crate::core::annotation::{AnnotationError, AnnotationRules, AnnotationStrategy, ConfigError};
use crate::core::io::rtf::{TopologyError, TopologyFile};
use crate::core::models::mass::{MassTable, MassTableError};
use crate::core::models::residue::{ResidueKind, ResolutionError, Residue, ResidueMetadata};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Topology parsing failed: {source}")]
    Topology {
        #[from]
        source: TopologyError,
    },
    #[error("Annotation rules could not be loaded: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
    #[error("Mass table could not be loaded: {source}")]
    MassTable {
        #[from]
        source: MassTableError,
    },
}

/// Why a single residue could not be fully processed.
#[derive(Debug, Error)]
pub enum ResidueFailure {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// Stream classification applied to every residue of the input.
    pub metadata: ResidueMetadata,
    pub rules: AnnotationRules,
    /// Masses that override the input's own `MASS` cards.
    pub masses: MassTable,
    /// Whether RESI residues are annotated after mass resolution.
    pub annotate: bool,
}

#[derive(Default)]
pub struct IngestConfigBuilder {
    stream: Option<String>,
    substream: Option<String>,
    rules: Option<AnnotationRules>,
    rules_path: Option<PathBuf>,
    masses: Option<MassTable>,
    mass_table_path: Option<PathBuf>,
    annotate: bool,
}

impl IngestConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream(mut self, stream: &str) -> Self {
        self.stream = Some(stream.to_string());
        self
    }

    pub fn substream(mut self, substream: &str) -> Self {
        self.substream = Some(substream.to_string());
        self
    }

    pub fn rules(mut self, rules: AnnotationRules) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn rules_path(mut self, path: PathBuf) -> Self {
        self.rules_path = Some(path);
        self
    }

    pub fn masses(mut self, masses: MassTable) -> Self {
        self.masses = Some(masses);
        self
    }

    pub fn mass_table_path(mut self, path: PathBuf) -> Self {
        self.mass_table_path = Some(path);
        self
    }

    pub fn annotate(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Loads any configured files. A rules file takes precedence over rules
    /// set directly; CSV masses are layered over directly set masses.
    pub fn build(self) -> Result<IngestConfig, WorkflowError> {
        let rules = match self.rules_path {
            Some(path) => AnnotationRules::load(&path)?,
            None => self.rules.unwrap_or_default(),
        };
        let mut masses = self.masses.unwrap_or_default();
        if let Some(path) = self.mass_table_path {
            masses.extend(&MassTable::load_csv(&path)?);
        }
        let metadata = match self.stream {
            Some(stream) => ResidueMetadata::new(&stream, self.substream.as_deref()),
            None => ResidueMetadata::default(),
        };
        Ok(IngestConfig {
            metadata,
            rules,
            masses,
            annotate: self.annotate,
        })
    }
}

#[derive(Debug)]
pub struct ResidueReport {
    pub residue: Residue,
    pub strategy: AnnotationStrategy,
    pub failure: Option<ResidueFailure>,
}

impl ResidueReport {
    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug)]
pub struct IngestReport {
    /// The input's `MASS` cards merged with the configured masses.
    pub masses: MassTable,
    pub residues: Vec<ResidueReport>,
}

impl IngestReport {
    pub fn residue(&self, name: &str) -> Option<&ResidueReport> {
        self.residues
            .iter()
            .find(|r| r.residue.name.eq_ignore_ascii_case(name))
    }

    pub fn failures(&self) -> impl Iterator<Item = &ResidueReport> {
        self.residues.iter().filter(|r| !r.is_ok())
    }
}

/// Parses topology text, resolves masses and optionally annotates every
/// residue.
///
/// Malformed text fails the whole call. Resolution and annotation failures
/// are recorded on the affected residue's report and do not stop the rest.
/// Patches are resolved but never annotated.
#[instrument(skip_all, name = "ingest_workflow")]
pub fn ingest(text: &str, config: &IngestConfig) -> Result<IngestReport, WorkflowError> {
    let file = TopologyFile::parse(text, &config.metadata)?;
    let mut masses = file.masses;
    masses.extend(&config.masses);
    info!(
        residues = file.residues.len(),
        mass_types = masses.len(),
        "Starting residue ingestion."
    );

    let mut reports = Vec::with_capacity(file.residues.len());
    for mut residue in file.residues {
        let strategy = match residue.kind {
            ResidueKind::Resi if config.annotate => config.rules.select(&residue.metadata),
            _ => AnnotationStrategy::Model,
        };
        let failure = process(&mut residue, &masses, strategy, config.annotate).err();
        if let Some(failure) = &failure {
            warn!(residue = %residue.name, error = %failure, "Residue failed.");
        }
        reports.push(ResidueReport {
            residue,
            strategy,
            failure,
        });
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    info!(residues = reports.len(), failed, "Ingestion complete.");
    Ok(IngestReport {
        masses,
        residues: reports,
    })
}

fn process(
    residue: &mut Residue,
    masses: &MassTable,
    strategy: AnnotationStrategy,
    annotate: bool,
) -> Result<(), ResidueFailure> {
    residue.resolve_masses(masses)?;
    if annotate && residue.kind == ResidueKind::Resi {
        residue.annotate_with(strategy)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::mass::MassRecord;
    use std::fs;
    use tempfile::tempdir;

    const TOPOLOGY: &str = "\
MASS -1 CTL2 12.011 C
MASS -1 CTL3 12.011 C
MASS -1 OHL  15.9994 O

RESI PROH 0.00
ATOM O1 OHL  0.0
ATOM C1 CTL2 0.0
ATOM C2 CTL2 0.0
ATOM C3 CTL3 0.0
BOND O1 C1 C1 C2 C2 C3

RESI UNKN 0.00
ATOM X1 XX1 0.0

PRES PTCH 0.00
ATOM 1C1 CTL2 0.0
END
";

    #[test]
    fn ingest_resolves_and_annotates_residues() {
        let config = IngestConfigBuilder::new()
            .stream("lipid")
            .substream("cholesterol")
            .annotate(true)
            .build()
            .unwrap();
        let report = ingest(TOPOLOGY, &config).unwrap();
        assert_eq!(report.residues.len(), 3);

        let proh = report.residue("PROH").unwrap();
        assert!(proh.is_ok());
        assert_eq!(proh.strategy, AnnotationStrategy::Sterol);
        let annotation = proh.residue.annotation().unwrap();
        assert_eq!(annotation.heads, vec!["C1"]);
        assert_eq!(annotation.tails, vec!["C3"]);

        let patch = report.residue("PTCH").unwrap();
        assert!(patch.is_ok());
        assert_eq!(patch.strategy, AnnotationStrategy::Model);
        assert!(patch.residue.annotation().is_none());
        assert!(patch.residue.is_resolved());
    }

    #[test]
    fn unknown_atom_type_fails_only_that_residue() {
        let config = IngestConfigBuilder::new().build().unwrap();
        let report = ingest(TOPOLOGY, &config).unwrap();
        let failures: Vec<_> = report.failures().map(|r| r.residue.name.as_str()).collect();
        assert_eq!(failures, vec!["UNKN"]);
        assert!(matches!(
            report.residue("UNKN").unwrap().failure,
            Some(ResidueFailure::Resolution(ResolutionError::UnknownAtomType { .. }))
        ));
        assert!(report.residue("PROH").unwrap().residue.annotation().is_none());
    }

    #[test]
    fn configured_masses_fill_missing_types() {
        let extra: MassTable = [MassRecord::new(-1, "XX1", 10.0, Some("X"))].into_iter().collect();
        let config = IngestConfigBuilder::new().masses(extra).build().unwrap();
        let report = ingest(TOPOLOGY, &config).unwrap();
        assert_eq!(report.failures().count(), 0);
        assert_eq!(report.residue("UNKN").unwrap().residue.mass(), 10.0);
        assert_eq!(report.masses.len(), 4);
    }

    #[test]
    fn builder_loads_rules_and_masses_from_files() {
        let dir = tempdir().unwrap();
        let rules_path = dir.path().join("rules.toml");
        fs::write(&rules_path, "default_strategy = \"detergent\"\n").unwrap();
        let masses_path = dir.path().join("masses.csv");
        fs::write(&masses_path, "type,mass,element\nXX1,10.0,X\n").unwrap();

        let config = IngestConfigBuilder::new()
            .stream("lipid")
            .rules_path(rules_path)
            .mass_table_path(masses_path)
            .build()
            .unwrap();
        assert_eq!(config.rules.default_strategy, AnnotationStrategy::Detergent);
        assert!(config.masses.get("XX1").is_some());
        assert_eq!(config.metadata.stream.as_deref(), Some("lipid"));
        assert!(!config.annotate);
    }

    #[test]
    fn builder_reports_unreadable_rules() {
        let dir = tempdir().unwrap();
        let result = IngestConfigBuilder::new()
            .rules_path(dir.path().join("absent.toml"))
            .build();
        assert!(matches!(result, Err(WorkflowError::Config { .. })));
    }

    #[test]
    fn malformed_topology_fails_the_whole_call() {
        let config = IngestConfigBuilder::new().build().unwrap();
        let result = ingest("RESI BAD 0.0\nATOM C1 CTL2\n", &config);
        assert!(matches!(result, Err(WorkflowError::Topology { .. })));
    }
}

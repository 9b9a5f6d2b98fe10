//! # CHARMM Topology Core Library
//!
//! Parses CHARMM residue topology text (`.rtf`/`.str` RESI and PRES blocks)
//! into a validated data model and identifies the head and tail atoms of
//! lipid-like residues from their bond graphs.
//!
//! ## Architectural Philosophy
//!
//! The library is split into two layers with a strict dependency direction.
//!
//! - **[`core`]: The Foundation.** Stateless models (`Residue`, `MassTable`),
//!   the card parser and residue assembler, the bond graph with its
//!   algorithms, and the annotation strategies.
//!
//! - **[`workflows`]: The Public API.** Ties the `core` pieces together to
//!   take raw topology text through parsing, mass resolution and annotation
//!   in a single call.
//!
//! Nothing in the library prints. Events are emitted through `tracing`, and
//! anything a caller may need to act on is recorded on the residue as a
//! [`Diagnostic`](core::models::diagnostics::Diagnostic).

pub mod core;
pub mod workflows;

//! # Workflows Module
//!
//! High-level entry points that tie the `core` layers together.
//!
//! ## Overview
//!
//! A workflow takes raw CHARMM topology text and carries every residue in it
//! through parsing, mass resolution and, on request, head/tail annotation.
//! Per-residue failures are collected into a report instead of aborting the
//! run, so one bad residue in a large stream file does not hide the rest.
//!
//! - **Ingest Workflow** ([`ingest`]) - parse, resolve and annotate a
//!   topology section under an [`IngestConfig`](ingest::IngestConfig).

pub mod ingest;

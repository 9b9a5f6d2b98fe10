//! Reading CHARMM residue topology text.
//!
//! [`cards`] turns single card lines into typed records; [`rtf`] splits a
//! whole topology section into its `MASS` table and RESI/PRES blocks and
//! hands each block to the residue assembler.

pub mod cards;
pub mod rtf;

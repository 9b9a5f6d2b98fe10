use crate::core::models::atom::Atom;
use crate::core::models::ic::InternalCoordinate;
use crate::core::models::mass::MassRecord;
use crate::core::models::residue::{Deletion, ResidueKind};
use crate::core::models::topology::{Angle, Bond, BondOrder, Dihedral, DihedralKind};
use phf::{Map, phf_map};
use std::str::FromStr;
use thiserror::Error;

/// Error code carried by a [`Deletion`] parsed from a malformed card.
pub const MALFORMED_DELETE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Mass,
    Residue,
    Patch,
    Atom,
    Group,
    Bond,
    Double,
    Triple,
    Angle,
    Dihedral,
    Improper,
    Ic,
    Delete,
    End,
    Other,
}

// CHARMM only reads the first four characters of a keyword.
static CARD_KEYWORDS: Map<&'static str, CardKind> = phf_map! {
    "MASS" => CardKind::Mass,
    "RESI" => CardKind::Residue,
    "PRES" => CardKind::Patch,
    "ATOM" => CardKind::Atom,
    "GROU" => CardKind::Group,
    "BOND" => CardKind::Bond,
    "DOUB" => CardKind::Double,
    "TRIP" => CardKind::Triple,
    "ANGL" => CardKind::Angle,
    "THET" => CardKind::Angle,
    "DIHE" => CardKind::Dihedral,
    "IMPR" => CardKind::Improper,
    "IMPH" => CardKind::Improper,
    "IC" => CardKind::Ic,
    "DELE" => CardKind::Delete,
    "END" => CardKind::End,
};

/// The part of a keyword CHARMM reads, uppercased.
fn abbreviation(keyword: &str) -> String {
    keyword.chars().take(4).collect::<String>().to_ascii_uppercase()
}

impl CardKind {
    /// Classifies a card by its leading keyword.
    pub fn classify(keyword: &str) -> Self {
        CARD_KEYWORDS
            .get(abbreviation(keyword).as_str())
            .copied()
            .unwrap_or(CardKind::Other)
    }

    pub fn of_card(card: &str) -> Self {
        card.split_whitespace()
            .next()
            .map_or(CardKind::Other, Self::classify)
    }

}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CardError {
    #[error("Card '{card}' is missing its {field}")]
    MissingToken { card: String, field: &'static str },
    #[error("Invalid float for {field} in card '{card}' (value: '{value}')")]
    InvalidFloat {
        card: String,
        field: &'static str,
        value: String,
    },
    #[error("Invalid integer for {field} in card '{card}' (value: '{value}')")]
    InvalidInt {
        card: String,
        field: &'static str,
        value: String,
    },
    #[error("Card '{card}' lists {found} atom names, which is not a multiple of {arity}")]
    WrongArity {
        card: String,
        arity: usize,
        found: usize,
    },
    #[error("Card '{card}' has {found} fields, expected {expected}")]
    FieldCount {
        card: String,
        expected: usize,
        found: usize,
    },
    #[error("Expected a {expected} card but found '{card}'")]
    UnexpectedKeyword { card: String, expected: &'static str },
}

/// The title line of a residue block: `RESI|PRES <name> [<charge>] [! synonym]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub kind: ResidueKind,
    pub name: String,
    pub charge: f64,
    pub synonym: String,
}

/// Splits a raw line at its first `!` into card text and trailing comment.
pub fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.split_once('!') {
        Some((card, comment)) => (card.trim(), Some(comment.trim())),
        None => (line.trim(), None),
    }
}

/// Reads a typed value such as a bond order from the card's keyword.
fn keyword_value<T: FromStr>(
    card: &str,
    keyword: &str,
    expected: &'static str,
) -> Result<T, CardError> {
    abbreviation(keyword)
        .parse()
        .map_err(|_| CardError::UnexpectedKeyword {
            card: card.to_string(),
            expected,
        })
}

fn expect_kind(
    card: &str,
    accepted: &[CardKind],
    expected: &'static str,
) -> Result<Vec<String>, CardError> {
    let tokens: Vec<String> = card
        .split_whitespace()
        .map(|t| t.to_ascii_uppercase())
        .collect();
    match tokens.first() {
        Some(keyword) if accepted.contains(&CardKind::classify(keyword)) => Ok(tokens),
        _ => Err(CardError::UnexpectedKeyword {
            card: card.to_string(),
            expected,
        }),
    }
}

fn parse_float(card: &str, field: &'static str, value: &str) -> Result<f64, CardError> {
    value.parse().map_err(|_| CardError::InvalidFloat {
        card: card.to_string(),
        field,
        value: value.to_string(),
    })
}

fn token<'a>(card: &str, tokens: &'a [String], idx: usize, field: &'static str) -> Result<&'a str, CardError> {
    tokens
        .get(idx)
        .map(String::as_str)
        .ok_or_else(|| CardError::MissingToken {
            card: card.to_string(),
            field,
        })
}

fn names_in_groups(card: &str, tokens: &[String], arity: usize) -> Result<Vec<Vec<String>>, CardError> {
    let names = &tokens[1..];
    if names.is_empty() || names.len() % arity != 0 {
        return Err(CardError::WrongArity {
            card: card.to_string(),
            arity,
            found: names.len(),
        });
    }
    Ok(names.chunks(arity).map(<[String]>::to_vec).collect())
}

/// Parses `MASS <index> <type> <mass> [<element>]`.
pub fn parse_mass(card: &str) -> Result<MassRecord, CardError> {
    let tokens = expect_kind(card, &[CardKind::Mass], "MASS")?;
    let index_str = token(card, &tokens, 1, "type index")?;
    let index: i32 = index_str.parse().map_err(|_| CardError::InvalidInt {
        card: card.to_string(),
        field: "type index",
        value: index_str.to_string(),
    })?;
    let atom_type = token(card, &tokens, 2, "atom type")?;
    let mass = parse_float(card, "mass", token(card, &tokens, 3, "mass")?)?;
    let element = tokens.get(4).map(String::as_str);
    Ok(MassRecord::new(index, atom_type, mass, element))
}

/// Parses `ATOM <name> <type> <charge>`; trailing tokens are ignored.
pub fn parse_atom(card: &str) -> Result<Atom, CardError> {
    let tokens = expect_kind(card, &[CardKind::Atom], "ATOM")?;
    let name = token(card, &tokens, 1, "atom name")?;
    let atom_type = token(card, &tokens, 2, "atom type")?;
    let charge = parse_float(card, "charge", token(card, &tokens, 3, "charge")?)?;
    Ok(Atom::new(name, atom_type, charge))
}

/// Parses a `BOND`, `DOUB` or `TRIP` card listing one or more atom pairs.
pub fn parse_bonds(card: &str) -> Result<Vec<Bond>, CardError> {
    let expected = "BOND/DOUB/TRIP";
    let tokens = expect_kind(
        card,
        &[CardKind::Bond, CardKind::Double, CardKind::Triple],
        expected,
    )?;
    let order: BondOrder = keyword_value(card, &tokens[0], expected)?;
    Ok(names_in_groups(card, &tokens, 2)?
        .into_iter()
        .map(|pair| Bond::new(&pair[0], &pair[1], order))
        .collect())
}

/// Parses an `ANGL`/`THET` card listing one or more atom triples.
pub fn parse_angles(card: &str) -> Result<Vec<Angle>, CardError> {
    let tokens = expect_kind(card, &[CardKind::Angle], "ANGL/THET")?;
    Ok(names_in_groups(card, &tokens, 3)?
        .into_iter()
        .map(|t| Angle::new(&t[0], &t[1], &t[2]))
        .collect())
}

/// Parses a `DIHE`/`IMPR`/`IMPH` card listing one or more atom quadruples.
pub fn parse_dihedrals(card: &str) -> Result<Vec<Dihedral>, CardError> {
    let expected = "DIHE/IMPR";
    let tokens = expect_kind(
        card,
        &[CardKind::Dihedral, CardKind::Improper],
        expected,
    )?;
    let kind: DihedralKind = keyword_value(card, &tokens[0], expected)?;
    Ok(names_in_groups(card, &tokens, 4)?
        .into_iter()
        .map(|q| Dihedral::new([&q[0], &q[1], &q[2], &q[3]].map(String::as_str), kind))
        .collect())
}

/// Parses `IC I J [*]K L bond1 angle1 dihedral angle2 bond2`.
pub fn parse_ic(card: &str) -> Result<InternalCoordinate, CardError> {
    let mut tokens = expect_kind(card, &[CardKind::Ic], "IC")?;
    if tokens.len() > 5 {
        let numbers = tokens.split_off(5);
        tokens.extend(numbers.iter().flat_map(|field| split_run_together(field)));
    }
    if tokens.len() != 10 {
        return Err(CardError::FieldCount {
            card: card.to_string(),
            expected: 10,
            found: tokens.len(),
        });
    }
    let improper = tokens[3].starts_with('*');
    let atoms = [1, 2, 3, 4].map(|i| tokens[i].trim_start_matches('*').to_string());
    Ok(InternalCoordinate {
        card: card.to_string(),
        atoms,
        bond1: parse_float(card, "bond1", &tokens[5])?,
        angle1: parse_float(card, "angle1", &tokens[6])?,
        dihedral: parse_float(card, "dihedral", &tokens[7])?,
        angle2: parse_float(card, "angle2", &tokens[8])?,
        bond2: parse_float(card, "bond2", &tokens[9])?,
        improper,
    })
}

/// Splits numeric fields that fixed-width output ran together, such as
/// `99.0000-119.0000`, at every minus sign that follows a digit or point.
fn split_run_together(field: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    let bytes = field.as_bytes();
    for i in 1..bytes.len() {
        if bytes[i] == b'-' && (bytes[i - 1].is_ascii_digit() || bytes[i - 1] == b'.') {
            parts.push(field[start..i].to_string());
            start = i;
        }
    }
    parts.push(field[start..].to_string());
    parts
}

/// Parses `DELETE ATOM <name>`.
///
/// Never fails: a malformed card yields a best-effort record whose
/// `error_code` is [`MALFORMED_DELETE`].
pub fn parse_delete(card: &str) -> Deletion {
    let tokens: Vec<String> = card
        .split_whitespace()
        .map(|t| t.to_ascii_uppercase())
        .collect();
    let well_formed = tokens.len() >= 3
        && CardKind::classify(&tokens[0]) == CardKind::Delete
        && tokens[1].starts_with("ATOM");
    Deletion {
        atom: tokens.last().cloned().unwrap_or_default(),
        error_code: if well_formed { 0 } else { MALFORMED_DELETE },
    }
}

/// Parses a residue title line, keeping the trailing comment as the synonym.
pub fn parse_title(line: &str) -> Result<Title, CardError> {
    let (card, comment) = split_comment(line);
    let expected = "RESI/PRES";
    let tokens = expect_kind(card, &[CardKind::Residue, CardKind::Patch], expected)?;
    let kind: ResidueKind = keyword_value(card, &tokens[0], expected)?;
    let name = token(card, &tokens, 1, "residue name")?.to_string();
    let charge = match tokens.get(2) {
        Some(value) => parse_float(card, "charge", value)?,
        None => 0.0,
    };
    Ok(Title {
        kind,
        name,
        charge,
        synonym: comment.unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_uses_four_character_abbreviation() {
        assert_eq!(CardKind::classify("GROUP"), CardKind::Group);
        assert_eq!(CardKind::classify("grou"), CardKind::Group);
        assert_eq!(CardKind::classify("DOUBLE"), CardKind::Double);
        assert_eq!(CardKind::classify("DELETE"), CardKind::Delete);
        assert_eq!(CardKind::classify("IC"), CardKind::Ic);
        assert_eq!(CardKind::classify("THETA"), CardKind::Angle);
        assert_eq!(CardKind::classify("DONOR"), CardKind::Other);
        assert_eq!(CardKind::classify("ÅTOM"), CardKind::Other);
        assert_eq!(CardKind::of_card(""), CardKind::Other);
    }

    #[test]
    fn split_comment_separates_trailing_text() {
        assert_eq!(
            split_comment("ATOM C1 CTL2 -0.18 ! alpha carbon"),
            ("ATOM C1 CTL2 -0.18", Some("alpha carbon"))
        );
        assert_eq!(split_comment("  BOND C1 C2  "), ("BOND C1 C2", None));
        assert_eq!(split_comment("! only a comment"), ("", Some("only a comment")));
    }

    #[test]
    fn parse_mass_reads_explicit_element() {
        let record = parse_mass("MASS  -1  SL  32.06000 S").unwrap();
        assert_eq!(record.index, -1);
        assert_eq!(record.atom_type, "SL");
        assert_eq!(record.mass, 32.06);
        assert_eq!(record.element, "S");
    }

    #[test]
    fn parse_mass_infers_missing_element() {
        let record = parse_mass("MASS 41 ctl2 12.011").unwrap();
        assert_eq!(record.atom_type, "CTL2");
        assert_eq!(record.element, "C");
    }

    #[test]
    fn parse_mass_rejects_bad_numbers() {
        assert!(matches!(
            parse_mass("MASS x CTL2 12.011"),
            Err(CardError::InvalidInt { .. })
        ));
        assert!(matches!(
            parse_mass("MASS 1 CTL2 heavy"),
            Err(CardError::InvalidFloat { field: "mass", .. })
        ));
        assert!(matches!(
            parse_mass("MASS 1 CTL2"),
            Err(CardError::MissingToken { field: "mass", .. })
        ));
    }

    #[test]
    fn parse_atom_uppercases_and_flags_patch_atoms() {
        let atom = parse_atom("atom c21 cl 0.90").unwrap();
        assert_eq!(atom.name, "C21");
        assert_eq!(atom.atom_type, "CL");
        assert_eq!(atom.charge, 0.9);
        assert!(!atom.in_patch);
        assert!(parse_atom("ATOM 2C1 CTL2 -0.08").unwrap().in_patch);
    }

    #[test]
    fn parse_atom_rejects_wrong_keyword_and_bad_charge() {
        assert!(matches!(
            parse_atom("BOND C1 C2"),
            Err(CardError::UnexpectedKeyword { .. })
        ));
        assert!(matches!(
            parse_atom("ATOM C1 CTL2 minus"),
            Err(CardError::InvalidFloat { field: "charge", .. })
        ));
    }

    #[test]
    fn parse_bonds_consumes_pairs_with_keyword_order() {
        let bonds = parse_bonds("BOND C1 C2   C2 C3").unwrap();
        assert_eq!(bonds.len(), 2);
        assert_eq!(bonds[1], Bond::new("C3", "C2", BondOrder::Single));

        let doubles = parse_bonds("DOUBLE C21 O22").unwrap();
        assert_eq!(doubles[0].order, BondOrder::Double);
        let triples = parse_bonds("TRIP C1 N1").unwrap();
        assert_eq!(triples[0].order.degree(), 3);
    }

    #[test]
    fn parse_bonds_rejects_dangling_atom() {
        assert_eq!(
            parse_bonds("BOND C1 C2 C3"),
            Err(CardError::WrongArity {
                card: "BOND C1 C2 C3".to_string(),
                arity: 2,
                found: 3,
            })
        );
        assert!(parse_bonds("BOND").is_err());
    }

    #[test]
    fn parse_angles_and_dihedrals_consume_fixed_arity() {
        let angles = parse_angles("THETA C1 C2 C3  C2 C3 C4").unwrap();
        assert_eq!(angles, vec![Angle::new("C1", "C2", "C3"), Angle::new("C4", "C3", "C2")]);

        let dihedrals = parse_dihedrals("DIHE C1 C2 C3 C4").unwrap();
        assert_eq!(dihedrals.len(), 1);
        assert_eq!(dihedrals[0].kind, DihedralKind::Proper);

        let impropers = parse_dihedrals("IMPR C21 O21 C22 O22").unwrap();
        assert_eq!(impropers[0].kind, DihedralKind::Improper);
        assert!(parse_dihedrals("DIHE C1 C2 C3").is_err());
    }

    #[test]
    fn card_keywords_carry_bond_order_and_dihedral_kind() {
        let doubles = parse_bonds("double C1 O1").unwrap();
        assert_eq!(doubles[0].order, BondOrder::Double);
        let triples = parse_bonds("TRIPLE C1 N1  C2 N2").unwrap();
        assert!(triples.iter().all(|bond| bond.order == BondOrder::Triple));

        let dihedrals = parse_dihedrals("DIHEDRAL C1 C2 C3 C4").unwrap();
        assert_eq!(dihedrals[0].kind, DihedralKind::Proper);
        let impropers = parse_dihedrals("IMPH C21 O21 C22 O22").unwrap();
        assert_eq!(impropers[0].kind, DihedralKind::Improper);

        assert_eq!(parse_title("RESIDUE POPC 0.0").unwrap().kind, ResidueKind::Resi);
        assert_eq!(parse_title("PATCH NTER 1.0").unwrap().kind, ResidueKind::Pres);
        assert!(matches!(
            parse_dihedrals("BOND C1 C2 C3 C4"),
            Err(CardError::UnexpectedKeyword { expected: "DIHE/IMPR", .. })
        ));
    }

    #[test]
    fn parse_ic_reads_proper_geometry() {
        let ic = parse_ic("IC C1 C2 C3 C4 1.5300 110.00 -55.00 111.00 1.5200").unwrap();
        assert_eq!(ic.atoms, ["C1", "C2", "C3", "C4"].map(str::to_string));
        assert!(!ic.improper);
        assert_eq!(ic.bond1, 1.53);
        assert_eq!(ic.dihedral, -55.0);
        assert_eq!(ic.bond2, 1.52);
        assert!(!ic.is_empty());
    }

    #[test]
    fn parse_ic_strips_improper_marker() {
        let ic = parse_ic("IC C2 C4 *C3 O3 1.53 110.0 120.0 109.0 1.43").unwrap();
        assert!(ic.improper);
        assert_eq!(ic.atoms[2], "C3");
    }

    #[test]
    fn parse_ic_with_zero_geometry_is_empty_not_an_error() {
        let ic = parse_ic("IC O21 C22 *C21 O22 0.0 0.0 180.0 0.0 0.0").unwrap();
        assert!(ic.is_empty());
    }

    #[test]
    fn parse_ic_separates_run_together_fields() {
        let ic = parse_ic("IC O12  O11  *P   O13     1.6000  99.0000-119.0000 108.0000   1.4800").unwrap();
        assert!(ic.improper);
        assert_eq!(ic.angle1, 99.0);
        assert_eq!(ic.dihedral, -119.0);
        assert_eq!(ic.angle2, 108.0);
        assert_eq!(ic.bond2, 1.48);

        let ic = parse_ic("IC C1 C2 C3 C4 1.53 110.0 -60.0 1.5e-1 1.52").unwrap();
        assert_eq!(ic.dihedral, -60.0);
        assert_eq!(ic.angle2, 0.15);
    }

    #[test]
    fn parse_ic_requires_exactly_five_numbers() {
        assert!(matches!(
            parse_ic("IC C1 C2 C3 C4 1.5 110.0 180.0 110.0"),
            Err(CardError::FieldCount { expected: 10, found: 9, .. })
        ));
        assert!(matches!(
            parse_ic("IC C1 C2 C3 C4 1.5 110.0 trans 110.0 1.5"),
            Err(CardError::InvalidFloat { field: "dihedral", .. })
        ));
    }

    #[test]
    fn parse_delete_accepts_atom_form() {
        let deletion = parse_delete("DELETE ATOM HO3");
        assert_eq!(deletion.atom, "HO3");
        assert_eq!(deletion.error_code, 0);
    }

    #[test]
    fn parse_delete_flags_malformed_cards_without_failing() {
        let short = parse_delete("DELETE HO3");
        assert_eq!(short.error_code, MALFORMED_DELETE);
        assert_eq!(short.atom, "HO3");

        let angle = parse_delete("DELETE ANGLE C1 C2 C3");
        assert_eq!(angle.error_code, MALFORMED_DELETE);
    }

    #[test]
    fn parse_title_reads_charge_and_synonym() {
        let title = parse_title("RESI DPPC   0.00 ! dipalmitoylphosphatidylcholine").unwrap();
        assert_eq!(title.kind, ResidueKind::Resi);
        assert_eq!(title.name, "DPPC");
        assert_eq!(title.charge, 0.0);
        assert_eq!(title.synonym, "dipalmitoylphosphatidylcholine");

        let patch = parse_title("pres dele").unwrap();
        assert_eq!(patch.kind, ResidueKind::Pres);
        assert_eq!(patch.name, "DELE");
        assert_eq!(patch.charge, 0.0);
        assert_eq!(patch.synonym, "");
    }

    #[test]
    fn parse_title_rejects_non_residue_lines() {
        assert!(matches!(
            parse_title("ATOM C1 CTL2 0.0"),
            Err(CardError::UnexpectedKeyword { .. })
        ));
        assert!(matches!(
            parse_title("RESI SDS minus-one"),
            Err(CardError::InvalidFloat { .. })
        ));
    }
}

use super::topology::{Angle, Bond, BondOrder, Dihedral, DihedralKind};

/// An internal-coordinate (`IC`) card over four named atoms.
///
/// The five numeric fields encode two bond lengths, two angles and one
/// dihedral. For a proper dihedral (`I J K L`) the bonds are `I-J` and `K-L`
/// and the angles `I-J-K` and `J-K-L`. For an improper dihedral, written
/// `I J *K L`, the bonds are `I-K` and `K-L` and the angles `I-K-L` and
/// `J-K-L`.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalCoordinate {
    /// The card text as it appeared in the residue block.
    pub card: String,
    /// Atom names with the improper marker stripped.
    pub atoms: [String; 4],
    pub bond1: f64,
    pub angle1: f64,
    pub dihedral: f64,
    pub angle2: f64,
    pub bond2: f64,
    pub improper: bool,
}

impl InternalCoordinate {
    /// An IC with a zero bond or angle carries no geometry.
    pub fn is_empty(&self) -> bool {
        self.bond1 == 0.0 || self.angle1 == 0.0 || self.angle2 == 0.0 || self.bond2 == 0.0
    }

    pub fn dihedral_kind(&self) -> DihedralKind {
        if self.improper {
            DihedralKind::Improper
        } else {
            DihedralKind::Proper
        }
    }

    pub fn bonds(&self) -> [Bond; 2] {
        let [a, b, c, d] = &self.atoms;
        let first = if self.improper { (a, c) } else { (a, b) };
        [
            Bond::new(first.0, first.1, BondOrder::Single).with_length(self.bond1),
            Bond::new(c, d, BondOrder::Single).with_length(self.bond2),
        ]
    }

    pub fn angles(&self) -> [Angle; 2] {
        let [a, b, c, d] = &self.atoms;
        let first = if self.improper { (a, c, d) } else { (a, b, c) };
        [
            Angle::new(first.0, first.1, first.2).with_degrees(self.angle1),
            Angle::new(b, c, d).with_degrees(self.angle2),
        ]
    }

    pub fn torsion(&self) -> Dihedral {
        let [a, b, c, d] = &self.atoms;
        Dihedral::new([a, b, c, d].map(String::as_str), self.dihedral_kind())
            .with_degrees(self.dihedral)
    }

    pub fn references(&self, name: &str) -> bool {
        self.atoms.iter().any(|a| a == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ic(atoms: [&str; 4], values: [f64; 5], improper: bool) -> InternalCoordinate {
        InternalCoordinate {
            card: String::new(),
            atoms: atoms.map(str::to_string),
            bond1: values[0],
            angle1: values[1],
            dihedral: values[2],
            angle2: values[3],
            bond2: values[4],
            improper,
        }
    }

    #[test]
    fn proper_ic_derives_consecutive_bonds_and_angles() {
        let ic = ic(["C1", "C2", "C3", "C4"], [1.53, 110.0, -55.0, 111.0, 1.52], false);
        let [b1, b2] = ic.bonds();
        assert!(b1.connects("C1", "C2"));
        assert_eq!(b1.length, Some(1.53));
        assert!(b2.connects("C3", "C4"));
        assert_eq!(b2.length, Some(1.52));

        let [a1, a2] = ic.angles();
        assert_eq!(a1, Angle::new("C1", "C2", "C3"));
        assert_eq!(a1.degrees, Some(110.0));
        assert_eq!(a2, Angle::new("C2", "C3", "C4"));
        assert_eq!(a2.degrees, Some(111.0));

        let torsion = ic.torsion();
        assert_eq!(torsion.kind, DihedralKind::Proper);
        assert_eq!(torsion.degrees, Some(-55.0));
    }

    #[test]
    fn improper_ic_pivots_on_third_atom() {
        let ic = ic(["C2", "C4", "C3", "O3"], [1.53, 110.0, 120.0, 109.0, 1.43], true);
        let [b1, b2] = ic.bonds();
        assert!(b1.connects("C2", "C3"));
        assert!(b2.connects("C3", "O3"));

        let [a1, a2] = ic.angles();
        assert_eq!(a1, Angle::new("C2", "C3", "O3"));
        assert_eq!(a2, Angle::new("C4", "C3", "O3"));
        assert_eq!(ic.torsion().kind, DihedralKind::Improper);
    }

    #[test]
    fn any_zero_bond_or_angle_marks_ic_empty() {
        let base = [1.5, 110.0, 180.0, 110.0, 1.5];
        assert!(!ic(["A", "B", "C", "D"], base, false).is_empty());
        for idx in [0, 1, 3, 4] {
            let mut values = base;
            values[idx] = 0.0;
            assert!(ic(["A", "B", "C", "D"], values, false).is_empty());
        }
        let mut zero_dihedral = base;
        zero_dihedral[2] = 0.0;
        assert!(!ic(["A", "B", "C", "D"], zero_dihedral, false).is_empty());
    }
}

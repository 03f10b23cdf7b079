use pdbtbx::*;

/// Sequence helpers for `pdbtbx` residues.
pub trait ResidueExt {
    /// The residue one-letter code, or `None` if it's not an amino acid.
    ///
    /// Water is reported as `O` so callers can tell it apart from unknown
    /// hetero groups.
    fn resn(&self) -> Option<&str>;
}

impl ResidueExt for Residue {
    fn resn(&self) -> Option<&str> {
        let aa_code = match self.name()?.to_uppercase().as_str() {
            "ALA" => "A",
            "ARG" => "R",
            "ASN" => "N",
            "ASP" => "D",
            "CYS" => "C",
            "GLN" => "Q",
            "GLU" => "E",
            "GLY" => "G",
            "HIS" => "H",
            "ILE" => "I",
            "LEU" => "L",
            "LYS" => "K",
            "MET" => "M",
            "PHE" => "F",
            "PRO" => "P",
            "SER" => "S",
            "THR" => "T",
            "TRP" => "W",
            "TYR" => "Y",
            "VAL" => "V",
            "HOH" => "O", // water
            _ => "X",
        };

        match aa_code {
            "X" => None,
            _ => Some(aa_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_letter_codes() {
        let cases = [("ARG", Some("R")), ("TRP", Some("W")), ("HOH", Some("O")), ("NAG", None)];
        for (name, expected) in cases {
            let conformer = Conformer::new(name, None, None).unwrap();
            let res = Residue::new(1, None, Some(conformer)).unwrap();
            assert_eq!(res.resn(), expected, "Wrong code for {name}");
        }
    }
}

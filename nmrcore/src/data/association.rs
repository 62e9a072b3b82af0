use std::collections::BTreeSet;
use std::fmt;
use std::fmt::{Display, Formatter};

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Represents one kind of spin coupling splitting pattern.
///
/// # Description
///
/// The `Multiplicity` enum covers the {s, d, t, q, m} pattern alphabet and maps
/// each kind to its fixed base intensity template, so the table lookup is
/// exhaustive at compile time instead of a string lookup with a silent default.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, Encode, Decode)]
pub enum Multiplicity {
    Singlet,
    Doublet,
    Triplet,
    Quartet,
    Multiplet,
}

impl Multiplicity {
    /// Returns the `Multiplicity` corresponding to the given pattern letter.
    ///
    /// # Arguments
    ///
    /// * `letter` - A pattern letter out of {s, d, t, q, m}, case-insensitive.
    ///
    /// Returns `None` for letters outside the alphabet.
    pub fn from_char(letter: char) -> Option<Multiplicity> {
        match letter.to_ascii_lowercase() {
            's' => Some(Multiplicity::Singlet),
            'd' => Some(Multiplicity::Doublet),
            't' => Some(Multiplicity::Triplet),
            'q' => Some(Multiplicity::Quartet),
            'm' => Some(Multiplicity::Multiplet),
            _ => None,
        }
    }

    /// Parses a whole multiplicity string, e.g. "ddt", into pattern kinds.
    /// Returns `None` if any letter is outside the alphabet.
    pub fn parse_pattern(pattern: &str) -> Option<Vec<Multiplicity>> {
        pattern.chars().map(Multiplicity::from_char).collect()
    }

    /// Returns the base intensity template of the pattern kind.
    pub fn intensity_template(&self) -> &'static [f64] {
        match self {
            Multiplicity::Singlet => &[1.0],
            Multiplicity::Doublet => &[1.0, 1.0],
            Multiplicity::Triplet => &[1.0, 2.0, 1.0],
            Multiplicity::Quartet => &[1.0, 3.0, 3.0, 1.0],
            Multiplicity::Multiplet => &[1.0, 1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl Display for Multiplicity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::Singlet => write!(f, "s"),
            Multiplicity::Doublet => write!(f, "d"),
            Multiplicity::Triplet => write!(f, "t"),
            Multiplicity::Quartet => write!(f, "q"),
            Multiplicity::Multiplet => write!(f, "m"),
        }
    }
}

/// Represents one predicted peak group as produced by the inference collaborator.
///
/// Records are consumed once per prediction request; nothing persists across
/// requests.
#[derive(Clone, Debug, Serialize, Deserialize, Encode, Decode)]
pub struct AssociationRecord {
    /// Predicted chemical shift of the group center in ppm
    pub ppm: f64,
    /// Number of equivalent nuclei in the group, treated as 1 when absent
    pub nb_atoms: Option<u32>,
    /// Predicted splitting pattern over {s, d, t, q, m}, letters may repeat
    pub multiplicity: Option<String>,
    /// Predicted coupling constants in Hz, ordered
    pub couplings: Vec<f64>,
    /// Indices of the heavy atoms the group is attributed to
    pub atoms: BTreeSet<u32>,
}

impl AssociationRecord {
    pub fn new(
        ppm: f64,
        nb_atoms: Option<u32>,
        multiplicity: Option<String>,
        couplings: Vec<f64>,
        atoms: BTreeSet<u32>,
    ) -> Self {
        AssociationRecord {
            ppm,
            nb_atoms,
            multiplicity,
            couplings,
            atoms,
        }
    }

    /// Atom count used as merge weight, 1 when the model gave none.
    pub fn effective_nb_atoms(&self) -> u32 {
        self.nb_atoms.unwrap_or(1)
    }

    /// Pattern complexity: length of the multiplicity string, 0 when null.
    pub fn pattern_complexity(&self) -> usize {
        self.multiplicity.as_ref().map_or(0, |m| m.len())
    }

    /// Reconciles the coupling list length with the multiplicity length.
    ///
    /// The regressor emits a fixed-size coupling vector, so the list can
    /// disagree with the predicted letter count: trailing couplings are
    /// truncated, missing ones padded with 0.0 Hz. A null multiplicity leaves
    /// the couplings untouched.
    pub fn reconcile_couplings(&mut self) {
        if let Some(multiplicity) = &self.multiplicity {
            self.couplings.resize(multiplicity.len(), 0.0);
        }
    }
}

/// Represents a deduplicated peak built from near-coincident association records.
///
/// The center is the atom-count-weighted mean over the merged records, the atom
/// set their union, and the pattern fields are those of the contributing record
/// with the highest pattern complexity.
#[derive(Clone, Debug, Serialize, Deserialize, Encode, Decode)]
pub struct MergedPeak {
    pub ppm: f64,
    pub nb_atoms: Option<u32>,
    pub multiplicity: Option<String>,
    pub couplings: Vec<f64>,
    pub atoms: BTreeSet<u32>,
}

impl MergedPeak {
    /// Atom count used for intensity scaling, 1 when the model gave none.
    pub fn effective_nb_atoms(&self) -> u32 {
        self.nb_atoms.unwrap_or(1)
    }

    /// Pattern complexity: length of the multiplicity string, 0 when null.
    pub fn pattern_complexity(&self) -> usize {
        self.multiplicity.as_ref().map_or(0, |m| m.len())
    }
}

impl From<AssociationRecord> for MergedPeak {
    fn from(record: AssociationRecord) -> Self {
        MergedPeak {
            ppm: record.ppm,
            nb_atoms: record.nb_atoms,
            multiplicity: record.multiplicity,
            couplings: record.couplings,
            atoms: record.atoms,
        }
    }
}

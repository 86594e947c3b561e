//! Attachment targets an annotation type may decorate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Bit mask over the element kinds an annotation can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Target(u8);

impl Target {
    /// No target context; skips the target check entirely
    pub const NONE: Target = Target(0);
    pub const CLASS: Target = Target(1);
    pub const METHOD: Target = Target(2);
    pub const PROPERTY: Target = Target(4);
    pub const ANNOTATION: Target = Target(8);
    pub const ALL: Target = Target(15);

    const NAMED: [(&'static str, Target); 5] = [
        ("CLASS", Target::CLASS),
        ("METHOD", Target::METHOD),
        ("PROPERTY", Target::PROPERTY),
        ("ANNOTATION", Target::ANNOTATION),
        ("ALL", Target::ALL),
    ];

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Target {
        Target(bits & Target::ALL.0)
    }

    /// Look up a target by its exact upper-case name
    pub fn from_name(name: &str) -> Option<Target> {
        Self::NAMED
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, target)| *target)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::NAMED.iter().map(|(name, _)| *name)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn intersects(self, other: Target) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Target {
    type Output = Target;

    fn bitor(self, rhs: Target) -> Target {
        Target(self.0 | rhs.0)
    }
}

impl BitAnd for Target {
    type Output = Target;

    fn bitand(self, rhs: Target) -> Target {
        Target(self.0 & rhs.0)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Target::ALL {
            return write!(f, "ALL");
        }
        let names: Vec<_> = Self::NAMED[..4]
            .iter()
            .filter(|(_, target)| self.intersects(*target))
            .map(|(name, _)| *name)
            .collect();
        write!(f, "{}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_operations() {
        let mask = Target::METHOD | Target::PROPERTY;
        assert!(mask.intersects(Target::PROPERTY));
        assert!(!mask.intersects(Target::CLASS));
        assert_eq!(mask & Target::METHOD, Target::METHOD);
        assert!(Target::ALL.intersects(Target::ANNOTATION));
    }

    #[test]
    fn test_names() {
        assert_eq!(Target::from_name("ANNOTATION"), Some(Target::ANNOTATION));
        assert_eq!(Target::from_name("method"), None);
        assert_eq!((Target::CLASS | Target::METHOD).to_string(), "CLASS, METHOD");
        assert_eq!(Target::from_bits(0xff), Target::ALL);
    }
}

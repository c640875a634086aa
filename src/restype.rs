#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

/// The type tag stored in an ICO/CUR header.  Only icons can be rebuilt.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum ResourceType {
    /// Plain images (ICO files)
    Icon,
    /// Images with cursor hotspots (CUR files)
    Cursor,
}

impl ResourceType {
    pub(crate) fn from_number(number: u16) -> Option<ResourceType> {
        match number {
            1 => Some(ResourceType::Icon),
            2 => Some(ResourceType::Cursor),
            _ => None,
        }
    }

    /// Returns the numeric tag written to the header.
    pub fn number(&self) -> u16 {
        match *self {
            ResourceType::Icon => 1,
            ResourceType::Cursor => 2,
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::ResourceType;

    #[test]
    fn known_tags() {
        assert_eq!(ResourceType::from_number(1), Some(ResourceType::Icon));
        assert_eq!(ResourceType::from_number(2), Some(ResourceType::Cursor));
        assert_eq!(ResourceType::Icon.number(), 1);
    }

    #[test]
    fn unknown_tags() {
        assert_eq!(ResourceType::from_number(0), None);
        assert_eq!(ResourceType::from_number(3), None);
    }
}

//===========================================================================//

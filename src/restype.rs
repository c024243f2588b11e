#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
/// The container kind declared by the ICONDIR type field.
///
/// Only [`Icon`](ResourceType::Icon) containers parse successfully; a CUR
/// file is recognized so the rejection can say what the file actually was.
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

    pub(crate) fn number(&self) -> u16 {
        match *self {
            ResourceType::Icon => 1,
            ResourceType::Cursor => 2,
        }
    }

    /// Returns the conventional file-format name for this resource type.
    pub fn name(&self) -> &'static str {
        match *self {
            ResourceType::Icon => "ICO",
            ResourceType::Cursor => "CUR",
        }
    }
}

//===========================================================================//


//===========================================================================//

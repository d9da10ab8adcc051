// Entity modules and the typed ids they hang off of.

pub mod course;
pub mod golfer;
pub mod tournament;

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(CourseId);
entity_id!(HoleId);
entity_id!(TeeBoxId);
entity_id!(GolferId);
entity_id!(TournamentId);
entity_id!(EntryId);
entity_id!(GroupId);
entity_id!(MemberId);
entity_id!(ResultId);
entity_id!(EventId);

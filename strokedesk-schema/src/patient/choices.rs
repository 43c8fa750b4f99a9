use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a closed select-field enumeration with its exact wire spellings.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted variant, in form display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Exact, case-sensitive match against the wire spelling.
            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    Gender {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
}

choice_enum! {
    EverMarried {
        Yes => "Yes",
        No => "No",
    }
}

choice_enum! {
    WorkType {
        Private => "Private",
        SelfEmployed => "Self-employed",
        GovtJob => "Govt_job",
        Children => "children",
        NeverWorked => "Never_worked",
    }
}

choice_enum! {
    ResidenceType {
        Urban => "Urban",
        Rural => "Rural",
    }
}

choice_enum! {
    SmokingStatus {
        FormerlySmoked => "formerly smoked",
        NeverSmoked => "never smoked",
        Smokes => "smokes",
        Unknown => "Unknown",
    }
}

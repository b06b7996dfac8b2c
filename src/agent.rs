//! Typed agent identifiers.
//!
//! The two sides of the market are symmetric; we call them `L` and `R`
//! rather than "men"/"women" to keep the core free of any domain framing.
//! `L` and `R` are distinct types so that a caller can never pass an `R` id
//! where an `L` id is expected, and so that graph nodes mixing both sides
//! (see [`crate::rotation::graph`]) can be compared and hashed without ever
//! resorting to identity comparison on a shared representation.

use std::fmt;

macro_rules! agent_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(id: u32) -> Self {
                $name(id)
            }

            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(u: usize) -> Self {
                $name(u as u32)
            }
        }

        impl From<$name> for usize {
            fn from(v: $name) -> Self {
                v.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

agent_id!(L, "An agent on the left side of the market, dense in `[0, N_L)`.");
agent_id!(R, "An agent on the right side of the market, dense in `[0, N_R)`.");

/// A node in one of the rotation-finding graphs, tagging which side it
/// belongs to. Replaces the string-prefix convention (`'m0'`, `'w3'`) of
/// the reference implementation this crate's algorithms are modeled on;
/// every comparison here is a structural `Eq`, never an identity check.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Node {
    L(L),
    R(R),
}

impl From<L> for Node {
    fn from(l: L) -> Self {
        Node::L(l)
    }
}

impl From<R> for Node {
    fn from(r: R) -> Self {
        Node::R(r)
    }
}

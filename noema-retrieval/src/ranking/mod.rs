//! Second-stage ranking behind the `IReranker` seam.

mod lexical;

pub use lexical::LexicalReranker;

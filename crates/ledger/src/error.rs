use super::*;

pub type Result<T = (), E = LedgerError> = std::result::Result<T, E>;

#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum LedgerError {
    #[snafu(display("block has no parents"))]
    NoParents,

    #[snafu(display("block has {count} parents, at most {max} allowed"))]
    TooManyParents { count: usize, max: usize },

    #[snafu(display("block parents are not sorted and unique"))]
    UnsortedParents,

    #[snafu(display("transaction has {count} {kind}, at most {max} allowed"))]
    TooMany {
        kind: &'static str,
        count: usize,
        max: usize,
    },

    #[snafu(display("{kind} is {len} bytes, at most {max} allowed"))]
    TooLarge {
        kind: &'static str,
        len: usize,
        max: usize,
    },

    #[snafu(display("failed to write {kind}: {message}"))]
    Write { kind: &'static str, message: String },

    #[snafu(display("parse error: {message}"))]
    Parse { message: String },
}

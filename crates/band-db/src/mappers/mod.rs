//! Model to entity mappers
//!
//! Rows holding enum columns map through `TryFrom`, failing with a
//! database error when a stored value is not a known variant.

mod band;
mod event;
mod membership;
mod rsvp;
mod user;

use std::str::FromStr;

use band_core::DomainError;

/// Parse a text column into a domain enum
pub(crate) fn parse_column<T: FromStr>(column: &'static str, value: &str) -> Result<T, DomainError> {
    value
        .parse()
        .map_err(|_| DomainError::DatabaseError(format!("unexpected {column} value: {value}")))
}

/// Map every row, stopping at the first malformed one
pub(crate) fn map_rows<M, E>(rows: Vec<M>) -> Result<Vec<E>, DomainError>
where
    E: TryFrom<M, Error = DomainError>,
{
    rows.into_iter().map(E::try_from).collect()
}

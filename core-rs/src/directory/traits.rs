//! User directory trait
//!
//! The relational data service is row oriented: rows are selected with
//! column = value conditions and answer with the requested columns, in
//! request order.

use crate::errors::Result;

/// A `column = value` condition or assignment
pub type ColumnValue<'a> = (&'a str, &'a str);

/// Row-oriented client of the relational data service
pub trait UserDirectory: Send + Sync {
    /// Values of `columns` for every row of `table` matching all of `filter`
    fn fetch(&self, table: &str, filter: &[ColumnValue<'_>], columns: &[&str]) -> Result<Vec<Vec<String>>>;

    /// Assign `set` on every row of `table` matching all of `filter`.
    ///
    /// Matching zero rows is a failure.
    fn update(&self, table: &str, filter: &[ColumnValue<'_>], set: &[ColumnValue<'_>]) -> Result<()>;
}

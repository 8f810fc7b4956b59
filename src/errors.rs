//! Errors and error-related utilities.

use std::{error, fmt, io, result};

/// The result type used throughout this library.
pub type Result<T> = result::Result<T, Error>;

/// The header row does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required column is absent; carries its display name.
    MissingColumn(String),
    /// Dates with a `Restaurants` column and dates with a `Meals` column differ.
    /// Carries the dates found on only one side.
    UnpairedDates {
        restaurants: Vec<String>,
        meals: Vec<String>,
    },
    /// The same date-slot column appears more than once.
    DuplicateColumn(String),
    /// A date-slot key is not a valid `m/d/yy` date.
    InvalidDate(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchemaError::MissingColumn(name) => {
                write!(f, "required column '{name}' not found")
            }
            SchemaError::UnpairedDates { restaurants, meals } => write!(
                f,
                "missing Restaurants or Meals column(s): Restaurants without Meals [{}], Meals without Restaurants [{}]",
                restaurants.join(", "),
                meals.join(", ")
            ),
            SchemaError::DuplicateColumn(name) => write!(f, "column '{name}' appears more than once"),
            SchemaError::InvalidDate(key) => {
                write!(f, "column date '{key}' is not of the form m/d/yy")
            }
        }
    }
}

impl error::Error for SchemaError {}

/// A date or time token that does not match the expected pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormatError {
    pub value: String,
    pub expected: &'static str,
}

impl fmt::Display for TimeFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cannot parse '{}', expected {}", self.value, self.expected)
    }
}

impl error::Error for TimeFormatError {}

/// What is wrong with a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowErrorKind {
    /// Exactly one of the Restaurants and Meals cells of a slot is filled.
    PartialSlot,
    InvalidTime(TimeFormatError),
    /// The Meals cell is not an integer.
    InvalidMeals(String),
    /// A reference name had no match and references are strict.
    UnresolvedReference { table: String, name: String },
}

/// Enough of the row to find it in the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowContext {
    /// 1-based data row number, if known.
    pub line: Option<usize>,
    pub date: Option<String>,
    pub time: String,
    pub recipient: String,
    pub floor: String,
}

/// A row whose data is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub kind: RowErrorKind,
    pub context: RowContext,
}

impl RowError {
    pub fn new(kind: RowErrorKind, context: RowContext) -> RowError {
        RowError { kind, context }
    }

    /// Attach the data row number.
    pub fn at_line(mut self, line: usize) -> RowError {
        self.context.line = Some(line);
        self
    }
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RowErrorKind::PartialSlot => write!(f, "missing Restaurants/Meals"),
            RowErrorKind::InvalidTime(e) => write!(f, "invalid time: {e}"),
            RowErrorKind::InvalidMeals(v) => write!(f, "invalid number of meals '{v}'"),
            RowErrorKind::UnresolvedReference { table, name } => {
                write!(f, "no record named '{name}' in {table}")
            }
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = &self.context;
        if let Some(line) = c.line {
            write!(f, "row {line}: ")?;
        }
        write!(f, "{}", self.kind)?;
        if let Some(date) = &c.date {
            write!(f, " on {date}")?;
        }
        write!(f, " at {} for {}, floor: {}", c.time, c.recipient, c.floor)
    }
}

impl error::Error for RowError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            RowErrorKind::InvalidTime(e) => Some(e),
            _ => None,
        }
    }
}

/// The record store failed or answered with something unexpected.
#[derive(Debug)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "record store: {}", self.0)
    }
}

impl error::Error for StoreError {}

/// Any error that stops an import.
#[derive(Debug)]
pub enum Error {
    Schema(SchemaError),
    Row(RowError),
    Store(StoreError),
    Csv(csv::Error),
    Io(io::Error),
}

impl Error {
    /// Attach a data row number to row errors.
    pub fn at_line(self, line: usize) -> Error {
        match self {
            Error::Row(e) => Error::Row(e.at_line(line)),
            e => e,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Schema(e) => write!(f, "invalid header: {e}"),
            Error::Row(e) => write!(f, "invalid row: {e}"),
            Error::Store(e) => write!(f, "{e}"),
            Error::Csv(e) => write!(f, "CSV: {e}"),
            Error::Io(e) => write!(f, "I/O: {e}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Schema(e) => Some(e),
            Error::Row(e) => Some(e),
            Error::Store(e) => Some(e),
            Error::Csv(e) => Some(e),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<SchemaError> for Error {
    fn from(e: SchemaError) -> Self {
        Error::Schema(e)
    }
}

impl From<RowError> for Error {
    fn from(e: RowError) -> Self {
        Error::Row(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// A helper for constructing [StoreError].
pub fn store_error(s: String) -> Error {
    StoreError(s).into()
}

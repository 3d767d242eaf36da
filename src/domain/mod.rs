// Domain layer - Validation, estimation and form state
pub mod field;
pub mod form;
pub mod format;
pub mod horsepower;

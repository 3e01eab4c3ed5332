//! Measured quantities as `(mean, standard error)` pairs with first-order
//! error propagation through arithmetic.
//!
//! ```
//! use measured_value::{MeasuredValue, Real};
//!
//! let a = MeasuredValue::new(10, 1).unwrap();
//! let b = MeasuredValue::new(20, 2).unwrap();
//! let sum = &a + &b;
//! assert_eq!(sum.mean(), Real::Int(30));
//! assert!((sum.uncertainty().to_f64() - 5f64.sqrt()).abs() < 1e-12);
//!
//! // The same value on both sides is fully correlated with itself.
//! let nothing = &a - &a;
//! assert_eq!(nothing.uncertainty(), Real::Int(0));
//! ```

pub mod error;
pub mod measured;
pub mod ops;
pub mod real;
pub mod uncertain;

pub use error::{Error, ErrorKind, Operation};
pub use measured::MeasuredValue;
pub use real::Real;
pub use uncertain::{Operand, Uncertain};

pub type Result<T> = std::result::Result<T, Error>;

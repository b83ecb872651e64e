//! Workload abstraction
//!
//! A workload is an opaque callable invoked with a fixed argument tuple.
//! The engine only ever calls [`Workload::invoke`] and reads its name; the
//! argument tuple is rendered into [`ArgValue`]s for the result record.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned by a failing workload invocation
#[derive(Debug, Error)]
#[error("{message}")]
pub struct WorkloadError {
    message: String,
}

impl WorkloadError {
    /// Create a workload error with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for WorkloadError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for WorkloadError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for WorkloadError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

pub type WorkloadResult = std::result::Result<(), WorkloadError>;

/// The unit of work under measurement.
///
/// Implementations must tolerate concurrent calls to `invoke` when the
/// benchmark runs more than one worker; the engine does not serialize them.
pub trait Workload<A: Arguments>: Sync {
    /// Name recorded in the benchmark result
    fn name(&self) -> &str;

    /// Run the workload once
    fn invoke(&self, args: &A) -> WorkloadResult;
}

/// A single argument value as recorded in a benchmark result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(v) => write!(f, "{}", v),
            ArgValue::UInt(v) => write!(f, "{}", v),
            ArgValue::Int(v) => write!(f, "{}", v),
            ArgValue::Float(v) => write!(f, "{}", v),
            ArgValue::Str(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! arg_value_from {
    ($variant:ident, $target:ty; $($source:ty),+) => {
        $(
            impl From<$source> for ArgValue {
                fn from(value: $source) -> Self {
                    ArgValue::$variant(value as $target)
                }
            }
        )+
    };
}

arg_value_from!(Int, i64; i8, i16, i32, i64, isize);
arg_value_from!(UInt, u64; u8, u16, u32, u64, usize);
arg_value_from!(Float, f64; f32, f64);

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

/// An argument tuple that can be shared by every worker and recorded in
/// the result
pub trait Arguments: Sync {
    fn values(&self) -> Vec<ArgValue>;
}

impl Arguments for () {
    fn values(&self) -> Vec<ArgValue> {
        Vec::new()
    }
}

impl Arguments for Vec<ArgValue> {
    fn values(&self) -> Vec<ArgValue> {
        self.clone()
    }
}

macro_rules! impl_arguments_for_tuple {
    ($($name:ident),+) => {
        impl<$($name),+> Arguments for ($($name,)+)
        where
            $($name: Clone + Into<ArgValue> + Sync),+
        {
            #[allow(non_snake_case)]
            fn values(&self) -> Vec<ArgValue> {
                let ($($name,)+) = self;
                vec![$($name.clone().into()),+]
            }
        }
    };
}

impl_arguments_for_tuple!(A);
impl_arguments_for_tuple!(A, B);
impl_arguments_for_tuple!(A, B, C);
impl_arguments_for_tuple!(A, B, C, D);

/// Render argument values the way report file names expect, e.g. `(1, 2)`
pub fn format_arguments(values: &[ArgValue]) -> String {
    let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("({})", rendered.join(", "))
}

/// Workload backed by a closure
pub struct FnWorkload<F> {
    name: String,
    f: F,
}

impl<F> FnWorkload<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<A, F> Workload<A> for FnWorkload<F>
where
    A: Arguments,
    F: Fn(&A) -> WorkloadResult + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, args: &A) -> WorkloadResult {
        (self.f)(args)
    }
}

/// Wrap a closure as a named workload
pub fn from_fn<A, F>(name: impl Into<String>, f: F) -> FnWorkload<F>
where
    A: Arguments,
    F: Fn(&A) -> WorkloadResult + Sync,
{
    FnWorkload::new(name, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_tuple_arguments_values() {
        assert!(().values().is_empty());
        assert_eq!((1u32,).values(), vec![ArgValue::UInt(1)]);
        assert_eq!(
            (-3i32, 2.5f64, "x").values(),
            vec![
                ArgValue::Int(-3),
                ArgValue::Float(2.5),
                ArgValue::Str("x".to_string())
            ]
        );
    }

    #[test]
    fn test_format_arguments() {
        assert_eq!(format_arguments(&[]), "()");
        assert_eq!(format_arguments(&(12u32,).values()), "(12)");
        assert_eq!(format_arguments(&(1u8, true).values()), "(1, true)");
    }

    #[test]
    fn test_arg_value_serde_untagged() {
        let values = vec![ArgValue::UInt(4), ArgValue::Str("a".to_string())];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[4,"a"]"#);
    }

    #[test]
    fn test_arg_value_deserialize_prefers_unsigned() {
        let values: Vec<ArgValue> = serde_json::from_str(r#"[3,-3,1.5,false]"#).unwrap();
        assert_eq!(
            values,
            vec![
                ArgValue::UInt(3),
                ArgValue::Int(-3),
                ArgValue::Float(1.5),
                ArgValue::Bool(false)
            ]
        );
    }

    #[test]
    fn test_fn_workload_invokes_closure() {
        let calls = AtomicUsize::new(0);
        let workload = from_fn("count", |&(n,): &(usize,)| {
            calls.fetch_add(n, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(Workload::<(usize,)>::name(&workload), "count");
        workload.invoke(&(3usize,)).unwrap();
        workload.invoke(&(2usize,)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_workload_error_conversions() {
        let err: WorkloadError = "boom".into();
        assert_eq!(err.message(), "boom");
        assert_eq!(err.to_string(), "boom");

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = WorkloadError::from(io);
        assert!(err.message().contains("disk gone"));
    }
}

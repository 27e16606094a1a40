use std::ffi::OsStr;
use std::marker::PhantomData;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::DynStdError;
use crate::{ErrorKind, Result};

mod sealed {
    pub trait Sealed {}
}

#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be parsed from a command line value",
    label = "Unparsable type",
    note = "implement either `TryFrom<&OsStr>`, `TryFrom<&str>` or `FromStr` for it \
    to make it parseable"
)]
pub trait ArgValueInfo<T>: 'static + Sized + sealed::Sealed {
    fn parse(v: &OsStr) -> Result<T>;
}

#[macro_export]
#[doc(hidden)]
macro_rules! arg_value_info {
    ($ty:ty) => {
        $crate::__private::InferValueParser::<$ty, &&&()>($crate::__private::PhantomData).get()
    };
}

pub struct InferValueParser<T, Fuel>(pub PhantomData<(T, Fuel)>);

impl<T, Fuel> Deref for InferValueParser<T, &Fuel> {
    type Target = InferValueParser<T, Fuel>;
    fn deref(&self) -> &Self::Target {
        &InferValueParser(PhantomData)
    }
}

impl<T: for<'a> TryFrom<&'a OsStr, Error: Into<DynStdError>>> InferValueParser<T, &&&()> {
    pub fn get(&self) -> impl ArgValueInfo<T> {
        struct Info;
        impl sealed::Sealed for Info {}
        impl<T: for<'a> TryFrom<&'a OsStr, Error: Into<DynStdError>>> ArgValueInfo<T> for Info {
            fn parse(v: &OsStr) -> Result<T> {
                T::try_from(v).map_err(|err| {
                    ErrorKind::InvalidValue.with_input(v).with_source(err.into())
                })
            }
        }
        Info
    }
}

impl<T: for<'a> TryFrom<&'a str, Error: Into<DynStdError>>> InferValueParser<T, &&()> {
    pub fn get(&self) -> impl ArgValueInfo<T> {
        struct Info;
        impl sealed::Sealed for Info {}
        impl<T: for<'a> TryFrom<&'a str, Error: Into<DynStdError>>> ArgValueInfo<T> for Info {
            fn parse(v: &OsStr) -> Result<T> {
                let v = v.to_str().ok_or_else(|| ErrorKind::InvalidUtf8.with_input(v))?;
                T::try_from(v).map_err(|err| {
                    ErrorKind::InvalidValue.with_input(v).with_source(err.into())
                })
            }
        }
        Info
    }
}

impl<T> InferValueParser<T, &()>
where
    T: FromStr<Err: Into<DynStdError>>,
{
    pub fn get(&self) -> impl ArgValueInfo<T> {
        struct Info;
        impl sealed::Sealed for Info {}
        impl<T> ArgValueInfo<T> for Info
        where
            T: FromStr<Err: Into<DynStdError>>,
        {
            fn parse(v: &OsStr) -> Result<T> {
                let s = v.to_str().ok_or_else(|| ErrorKind::InvalidUtf8.with_input(v))?;
                let t = s.parse::<T>().map_err(|err| {
                    ErrorKind::InvalidValue.with_input(s).with_source(err.into())
                })?;
                Ok(t)
            }
        }
        Info
    }
}

// For error reporting.
// Since `ArgValueInfo` is sealed and all implementations are private, this user type is guaranteed
// to cause an unimplemented error on `ArgValueInfo`.
impl<T> InferValueParser<T, ()> {
    pub fn get(&self) -> T {
        unreachable!()
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::PathBuf;

    use super::*;

    fn has_parser<T>(_: impl ArgValueInfo<T>) {}

    /// Parse through the inferred parser, without naming the parser type.
    fn parse_value<T, P: ArgValueInfo<T>>(_: &P, v: &OsStr) -> Result<T> {
        P::parse(v)
    }

    #[test]
    fn native_impls() {
        has_parser::<OsString>(arg_value_info!(OsString));
        has_parser::<PathBuf>(arg_value_info!(PathBuf));
        has_parser::<String>(arg_value_info!(String));
        has_parser::<usize>(arg_value_info!(usize));

        let _ = || {
            let () = arg_value_info!(());
        };
    }

    #[test]
    fn invalid_number() {
        let err = parse_value::<u8, _>(&arg_value_info!(u8), OsStr::new("300")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(err.to_string(), "invalid value '300': number too large to fit in target type");

        let n: u8 = parse_value(&arg_value_info!(u8), OsStr::new("42")).unwrap();
        assert_eq!(n, 42);
    }
}

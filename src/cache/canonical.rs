//! Rejects inputs whose JSON encoding would be ambiguous
//!
//! JSON has no spelling for NaN or the infinities (serde_json writes all three
//! as `null`), and `Some(())`, `Some(None)` and `None` also all become `null`.
//! Walking the input once before encoding turns those cases into an error, so
//! the cache skips them instead of letting unequal inputs share an entry.

use super::fingerprint::FingerprintError;
use serde::ser::{self, Serialize};

/// Walk `value`, failing on the first part without an unambiguous encoding
pub(crate) fn check<T>(value: &T) -> Result<(), FingerprintError>
where
    T: Serialize + ?Sized,
{
    value.serialize(Checker::default())
}

#[derive(Debug, Default, Clone, Copy)]
struct Checker {
    /// Directly under `Some`, where a null-encoded value cannot be told from `None`
    inside_some: bool,
}

impl Checker {
    fn null_like(self, what: &str) -> Result<(), FingerprintError> {
        if self.inside_some {
            return Err(FingerprintError::non_canonical(format!(
                "Some({what}) encodes the same as None"
            )));
        }
        Ok(())
    }

    fn float(value: f64) -> Result<(), FingerprintError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(FingerprintError::non_canonical(format!(
                "non-finite float {value}"
            )))
        }
    }
}

/// Walks the members of a sequence, tuple, map or struct
struct Members;

impl ser::Serializer for Checker {
    type Ok = ();
    type Error = FingerprintError;
    type SerializeSeq = Members;
    type SerializeTuple = Members;
    type SerializeTupleStruct = Members;
    type SerializeTupleVariant = Members;
    type SerializeMap = Members;
    type SerializeStruct = Members;
    type SerializeStructVariant = Members;

    fn serialize_bool(self, _: bool) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_f32(self, value: f32) -> Result<(), FingerprintError> {
        Self::float(f64::from(value))
    }

    fn serialize_f64(self, value: f64) -> Result<(), FingerprintError> {
        Self::float(value)
    }

    fn serialize_char(self, _: char) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<(), FingerprintError> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), FingerprintError> {
        self.null_like("None")
    }

    fn serialize_some<T>(self, value: &T) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(Checker { inside_some: true })
    }

    fn serialize_unit(self) -> Result<(), FingerprintError> {
        self.null_like("()")
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<(), FingerprintError> {
        self.null_like(name)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), FingerprintError> {
        Ok(())
    }

    // Newtype structs are transparent in JSON, so `Some(Wrapper(()))` is still null
    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(Checker::default())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Members, FingerprintError> {
        Ok(Members)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Members, FingerprintError> {
        Ok(Members)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Members, FingerprintError> {
        Ok(Members)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Members, FingerprintError> {
        Ok(Members)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Members, FingerprintError> {
        Ok(Members)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Members, FingerprintError> {
        Ok(Members)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Members, FingerprintError> {
        Ok(Members)
    }
}

impl ser::SerializeSeq for Members {
    type Ok = ();
    type Error = FingerprintError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        check(value)
    }

    fn end(self) -> Result<(), FingerprintError> {
        Ok(())
    }
}

impl ser::SerializeTuple for Members {
    type Ok = ();
    type Error = FingerprintError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        check(value)
    }

    fn end(self) -> Result<(), FingerprintError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for Members {
    type Ok = ();
    type Error = FingerprintError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        check(value)
    }

    fn end(self) -> Result<(), FingerprintError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for Members {
    type Ok = ();
    type Error = FingerprintError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        check(value)
    }

    fn end(self) -> Result<(), FingerprintError> {
        Ok(())
    }
}

impl ser::SerializeMap for Members {
    type Ok = ();
    type Error = FingerprintError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        check(key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        check(value)
    }

    fn end(self) -> Result<(), FingerprintError> {
        Ok(())
    }
}

impl ser::SerializeStruct for Members {
    type Ok = ();
    type Error = FingerprintError;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        check(value)
    }

    fn end(self) -> Result<(), FingerprintError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for Members {
    type Ok = ();
    type Error = FingerprintError;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<(), FingerprintError>
    where
        T: Serialize + ?Sized,
    {
        check(value)
    }

    fn end(self) -> Result<(), FingerprintError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Marker;

    #[derive(Serialize)]
    struct Wrapper(());

    #[derive(Serialize)]
    struct Reading {
        sensor: String,
        value: f64,
    }

    #[test]
    fn test_nested_non_finite_floats_are_found() {
        assert!(check(&vec![1.0, f64::NAN]).is_err());
        assert!(check(&(1u8, f32::INFINITY)).is_err());

        let reading = Reading {
            sensor: "north".to_string(),
            value: f64::NEG_INFINITY,
        };
        assert!(check(&reading).is_err());

        let mut by_name = BTreeMap::new();
        by_name.insert("load", f64::NAN);
        assert!(check(&by_name).is_err());
    }

    #[test]
    fn test_null_directly_under_some_is_rejected() {
        assert!(check(&Some(())).is_err());
        assert!(check(&Some(None::<u8>)).is_err());
        assert!(check(&Some(Marker)).is_err());
        assert!(check(&Some(Wrapper(()))).is_err());
        assert!(check(&Some(Some(()))).is_err());
    }

    #[test]
    fn test_unambiguous_inputs_pass() {
        assert!(check(&None::<()>).is_ok());
        assert!(check(&()).is_ok());
        assert!(check(&Some(0.0)).is_ok());
        assert!(check(&Some(vec![None::<u8>])).is_ok());
        assert!(check(&(Marker, f64::MAX, "text", -7i128)).is_ok());
    }
}

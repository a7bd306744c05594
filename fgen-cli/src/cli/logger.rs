use serde::{ser, Serialize};
use std::{fmt::Display, io::Write};

macro_rules! impl_scalar {
    ($(($method:ident, $ty:ty)),+ $(,)?) => {$(
        fn $method(self, v: $ty) -> Result<Self::Ok, Self::Error> {
            self.scalar(v)
        }
    )+};
}

#[derive(Debug)]
pub(crate) struct Error(std::io::Error);

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self(std::io::Error::other(msg.to_string()))
    }
}

/// A TOML-like report writer.
///
/// Nested structs are flattened into dotted keys (`fb.l2=0.120043`),
/// sequences and map values are written on one line.
pub(crate) struct Logger<W: Write> {
    w: W,
    path: Vec<&'static str>,
    inline: usize,
}

impl<W: Write> Logger<W> {
    pub(crate) fn new(w: W) -> Self {
        Self { w, path: Vec::new(), inline: 0 }
    }

    pub(crate) fn top_title(&mut self, title: &str) -> std::io::Result<()> {
        writeln!(self.w, "[{title}]")
    }

    pub(crate) fn title(&mut self, title: &str) -> std::io::Result<()> {
        writeln!(self.w, "\n[{title}]")
    }

    pub(crate) fn log<S: Serialize>(&mut self, s: S) -> std::io::Result<()> {
        s.serialize(self).map_err(|e| e.0)
    }

    pub(crate) fn flush(&mut self) -> std::io::Result<()> {
        self.w.flush()
    }

    fn key(&mut self) -> Result<(), Error> {
        if !self.path.is_empty() {
            write!(self.w, "{}=", self.path.join("."))?;
        }
        Ok(())
    }

    fn scalar(&mut self, v: impl Display) -> Result<(), Error> {
        if self.inline > 0 {
            write!(self.w, "{v}")?;
        } else {
            self.key()?;
            writeln!(self.w, "{v}")?;
        }
        Ok(())
    }

    fn begin(&mut self, name: &str) -> Result<(), Error> {
        if self.inline == 0 {
            self.key()?;
        }
        self.inline += 1;
        write!(self.w, "{name}(")?;
        Ok(())
    }

    fn end(&mut self) -> Result<(), Error> {
        self.inline -= 1;
        write!(self.w, ")")?;
        if self.inline == 0 {
            writeln!(self.w)?;
        }
        Ok(())
    }

    // Struct and map fields
    fn fields(&mut self) -> Result<Compound<'_, W>, Error> {
        let inline = self.inline > 0;
        if inline {
            self.begin("")?;
        }
        Ok(Compound { log: self, inline, first: true })
    }

    fn items(&mut self, name: &str) -> Result<Compound<'_, W>, Error> {
        self.begin(name)?;
        Ok(Compound { log: self, inline: true, first: true })
    }
}

impl<'a, W: Write> ser::Serializer for &'a mut Logger<W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'a, W>;
    type SerializeTuple = Compound<'a, W>;
    type SerializeTupleStruct = Compound<'a, W>;
    type SerializeTupleVariant = Compound<'a, W>;
    type SerializeMap = Compound<'a, W>;
    type SerializeStruct = Compound<'a, W>;
    type SerializeStructVariant = Compound<'a, W>;

    impl_scalar!(
        (serialize_bool, bool),
        (serialize_i8, i8),
        (serialize_i16, i16),
        (serialize_i32, i32),
        (serialize_i64, i64),
        (serialize_u8, u8),
        (serialize_u16, u16),
        (serialize_u32, u32),
        (serialize_u64, u64),
        (serialize_char, char),
        (serialize_str, &str),
        (serialize_unit_struct, &'static str),
    );

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        ser::Serializer::serialize_f64(self, v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        self.scalar(format_args!("{v:.06}"))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        ser::Serializer::collect_seq(self, v)
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        // Absent fields are skipped
        if self.inline > 0 {
            self.scalar("none")?;
        }
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        self.scalar("()")
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.scalar(variant)
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        self.begin(variant)?;
        value.serialize(&mut *self)?;
        self.end()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        self.items("")
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.items("")
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.items(name)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.items(variant)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        self.fields()
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.fields()
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.fields()
    }
}

pub(crate) struct Compound<'a, W: Write> {
    log: &'a mut Logger<W>,
    // Written on one line
    inline: bool,
    first: bool,
}

impl<W: Write> Compound<'_, W> {
    fn sep(&mut self) -> Result<(), Error> {
        if !std::mem::replace(&mut self.first, false) {
            write!(self.log.w, ", ")?;
        }
        Ok(())
    }

    fn item<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        self.sep()?;
        value.serialize(&mut *self.log)
    }

    fn field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        if self.inline {
            self.sep()?;
            write!(self.log.w, "{key}=")?;
            return value.serialize(&mut *self.log);
        }
        self.log.path.push(key);
        let res = value.serialize(&mut *self.log);
        self.log.path.pop();
        res
    }

    fn finish(self) -> Result<(), Error> {
        if self.inline {
            self.log.end()
        } else {
            Ok(())
        }
    }
}

macro_rules! impl_ser_items {
    ($(($ty:ident, $method:ident)),+ $(,)?) => {$(
        impl<W: Write> ser::$ty for Compound<'_, W> {
            type Ok = ();
            type Error = Error;

            fn $method<T>(&mut self, value: &T) -> Result<Self::Ok, Self::Error>
            where
                T: ?Sized + Serialize,
            {
                self.item(value)
            }

            fn end(self) -> Result<Self::Ok, Self::Error> {
                self.finish()
            }
        }
    )+};
}

impl_ser_items!(
    (SerializeSeq, serialize_element),
    (SerializeTuple, serialize_element),
    (SerializeTupleStruct, serialize_field),
    (SerializeTupleVariant, serialize_field),
);

macro_rules! impl_ser_fields {
    ($($ty:ident),+ $(,)?) => {$(
        impl<W: Write> ser::$ty for Compound<'_, W> {
            type Ok = ();
            type Error = Error;

            fn serialize_field<T>(
                &mut self,
                key: &'static str,
                value: &T,
            ) -> Result<Self::Ok, Self::Error>
            where
                T: ?Sized + Serialize,
            {
                self.field(key, value)
            }

            fn end(self) -> Result<Self::Ok, Self::Error> {
                self.finish()
            }
        }
    )+};
}

impl_ser_fields!(SerializeStruct, SerializeStructVariant);

// Map entries are written as `prefix.key=value` lines, keys and values are
// always inline
impl<W: Write> ser::SerializeMap for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        if self.inline {
            self.sep()?;
        } else {
            for p in &self.log.path {
                write!(self.log.w, "{p}.")?;
            }
        }
        self.log.inline += 1;
        let res = key.serialize(&mut *self.log);
        self.log.inline -= 1;
        res?;
        write!(self.log.w, "=")?;
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: ?Sized + Serialize,
    {
        self.log.inline += 1;
        let res = value.serialize(&mut *self.log);
        self.log.inline -= 1;
        res?;
        if !self.inline {
            writeln!(self.log.w)?;
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Logger;

    fn dump<S: serde::Serialize>(s: S) -> String {
        let mut buf = Vec::new();
        Logger::new(&mut buf).log(s).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn flatten_nested_struct() {
        let fb = fgen::FourBar::new([1., 0.5, 1.2, 0.75]);
        let s = dump(&fb);
        assert_eq!(s, "l1=1.000000\nl2=0.500000\nl3=1.200000\nl4=0.750000\n");
        let k = fgen::FreudensteinCoef { k1: 1., k2: 2., k3: 0.5 };
        let m = fgen::AngleMapping {
            input: fgen::Affine { slope: 2., intercept: 0. },
            output: fgen::Affine { slope: 1., intercept: -1. },
        };
        let s = dump((k, m));
        assert_eq!(
            s,
            "((k1=1.000000, k2=2.000000, k3=0.500000), \
             (input=(slope=2.000000, intercept=0.000000), \
             output=(slope=1.000000, intercept=-1.000000)))\n"
        );
    }

    #[test]
    fn map_entries() {
        let stat = fgen::SweepStat { visited: 3, rejected: [1, 0, 0, 0, 2, 0, 0], ..Default::default() };
        let s = dump(super::super::syn::Rejections(&stat));
        assert!(s.starts_with("Mapping=1\nSingular=0\n"));
        assert!(s.contains("NonPositive=2\n"));
    }
}

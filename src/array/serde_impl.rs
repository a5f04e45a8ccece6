use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use serde::{Deserialize, Deserializer};

use super::GrowableArray;
use crate::alloc::AllocStrategy;

impl<T: Serialize, A: AllocStrategy> Serialize for GrowableArray<T, A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

struct ArrayVisitor<T, A> {
    _marker: PhantomData<(T, A)>,
}

impl<'de, T, A> Visitor<'de> for ArrayVisitor<T, A>
where
    T: Deserialize<'de>,
    A: AllocStrategy + Default,
{
    type Value = GrowableArray<T, A>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Self::Value, S::Error> {
        let mut array = GrowableArray::new_in(A::default());
        // untrusted size hints are capped
        let hint = seq.size_hint().unwrap_or(0).min(4096);
        array.reserve(hint).map_err(de::Error::custom)?;
        while let Some(value) = seq.next_element()? {
            array.push_back(value).map_err(de::Error::custom)?;
        }
        Ok(array)
    }
}

impl<'de, T, A> Deserialize<'de> for GrowableArray<T, A>
where
    T: Deserialize<'de>,
    A: AllocStrategy + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(ArrayVisitor {
            _marker: PhantomData,
        })
    }
}

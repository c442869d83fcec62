use crate::{bank::StringBank, compat::Box, Sequence, SymbolTable};
use core::{fmt, hash::BuildHasher, marker::PhantomData};
use serde::{
    de::{Deserialize, Deserializer, Error as DeError, SeqAccess, Visitor},
    ser::{Serialize, SerializeSeq, Serializer},
};

impl Serialize for Sequence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.to_u32())
    }
}

impl<'de> Deserialize<'de> for Sequence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Sequence::from_u32(value)
            .ok_or_else(|| D::Error::custom("sequence numbers are 1-based and never zero"))
    }
}

impl<B, H> Serialize for SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (_, string) in self {
            seq.serialize_element(string)?;
        }
        seq.end()
    }
}

impl<'de, B, H> Deserialize<'de> for SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<SymbolTable<B, H>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SymbolTableVisitor::default())
    }
}

struct SymbolTableVisitor<B, H>
where
    B: StringBank,
    H: BuildHasher,
{
    mark: PhantomData<(B, H)>,
}

impl<B, H> Default for SymbolTableVisitor<B, H>
where
    B: StringBank,
    H: BuildHasher,
{
    fn default() -> Self {
        SymbolTableVisitor {
            mark: PhantomData,
        }
    }
}

impl<'de, B, H> Visitor<'de> for SymbolTableVisitor<B, H>
where
    B: StringBank,
    H: BuildHasher + Default,
{
    type Value = SymbolTable<B, H>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a contiguous sequence of strings")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut table: SymbolTable<B, H> = SymbolTable::with_capacity_and_hasher(
            seq.size_hint().unwrap_or(0),
            H::default(),
        )
        .map_err(A::Error::custom)?;
        while let Some(string) = seq.next_element::<Box<str>>()? {
            table.try_get_or_intern(&string).map_err(A::Error::custom)?;
        }
        Ok(table)
    }
}

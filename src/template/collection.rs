//! Templates for arrays, maps and nullable values.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use super::{Template, Templated};
use crate::error::Result;
use crate::io::{Input, Output};
use crate::packer::{Packer, checked_len};
use crate::unpacker::Unpacker;

/// An array whose elements all use the template `E`.
///
/// Elements are written as required values; wrap `E` in an
/// [`OptionTemplate`] to allow nil elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListTemplate<E> {
    element: E,
}

impl<E> ListTemplate<E> {
    pub fn new(element: E) -> Self {
        Self { element }
    }
}

impl<T, E: Template<T>> Template<Vec<T>> for ListTemplate<E> {
    fn write_present<O: Output>(&self, pk: &mut Packer<O>, value: &Vec<T>) -> Result<()> {
        pk.write_array_begin(checked_len(value.len())?)?;
        for item in value {
            self.element.write(pk, Some(item), true)?;
        }
        pk.write_array_end(true)
    }

    fn read_present<I: Input>(&self, u: &mut Unpacker<I>, to: Option<Vec<T>>) -> Result<Vec<T>> {
        let size = u.read_array_begin()?;
        let mut list = to.unwrap_or_default();
        list.clear();
        list.reserve((size as usize).min(1024));
        for _ in 0..size {
            list.push(self.element.read_present(u, None)?);
        }
        u.read_array_end(true)?;
        Ok(list)
    }
}

impl<T: Templated> Templated for Vec<T> {
    type Template = ListTemplate<T::Template>;

    fn template() -> Self::Template {
        ListTemplate::new(T::template())
    }
}

/// A map whose keys use `K` and values use `V`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapTemplate<K, V> {
    key: K,
    value: V,
}

impl<K, V> MapTemplate<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    fn write_entries<'a, O, KT, VT>(
        &self,
        pk: &mut Packer<O>,
        len: usize,
        entries: impl Iterator<Item = (&'a KT, &'a VT)>,
    ) -> Result<()>
    where
        O: Output,
        KT: 'a,
        VT: 'a,
        K: Template<KT>,
        V: Template<VT>,
    {
        pk.write_map_begin(checked_len(len)?)?;
        for (k, v) in entries {
            self.key.write(pk, Some(k), true)?;
            self.value.write(pk, Some(v), true)?;
        }
        pk.write_map_end(true)
    }

    fn read_entries<I, KT, VT>(
        &self,
        u: &mut Unpacker<I>,
        mut insert: impl FnMut(KT, VT),
    ) -> Result<()>
    where
        I: Input,
        K: Template<KT>,
        V: Template<VT>,
    {
        let size = u.read_map_begin()?;
        for _ in 0..size {
            let k = self.key.read_present(u, None)?;
            let v = self.value.read_present(u, None)?;
            insert(k, v);
        }
        u.read_map_end(true)
    }
}

impl<KT, VT, K, V> Template<HashMap<KT, VT>> for MapTemplate<K, V>
where
    KT: Eq + Hash,
    K: Template<KT>,
    V: Template<VT>,
{
    fn write_present<O: Output>(&self, pk: &mut Packer<O>, value: &HashMap<KT, VT>) -> Result<()> {
        self.write_entries(pk, value.len(), value.iter())
    }

    fn read_present<I: Input>(
        &self,
        u: &mut Unpacker<I>,
        to: Option<HashMap<KT, VT>>,
    ) -> Result<HashMap<KT, VT>> {
        let mut map = to.unwrap_or_default();
        map.clear();
        self.read_entries(u, |k, v| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}

impl<KT, VT, K, V> Template<BTreeMap<KT, VT>> for MapTemplate<K, V>
where
    KT: Ord,
    K: Template<KT>,
    V: Template<VT>,
{
    fn write_present<O: Output>(&self, pk: &mut Packer<O>, value: &BTreeMap<KT, VT>) -> Result<()> {
        self.write_entries(pk, value.len(), value.iter())
    }

    fn read_present<I: Input>(
        &self,
        u: &mut Unpacker<I>,
        to: Option<BTreeMap<KT, VT>>,
    ) -> Result<BTreeMap<KT, VT>> {
        let mut map = to.unwrap_or_default();
        map.clear();
        self.read_entries(u, |k, v| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}

impl<KT: Templated + Eq + Hash, VT: Templated> Templated for HashMap<KT, VT> {
    type Template = MapTemplate<KT::Template, VT::Template>;

    fn template() -> Self::Template {
        MapTemplate::new(KT::template(), VT::template())
    }
}

impl<KT: Templated + Ord, VT: Templated> Templated for BTreeMap<KT, VT> {
    type Template = MapTemplate<KT::Template, VT::Template>;

    fn template() -> Self::Template {
        MapTemplate::new(KT::template(), VT::template())
    }
}

/// Makes the template `E` nullable: `None` is written as nil and nil reads
/// back as `None`, wherever the value sits.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionTemplate<E> {
    inner: E,
}

impl<E> OptionTemplate<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<T, E: Template<T>> Template<Option<T>> for OptionTemplate<E> {
    fn write_present<O: Output>(&self, pk: &mut Packer<O>, value: &Option<T>) -> Result<()> {
        self.inner.write(pk, value.as_ref(), false)
    }

    fn read_present<I: Input>(
        &self,
        u: &mut Unpacker<I>,
        to: Option<Option<T>>,
    ) -> Result<Option<T>> {
        self.inner.read(u, to.flatten(), false)
    }
}

impl<T: Templated> Templated for Option<T> {
    type Template = OptionTemplate<T::Template>;

    fn template() -> Self::Template {
        OptionTemplate::new(T::template())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use bytes::BytesMut;

    fn packed<T: Templated>(value: &T) -> Vec<u8> {
        let mut pk = Packer::new(BytesMut::new());
        pk.pack(value).expect("pack failed");
        pk.into_inner().to_vec()
    }

    #[test]
    fn list_of_integers() {
        let bytes = packed(&vec![1i32, 200, -40]);
        assert_eq!(bytes, [0x93, 0x01, 0xCC, 0xC8, 0xD0, 0xD8]);
        let back: Vec<i32> = Unpacker::new(&bytes[..]).unpack().unwrap();
        assert_eq!(back, vec![1, 200, -40]);
    }

    #[test]
    fn list_reuses_existing_target() {
        let bytes = packed(&vec![true, false]);
        let mut u = Unpacker::new(&bytes[..]);
        let reused = ListTemplate::new(crate::template::BoolTemplate)
            .read(&mut u, Some(vec![false; 8]), true)
            .unwrap();
        assert_eq!(reused, Some(vec![true, false]));
    }

    #[test]
    fn list_rejects_nil_elements_unless_optional() {
        let bytes = packed(&vec![Some(1i64), None, Some(3)]);
        assert_eq!(bytes, [0x93, 0x01, 0xC0, 0x03]);
        assert!(Unpacker::new(&bytes[..]).unpack::<Vec<i64>>().is_err());
        let back: Vec<Option<i64>> = Unpacker::new(&bytes[..]).unpack().unwrap();
        assert_eq!(back, vec![Some(1), None, Some(3)]);
    }

    #[test]
    fn btree_map_round_trip() {
        let map = BTreeMap::from([("a".to_string(), 1u8), ("b".to_string(), 2u8)]);
        let bytes = packed(&map);
        assert_eq!(bytes, [0x82, 0xA1, b'a', 0x01, 0xA1, b'b', 0x02]);
        let back: BTreeMap<String, u8> = Unpacker::new(&bytes[..]).unpack().unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn hash_map_round_trip() {
        let map = HashMap::from([
            (1u16, vec!["x".to_string()]),
            (500u16, vec![]),
        ]);
        let bytes = packed(&map);
        let back: HashMap<u16, Vec<String>> = Unpacker::new(&bytes[..]).unpack().unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn map_values_can_be_untyped() {
        let map = BTreeMap::from([(0u8, Value::Nil), (1u8, Value::from("one"))]);
        let bytes = packed(&map);
        let back: BTreeMap<u8, Value> = Unpacker::new(&bytes[..]).unpack().unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn nested_options() {
        let bytes = packed(&Some(Some(5u8)));
        assert_eq!(bytes, [0x05]);
        let bytes = packed(&None::<u8>);
        assert_eq!(bytes, [0xC0]);
        let back: Option<u8> = Unpacker::new(&bytes[..]).unpack().unwrap();
        assert_eq!(back, None);
    }
}

use super::error::RuntimeErrorKind;
use super::Value;
use std::collections::HashMap;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// 64-bit FNV-1a.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKeyKind {
    Bool,
    Integer,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: HashKeyKind,
    pub value: u64,
}

impl Value {
    /// Only booleans, integers and strings can key a hash.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Bool(v) => Some(HashKey {
                kind: HashKeyKind::Bool,
                value: u64::from(*v),
            }),
            Value::Integer(v) => Some(HashKey {
                kind: HashKeyKind::Integer,
                value: *v as u64,
            }),
            Value::String(v) => Some(HashKey {
                kind: HashKeyKind::String,
                value: fnv1a(v.as_bytes()),
            }),
            _ => None,
        }
    }
}

/// A hash value that remembers the order its keys were first inserted in.
#[derive(Debug, Clone, Default)]
pub struct HashTable {
    indices: HashMap<HashKey, usize>,
    entries: Vec<(Value, Value)>,
}

impl HashTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserting an existing key replaces its value in place.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<(), RuntimeErrorKind> {
        let hash_key = key
            .hash_key()
            .ok_or(RuntimeErrorKind::UnhashableKey(key.type_name()))?;
        match self.indices.get(&hash_key) {
            Some(&index) => self.entries[index] = (key, value),
            None => {
                self.indices.insert(hash_key, self.entries.len());
                self.entries.push((key, value));
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &Value) -> Result<Option<&Value>, RuntimeErrorKind> {
        let hash_key = key
            .hash_key()
            .ok_or(RuntimeErrorKind::UnhashableKey(key.type_name()))?;
        Ok(self
            .indices
            .get(&hash_key)
            .map(|&index| &self.entries[index].1))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn equal_strings_share_a_key() {
        let lhs = Value::String("name".into()).hash_key();
        let rhs = Value::String("name".into()).hash_key();
        assert_eq!(lhs, rhs);
        assert_ne!(lhs, Value::String("other".into()).hash_key());
    }

    #[test]
    fn booleans_and_integers_do_not_collide() {
        assert_ne!(Value::Bool(true).hash_key(), Value::Integer(1).hash_key());
    }

    #[test]
    fn reinsertion_keeps_position() {
        let mut table = HashTable::new();
        table.insert(Value::Integer(1), Value::Integer(10)).unwrap();
        table.insert(Value::Integer(2), Value::Integer(20)).unwrap();
        table.insert(Value::Integer(1), Value::Integer(30)).unwrap();
        assert_eq!(table.len(), 2);
        let first = table.iter().next().unwrap();
        assert!(first.1.is_equal(&Value::Integer(30)));
    }

    #[test]
    fn unhashable_keys_are_rejected() {
        let mut table = HashTable::new();
        let result = table.insert(Value::Null, Value::Integer(1));
        assert_eq!(result, Err(RuntimeErrorKind::UnhashableKey("NULL")));
    }
}

//! Bidirectional native key code ↔ [`Key`] lookup.

use crate::input::Key;

/// Per-session mapping between a backend's native key codes and [`Key`].
///
/// Built once when a window opens and never mutated afterwards. Both
/// directions are direct array lookups.
///
/// When several native codes map to the same key (for example the main
/// Return key and keypad Enter both resolve to [`Key::Return`]), the reverse
/// direction keeps the first code encountered while building. Callers that
/// feed codes in ascending order therefore always get the lowest code back.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    forward: Vec<Key>,
    reverse: Vec<Option<u32>>,
}

impl KeyTable {
    /// Builds a table from `(native code, key)` pairs.
    ///
    /// Pairs mapping to [`Key::Unknown`] only reserve forward space, so a
    /// later pair can still map that code. If a native code is mapped twice
    /// the first mapped entry wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, Key)>,
    {
        let mut forward: Vec<Key> = Vec::new();
        let mut reverse: Vec<Option<u32>> = vec![None; Key::COUNT];

        for (code, key) in pairs {
            let slot = code as usize;
            if forward.len() <= slot {
                forward.resize(slot + 1, Key::Unknown);
            } else if forward[slot] != Key::Unknown {
                continue;
            }

            if key == Key::Unknown {
                continue;
            }

            forward[slot] = key;
            reverse[key.index()].get_or_insert(code);
        }

        Self { forward, reverse }
    }

    /// Resolves a native code. Unmapped or out-of-range codes yield
    /// [`Key::Unknown`].
    pub fn from_native_key_code(&self, code: u32) -> Key {
        self.forward
            .get(code as usize)
            .copied()
            .unwrap_or(Key::Unknown)
    }

    /// Native code for `key`, if this session's keyboard has one.
    pub fn to_native_key_code(&self, key: Key) -> Option<u32> {
        self.reverse.get(key.index()).copied().flatten()
    }

    /// Number of native codes with a mapped key.
    pub fn len(&self) -> usize {
        self.forward.iter().filter(|key| **key != Key::Unknown).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over mapped `(native code, key)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Key)> + '_ {
        self.forward
            .iter()
            .enumerate()
            .filter(|(_, key)| **key != Key::Unknown)
            .map(|(code, key)| (code as u32, *key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_both_directions() {
        let table = KeyTable::from_pairs([(9, Key::Escape), (38, Key::A)]);
        assert_eq!(table.from_native_key_code(9), Key::Escape);
        assert_eq!(table.from_native_key_code(38), Key::A);
        assert_eq!(table.to_native_key_code(Key::Esc), Some(9));
        assert_eq!(table.to_native_key_code(Key::A), Some(38));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn unmapped_codes_resolve_to_unknown() {
        let table = KeyTable::from_pairs([(10, Key::Num1), (12, Key::Unknown)]);
        assert_eq!(table.from_native_key_code(0), Key::Unknown);
        assert_eq!(table.from_native_key_code(12), Key::Unknown);
        assert_eq!(table.from_native_key_code(u32::MAX), Key::Unknown);
        assert_eq!(table.to_native_key_code(Key::Unknown), None);
        assert_eq!(table.to_native_key_code(Key::Z), None);
    }

    #[test]
    fn first_code_wins_for_shared_keys() {
        let table = KeyTable::from_pairs([(36, Key::Return), (104, Key::Enter)]);
        assert_eq!(table.from_native_key_code(36), Key::Return);
        assert_eq!(table.from_native_key_code(104), Key::Return);
        assert_eq!(table.to_native_key_code(Key::Return), Some(36));
    }

    #[test]
    fn first_entry_wins_for_repeated_codes() {
        let table = KeyTable::from_pairs([(50, Key::LShift), (50, Key::RShift)]);
        assert_eq!(table.from_native_key_code(50), Key::LShift);
        assert_eq!(table.to_native_key_code(Key::RShift), None);
    }

    #[test]
    fn unknown_entry_does_not_claim_a_code() {
        let table = KeyTable::from_pairs([(12, Key::Unknown), (12, Key::A), (12, Key::B)]);
        assert_eq!(table.from_native_key_code(12), Key::A);
        assert_eq!(table.to_native_key_code(Key::A), Some(12));
        assert_eq!(table.to_native_key_code(Key::B), None);
    }

    #[test]
    fn iter_is_in_code_order() {
        let table = KeyTable::from_pairs([(20, Key::B), (5, Key::A)]);
        let pairs: Vec<_> = table.iter().collect();
        assert_eq!(pairs, vec![(5, Key::A), (20, Key::B)]);
    }
}

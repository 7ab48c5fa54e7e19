//! Dense integer ids for assets.
//!
//! The graph indexes and the path search work on `u32` ids instead of
//! asset strings. Ids of assets that no longer have any edge are recycled.

use super::asset::Asset;
use std::collections::HashMap;

/// Dense identifier of an interned asset.
pub type AssetId = u32;

/// Maps canonical asset strings to dense ids and back.
#[derive(Debug, Default)]
pub struct AssetInterner {
    ids: HashMap<String, AssetId>,
    assets: Vec<Option<Asset>>,
    vacant: Vec<AssetId>,
}

impl AssetInterner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `asset`, if it is interned.
    #[must_use]
    pub fn get(&self, asset: &Asset) -> Option<AssetId> {
        self.ids.get(&asset.canonical()).copied()
    }

    /// Returns the id of `asset`, interning it if needed.
    ///
    /// The second element is `true` when a new id was handed out.
    pub fn get_or_insert(&mut self, asset: &Asset) -> (AssetId, bool) {
        let key = asset.canonical();
        if let Some(id) = self.ids.get(&key) {
            return (*id, false);
        }
        let id = match self.vacant.pop() {
            Some(id) => {
                self.assets[id as usize] = Some(asset.clone());
                id
            }
            None => {
                self.assets.push(Some(asset.clone()));
                AssetId::try_from(self.assets.len() - 1)
                    .unwrap_or_else(|_| panic!("asset id space exhausted"))
            }
        };
        self.ids.insert(key, id);
        (id, true)
    }

    /// Returns the asset behind `id`, if the id is in use.
    #[must_use]
    pub fn asset(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(id as usize).and_then(Option::as_ref)
    }

    /// Releases `id` so it can be handed out again.
    pub fn release(&mut self, id: AssetId) {
        if let Some(slot) = self.assets.get_mut(id as usize)
            && let Some(asset) = slot.take()
        {
            self.ids.remove(&asset.canonical());
            self.vacant.push(id);
        }
    }

    /// Upper bound (exclusive) of the ids handed out so far.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.assets.len()
    }

    /// Number of assets currently interned.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` when no asset is interned.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

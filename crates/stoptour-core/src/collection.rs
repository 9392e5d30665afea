//! Ordered block list for a single stop page.
//!
//! Blocks are stored in display order, so a block's `order` always equals its
//! position in the backing vector. Every mutation renumbers the affected
//! blocks before returning, which keeps the orders a permutation of `0..N-1`
//! at every observation point.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::blocks::{BlockKind, BlockPayload, ContentBlock};
use crate::error::CollectionError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ContentBlock>", into = "Vec<ContentBlock>")]
pub struct BlockCollection {
    blocks: Vec<ContentBlock>,
}

impl BlockCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt blocks loaded from a stored document.
    ///
    /// Blocks are sorted by their stored `order` (ties keep document order) and
    /// renumbered `0..N-1`, so documents with gaps load cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateId`] if two blocks share an id.
    pub fn from_blocks(mut blocks: Vec<ContentBlock>) -> Result<Self, CollectionError> {
        if let Some(id) = first_duplicate_id(&blocks) {
            return Err(CollectionError::DuplicateId { id });
        }

        blocks.sort_by_key(ContentBlock::order);
        let mut collection = Self { blocks };
        if collection.renumber_from(0) {
            tracing::warn!(
                blocks = collection.len(),
                "stored block orders were not contiguous; renumbered"
            );
        }
        Ok(collection)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks in display order (ascending `order`).
    pub fn iter(&self) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ContentBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    /// Block ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.blocks.iter().map(ContentBlock::id).collect()
    }

    /// Create an empty block of `kind` and append it at `order = len`.
    pub fn add(&mut self, kind: BlockKind) -> &ContentBlock {
        self.push(ContentBlock::empty(kind))
    }

    /// Append an already-built block at the end.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateId`] if the id is already present.
    pub fn insert(&mut self, block: ContentBlock) -> Result<&ContentBlock, CollectionError> {
        if self.position(block.id()).is_some() {
            return Err(CollectionError::DuplicateId {
                id: block.id().to_string(),
            });
        }
        Ok(self.push(block))
    }

    fn push(&mut self, mut block: ContentBlock) -> &ContentBlock {
        let order = self.blocks.len();
        block.set_order(order);
        tracing::debug!(block_id = block.id(), kind = %block.kind(), order, "block added");
        self.blocks.push(block);
        &self.blocks[order]
    }

    /// Replace the payload of block `id`. `id` and `order` are untouched.
    ///
    /// # Errors
    ///
    /// [`CollectionError::BlockNotFound`] if `id` is absent, or
    /// [`CollectionError::KindMismatch`] if `payload` is a different kind.
    /// The collection is unchanged on error.
    pub fn update(&mut self, id: &str, payload: BlockPayload) -> Result<(), CollectionError> {
        let idx = self.require(id)?;
        let block = &mut self.blocks[idx];
        if block.kind() != payload.kind() {
            return Err(CollectionError::KindMismatch {
                id: id.to_string(),
                expected: block.kind(),
                found: payload.kind(),
            });
        }
        block.replace_payload(payload);
        tracing::debug!(block_id = id, "block updated");
        Ok(())
    }

    /// Remove block `id` and close the order gap it leaves.
    ///
    /// # Errors
    ///
    /// [`CollectionError::BlockNotFound`] if `id` is absent.
    pub fn remove(&mut self, id: &str) -> Result<ContentBlock, CollectionError> {
        let idx = self.require(id)?;
        let removed = self.blocks.remove(idx);
        self.renumber_from(idx);
        tracing::debug!(block_id = id, order = idx, "block removed");
        Ok(removed)
    }

    /// Move block `id` to `new_index`, shifting every block in between by one.
    ///
    /// This is an array move, not a swap.
    ///
    /// # Errors
    ///
    /// [`CollectionError::BlockNotFound`] if `id` is absent, or
    /// [`CollectionError::IndexOutOfRange`] if `new_index >= len`.
    pub fn reorder(&mut self, id: &str, new_index: usize) -> Result<(), CollectionError> {
        let from = self.require(id)?;
        if new_index >= self.blocks.len() {
            return Err(CollectionError::IndexOutOfRange {
                index: new_index,
                len: self.blocks.len(),
            });
        }
        if from == new_index {
            return Ok(());
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(new_index, block);
        self.renumber_from(from.min(new_index));
        tracing::debug!(block_id = id, from, to = new_index, "block moved");
        Ok(())
    }

    /// `true` when sorting by `order` yields exactly `0..N-1`.
    #[must_use]
    pub fn orders_are_contiguous(&self) -> bool {
        let mut orders: Vec<usize> = self.blocks.iter().map(ContentBlock::order).collect();
        orders.sort_unstable();
        orders.into_iter().eq(0..self.blocks.len())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    fn require(&self, id: &str) -> Result<usize, CollectionError> {
        self.position(id).ok_or_else(|| {
            tracing::warn!(block_id = id, "block id not found on page");
            CollectionError::BlockNotFound { id: id.to_string() }
        })
    }

    /// Set `order = position` for every block from `start` on. Returns whether
    /// any value changed.
    fn renumber_from(&mut self, start: usize) -> bool {
        let mut changed = false;
        for (position, block) in self.blocks.iter_mut().enumerate().skip(start) {
            if block.order() != position {
                block.set_order(position);
                changed = true;
            }
        }
        changed
    }
}

fn first_duplicate_id(blocks: &[ContentBlock]) -> Option<String> {
    let mut seen = HashSet::with_capacity(blocks.len());
    blocks
        .iter()
        .find(|b| !seen.insert(b.id()))
        .map(|b| b.id().to_string())
}

impl TryFrom<Vec<ContentBlock>> for BlockCollection {
    type Error = CollectionError;

    fn try_from(blocks: Vec<ContentBlock>) -> Result<Self, Self::Error> {
        Self::from_blocks(blocks)
    }
}

impl From<BlockCollection> for Vec<ContentBlock> {
    fn from(collection: BlockCollection) -> Self {
        collection.blocks
    }
}

impl<'a> IntoIterator for &'a BlockCollection {
    type Item = &'a ContentBlock;
    type IntoIter = std::slice::Iter<'a, ContentBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
#[path = "collection_test.rs"]
mod tests;

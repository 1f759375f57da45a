//! Size-bounded lists backing parameter-list and child-list fields
//!
//! The maximum size is enforced on every append. The minimum is only checked
//! by validation, so a list can be filled step by step.

use crate::error::{ModelError, Result};
use crate::tree::index::{slice_positions, ListIndex};
use crate::tree::node::NodeId;
use crate::tree::schema::SizeBounds;
use crate::tree::value::Value;

/// Element types that may be stored in a [`BoundedList`].
pub trait ListItem: Clone + PartialEq {
    /// The node this item is, for identity lookup. Plain values have none.
    fn identity(&self) -> Option<NodeId>;
}

impl ListItem for Value {
    fn identity(&self) -> Option<NodeId> {
        None
    }
}

impl ListItem for NodeId {
    fn identity(&self) -> Option<NodeId> {
        Some(*self)
    }
}

/// An ordered sequence with a minimum and optional maximum size.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedList<T> {
    items: Vec<T>,
    bounds: SizeBounds,
    key: String,
}

impl<T: ListItem> BoundedList<T> {
    /// Create an empty list stored under the field `key`.
    pub fn new(key: &str, bounds: SizeBounds) -> Self {
        Self {
            items: Vec::new(),
            bounds,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn bounds(&self) -> SizeBounds {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.bounds.max.is_some_and(|max| self.items.len() >= max)
    }

    pub fn meets_minimum(&self) -> bool {
        self.items.len() >= self.bounds.min
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn at(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    pub fn position_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    /// Resolve an index into an ordered set of positions.
    pub fn resolve(&self, index: &ListIndex) -> Result<Vec<usize>> {
        let len = self.items.len();
        match *index {
            ListIndex::All => Ok((0..len).collect()),

            ListIndex::Single(i) => {
                let position = if i < 0 { i + len as isize } else { i };
                if position < 0 || position as usize >= len {
                    return Err(ModelError::IndexOutOfRange {
                        field: self.key.clone(),
                        index: i,
                        len,
                    });
                }
                Ok(vec![position as usize])
            }

            ListIndex::Range { start, stop, step } => slice_positions(len, start, stop, step)
                .ok_or_else(|| ModelError::WrongIndexKind {
                    field: self.key.clone(),
                    message: "slice step cannot be zero".to_string(),
                }),

            ListIndex::ByIdentity(node) => {
                if self.items.first().is_some_and(|item| item.identity().is_none()) {
                    return Err(ModelError::WrongIndexKind {
                        field: self.key.clone(),
                        message: "an integer, slice or None is required for a parameter list"
                            .to_string(),
                    });
                }
                let matches: Vec<usize> = self
                    .items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.identity() == Some(node))
                    .map(|(i, _)| i)
                    .collect();
                match matches.as_slice() {
                    [position] => Ok(vec![*position]),
                    _ => Err(ModelError::NotAMember {
                        field: self.key.clone(),
                    }),
                }
            }
        }
    }

    /// Copies of the members selected by `index`.
    pub fn select(&self, index: &ListIndex) -> Result<Vec<T>> {
        Ok(self
            .resolve(index)?
            .into_iter()
            .map(|i| self.items[i].clone())
            .collect())
    }

    /// Append when `index` is `None`, otherwise replace every selected member.
    ///
    /// Returns the members that were replaced by a different item, so the
    /// owner can release them.
    pub fn insert(&mut self, item: T, index: Option<&ListIndex>) -> Result<Vec<T>> {
        let Some(index) = index else {
            if let Some(max) = self.bounds.max.filter(|_| self.is_full()) {
                return Err(ModelError::SizeLimitExceeded {
                    field: self.key.clone(),
                    max,
                });
            }
            self.items.push(item);
            return Ok(Vec::new());
        };

        let mut replaced = Vec::new();
        for position in self.resolve(index)? {
            let old = std::mem::replace(&mut self.items[position], item.clone());
            if old != item {
                replaced.push(old);
            }
        }
        Ok(replaced)
    }

    /// Remove the selected members, returning them with their former
    /// positions in ascending order.
    pub fn remove(&mut self, index: &ListIndex) -> Result<Vec<(usize, T)>> {
        let mut positions = self.resolve(index)?;
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();

        let mut removed: Vec<(usize, T)> = positions
            .into_iter()
            .map(|position| (position, self.items.remove(position)))
            .collect();
        removed.reverse();
        Ok(removed)
    }

    /// Take every member out, leaving the list empty.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }
}

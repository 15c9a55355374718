//! Sequential identifiers and their allocation.
//!
//! The ranking service expects callers to choose item and vote-event ids
//! themselves. Each entity kind gets its own [`IdStream`]; the next id for
//! a stream is always one past the largest id recorded so far.
//!
//! Allocation is pure: asking for the next id does not reserve it. Only a
//! confirmed submission is recorded, so a rejected submission leaves the
//! sequence exactly where it was.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// An integer id drawn from a sequential stream.
pub trait SequenceId: Copy + Ord + fmt::Debug {
    /// Wraps a raw sequence value.
    fn from_raw(raw: u64) -> Self;

    /// Returns the raw sequence value.
    fn raw(self) -> u64;
}

macro_rules! sequence_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl SequenceId for $name {
            fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

sequence_id!(
    /// Identifier of a submitted item (story or comment).
    ItemId
);

sequence_id!(
    /// Identifier of a submitted vote event.
    VoteEventId
);

/// The ids issued so far for one entity kind, in confirmation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdStream<T> {
    ids: Vec<T>,
}

impl<T> Default for IdStream<T> {
    fn default() -> Self {
        Self { ids: Vec::new() }
    }
}

impl<T: SequenceId> IdStream<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an id whose submission was confirmed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NonMonotonicId` if `id` is not greater
    /// than every id already recorded.
    pub fn record(&mut self, id: T) -> Result<(), ValidationError> {
        if let Some(last) = self.max() {
            if id <= last {
                return Err(ValidationError::NonMonotonicId {
                    last: last.raw(),
                    attempted: id.raw(),
                });
            }
        }
        self.ids.push(id);
        Ok(())
    }

    /// Largest recorded id. Ids are recorded in increasing order, so this
    /// is the most recent one.
    #[must_use]
    pub fn max(&self) -> Option<T> {
        self.ids.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: T) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.ids.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.ids
    }
}

/// Computes the next id for a stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdAllocator;

impl IdAllocator {
    /// Returns `1` for an empty stream, otherwise `max + 1`.
    #[must_use]
    pub fn next<T: SequenceId>(stream: &IdStream<T>) -> T {
        let next = stream.max().map_or(1, |last| last.raw() + 1);
        T::from_raw(next)
    }

    /// Same rule applied to an arbitrary set of ids.
    #[must_use]
    pub fn next_from<T, I>(ids: I) -> T
    where
        T: SequenceId,
        I: IntoIterator<Item = T>,
    {
        let next = ids.into_iter().max().map_or(1, |last| last.raw() + 1);
        T::from_raw(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_on_empty_stream_is_one() {
        let stream: IdStream<ItemId> = IdStream::new();
        assert_eq!(IdAllocator::next(&stream), ItemId::new(1));
    }

    #[test]
    fn test_next_from_sparse_set() {
        let ids = [1, 2, 5].map(ItemId::new);
        assert_eq!(IdAllocator::next_from(ids), ItemId::new(6));
        assert_eq!(
            IdAllocator::next_from(Vec::<VoteEventId>::new()),
            VoteEventId::new(1)
        );
    }

    #[test]
    fn test_allocation_does_not_reserve() {
        let mut stream = IdStream::new();
        stream.record(ItemId::new(1)).unwrap();

        let first = IdAllocator::next(&stream);
        let second = IdAllocator::next(&stream);
        assert_eq!(first, second);
        assert_eq!(stream.len(), 1);
    }

    #[test]
    fn test_record_rejects_non_increasing() {
        let mut stream = IdStream::new();
        stream.record(VoteEventId::new(3)).unwrap();

        let err = stream.record(VoteEventId::new(3)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NonMonotonicId { last: 3, attempted: 3 }
        ));
        assert!(stream.record(VoteEventId::new(2)).is_err());
        assert_eq!(stream.as_slice(), &[VoteEventId::new(3)]);
    }

    #[test]
    fn test_stream_tracks_confirmed_ids() {
        let mut stream = IdStream::new();
        for _ in 0..4 {
            let id = IdAllocator::next(&stream);
            stream.record(id).unwrap();
        }
        assert_eq!(stream.len(), 4);
        assert!(stream.contains(ItemId::new(4)));
        assert!(!stream.contains(ItemId::new(5)));
        let raw: Vec<u64> = stream.iter().map(ItemId::get).collect();
        assert_eq!(raw, vec![1, 2, 3, 4]);
    }
}

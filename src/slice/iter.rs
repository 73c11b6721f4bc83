//! Lazy `(meta, object)` production over an evaluated slice

use std::sync::Arc;
use std::vec;

use super::record::ObjectMeta;
use crate::column::ObjectId;
use crate::errors::{SlicerError, SlicerResult};
use crate::slicer::Slicer;

/// Iterator returned by `Slice::iter`.
///
/// Membership is fixed when the pass starts; attribute metadata is read from
/// the columns as each item is produced.
pub struct SliceIter<'s, T> {
    slicer: &'s Slicer<T>,
    matches: vec::IntoIter<(ObjectId, Arc<T>)>,
}

impl<'s, T> SliceIter<'s, T> {
    pub(crate) fn new(slicer: &'s Slicer<T>, matches: Vec<(ObjectId, Arc<T>)>) -> Self {
        Self {
            slicer,
            matches: matches.into_iter(),
        }
    }
}

impl<T> Iterator for SliceIter<'_, T> {
    type Item = (ObjectMeta, Arc<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, obj) = self.matches.next()?;
        Some((self.slicer.get_obj_meta(id), obj))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.matches.size_hint()
    }
}

impl<T> ExactSizeIterator for SliceIter<'_, T> {}

/// Iterator behind `for item in &slice`.
///
/// A chain that cannot be evaluated yields its error once, then ends.
pub struct SliceIntoIter<'s, T> {
    inner: Result<SliceIter<'s, T>, Option<SlicerError>>,
}

impl<'s, T> SliceIntoIter<'s, T> {
    pub(crate) fn new(pass: SlicerResult<SliceIter<'s, T>>) -> Self {
        Self {
            inner: pass.map_err(Some),
        }
    }
}

impl<T> Iterator for SliceIntoIter<'_, T> {
    type Item = SlicerResult<(ObjectMeta, Arc<T>)>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Ok(pass) => pass.next().map(Ok),
            Err(err) => err.take().map(Err),
        }
    }
}

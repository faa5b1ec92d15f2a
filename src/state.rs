//! # State Chain
//!
//! User state threaded through a parse and mutated by actions.
//!
//! A [`StateChain`] is an ordered stack of opaque user objects. Actions
//! receive it by mutable reference on every invocation and address frames
//! by type. A [`scope`](crate::grammar::RuleExpr::scope) combinator
//! extends the chain for the dynamic extent of its subtree: its
//! [`ScopeHook`] constructs a new frame on entry and either folds it into
//! the enclosing chain on a successful, action-enabled exit, or discards
//! it silently.

use crate::input::Cursor;
use std::any::Any;

struct StateFrame {
    value: Box<dyn Any>,
    type_name: &'static str,
}

/// Ordered chain of user state objects, created per parse call.
#[derive(Default)]
pub struct StateChain {
    frames: Vec<StateFrame>,
}

impl StateChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chain holding a single frame.
    #[must_use]
    pub fn with<T: Any>(value: T) -> Self {
        let mut chain = Self::new();
        chain.push(value);
        chain
    }

    /// Push a new frame on top of the chain.
    pub fn push<T: Any>(&mut self, value: T) {
        self.frames.push(StateFrame {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
        });
    }

    /// Pop the topmost frame and downcast it.
    ///
    /// Returns `None` if the chain is empty or the topmost frame is not a
    /// `T`; in the latter case the frame is left in place.
    pub fn pop<T: Any>(&mut self) -> Option<T> {
        if self.frames.last()?.value.is::<T>() {
            let frame = self.frames.pop()?;
            frame.value.downcast::<T>().ok().map(|b| *b)
        } else {
            None
        }
    }

    /// Borrow the topmost frame, if it is a `T`.
    #[must_use]
    pub fn last<T: Any>(&self) -> Option<&T> {
        self.frames.last()?.value.downcast_ref::<T>()
    }

    /// Mutably borrow the topmost frame, if it is a `T`.
    pub fn last_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.frames.last_mut()?.value.downcast_mut::<T>()
    }

    /// Borrow the topmost frame of type `T`, searching from the top.
    #[must_use]
    pub fn find<T: Any>(&self) -> Option<&T> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.value.downcast_ref::<T>())
    }

    /// Mutably borrow the topmost frame of type `T`, searching from the top.
    pub fn find_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|f| f.value.downcast_mut::<T>())
    }

    /// Number of frames in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the chain holds no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Type names of all frames, bottom to top. Used for fatal-failure
    /// diagnostics.
    #[must_use]
    pub fn frame_types(&self) -> Vec<&'static str> {
        self.frames.iter().map(|f| f.type_name).collect()
    }

    fn pop_any(&mut self) -> Option<Box<dyn Any>> {
        self.frames.pop().map(|f| f.value)
    }
}

impl std::fmt::Debug for StateChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateChain")
            .field("frames", &self.frame_types())
            .finish()
    }
}

/// Scoped state construction and folding.
///
/// The engine calls `enter` when a scope combinator is entered, then
/// exactly one of `fold` (subtree matched and actions are enabled) or
/// `discard` (subtree failed, actions suppressed, or the parse aborted).
/// The hook must leave the chain with the same frame count it found on
/// entry.
pub trait ScopeHook: Send + Sync {
    /// Construct the scope's frames from the cursor and the prior chain.
    fn enter(&self, cursor: &Cursor<'_>, states: &mut StateChain);

    /// Fold the scope's frames into the prior chain after a successful,
    /// action-enabled subtree match.
    fn fold(&self, cursor: &Cursor<'_>, states: &mut StateChain);

    /// Drop the scope's frames without folding.
    fn discard(&self, states: &mut StateChain);
}

/// A [`ScopeHook`] built from a constructor and a fold closure, managing a
/// single frame of type `T`.
pub struct FnScope<T, E, F>
where
    T: Any,
    E: Fn(&Cursor<'_>, &StateChain) -> T + Send + Sync,
    F: Fn(&Cursor<'_>, T, &mut StateChain) + Send + Sync,
{
    enter: E,
    fold: F,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, E, F> FnScope<T, E, F>
where
    T: Any,
    E: Fn(&Cursor<'_>, &StateChain) -> T + Send + Sync,
    F: Fn(&Cursor<'_>, T, &mut StateChain) + Send + Sync,
{
    /// Create a scope hook from an `enter` constructor and a `fold`
    /// success hook.
    pub const fn new(enter: E, fold: F) -> Self {
        Self {
            enter,
            fold,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, E, F> ScopeHook for FnScope<T, E, F>
where
    T: Any,
    E: Fn(&Cursor<'_>, &StateChain) -> T + Send + Sync,
    F: Fn(&Cursor<'_>, T, &mut StateChain) + Send + Sync,
{
    fn enter(&self, cursor: &Cursor<'_>, states: &mut StateChain) {
        let frame = (self.enter)(cursor, states);
        states.push(frame);
    }

    fn fold(&self, cursor: &Cursor<'_>, states: &mut StateChain) {
        if let Some(frame) = states.pop::<T>() {
            (self.fold)(cursor, frame, states);
        }
    }

    fn discard(&self, states: &mut StateChain) {
        let _ = states.pop_any();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TrackingMode;

    #[test]
    fn test_chain_push_find() {
        let mut chain = StateChain::new();
        chain.push(String::from("bottom"));
        chain.push(42u32);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.last::<u32>(), Some(&42));
        assert!(chain.last::<String>().is_none());
        assert_eq!(chain.find::<String>().unwrap(), "bottom");

        *chain.find_mut::<u32>().unwrap() += 1;
        assert_eq!(chain.pop::<u32>(), Some(43));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_chain_pop_wrong_type_keeps_frame() {
        let mut chain = StateChain::with(7i64);
        assert_eq!(chain.pop::<u8>(), None);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_chain_frame_types() {
        let mut chain = StateChain::new();
        chain.push(1u8);
        chain.push(2u16);
        let types = chain.frame_types();
        assert_eq!(types, vec!["u8", "u16"]);
    }

    #[test]
    fn test_fn_scope_fold_and_discard() {
        let cursor = Cursor::new(b"", TrackingMode::Lazy);
        let hook = FnScope::new(
            |_: &Cursor<'_>, _: &StateChain| Vec::<u8>::new(),
            |_: &Cursor<'_>, frame: Vec<u8>, states: &mut StateChain| {
                if let Some(total) = states.find_mut::<usize>() {
                    *total += frame.len();
                }
            },
        );

        let mut chain = StateChain::with(0usize);
        hook.enter(&cursor, &mut chain);
        assert_eq!(chain.len(), 2);
        chain.last_mut::<Vec<u8>>().unwrap().extend_from_slice(b"ab");
        hook.fold(&cursor, &mut chain);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.last::<usize>(), Some(&2));

        hook.enter(&cursor, &mut chain);
        hook.discard(&mut chain);
        assert_eq!(chain.len(), 1);
    }
}

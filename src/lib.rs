//! Core of the Big Moments marketing calendar: a twelve-month board of
//! product launches, campaign activity, and threaded comments, kept in
//! step across clients through a remote document store.
//!
//! The store and the asset host are narrow contracts (`store::RemoteStore`,
//! `media::host::MediaHost`); everything else is local machinery: the
//! canonical-order reconciler (`sync`), the debounced launch editor
//! (`editor`), optimistic month writes (`optimistic`), and the pure
//! comment/markup/media-reference models.

pub mod calendar;
pub mod comments;
pub mod editor;
pub mod error;
pub mod markup;
pub mod media;
pub mod optimistic;
pub mod prefs;
pub mod settings;
pub mod state;
pub mod store;
pub mod sync;
pub mod types;

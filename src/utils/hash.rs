//! Hash containers keyed by small values such as handles and subresource
//! tuples. The Fx hash is fast but not resistant to collision attacks.

pub type FastHashMap<K, V> = fxhash::FxHashMap<K, V>;
pub type FastHashSet<K> = fxhash::FxHashSet<K>;

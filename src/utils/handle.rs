use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;

/// `HandleIndex` type is arbitrary. Keeping it 32-bits allows for
/// a single 64-bits word per `Handle`.
pub type HandleIndex = u32;

/// Index of the handle handed back by failed resource creations.
pub const INVALID_HANDLE_INDEX: HandleIndex = 0x0BAD_F00D;

/// `Handle` is made up of two field, `index` and `version`. `index` addresses
/// a slot in one of the backend tables. Slots could be recycled, so a stale
/// handle might point at a newer resource with identical index. We solve this
/// by introducing `version`, which is bumped every time a slot is freed.
///
/// The nil handle `(0, 0)` is special: it addresses the reserved slot of
/// every table, which is the default framebuffer in the texture table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub struct Handle {
    index: HandleIndex,
    version: HandleIndex,
}

impl Handle {
    /// Constructs a new `Handle`.
    #[inline]
    pub fn new(index: HandleIndex, version: HandleIndex) -> Self {
        Handle { index, version }
    }

    /// Constructs the nil `Handle`.
    #[inline]
    pub fn nil() -> Self {
        Handle {
            index: 0,
            version: 0,
        }
    }

    /// Returns true if this is the nil `Handle`.
    #[inline]
    pub fn is_nil(self) -> bool {
        self.index == 0 && self.version == 0
    }

    /// Constructs the `Handle` that marks a failed creation. It never
    /// addresses a live slot.
    #[inline]
    pub fn invalid() -> Self {
        Handle {
            index: INVALID_HANDLE_INDEX,
            version: 0,
        }
    }

    /// Returns index value.
    #[inline]
    pub fn index(self) -> HandleIndex {
        self.index
    }

    /// Returns version value.
    #[inline]
    pub fn version(self) -> HandleIndex {
        self.version
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Handle ({}, {})", self.index, self.version)
    }
}

pub trait HandleLike: Debug + Copy + Hash + PartialEq + Eq {
    fn new(index: HandleIndex, version: HandleIndex) -> Self;
    fn index(&self) -> HandleIndex;
    fn version(&self) -> HandleIndex;

    #[inline]
    fn is_nil(&self) -> bool {
        self.index() == 0 && self.version() == 0
    }
}

impl HandleLike for Handle {
    #[inline]
    fn new(index: HandleIndex, version: HandleIndex) -> Self {
        Handle { index, version }
    }

    #[inline]
    fn index(&self) -> HandleIndex {
        self.index
    }

    #[inline]
    fn version(&self) -> HandleIndex {
        self.version
    }
}

/// Declares a type-safe wrapper around `Handle`.
#[macro_export]
macro_rules! impl_handle {
    ($name:ident) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(Serialize, Deserialize)]
        pub struct $name($crate::utils::handle::Handle);

        impl $name {
            /// Constructs the nil handle of this kind.
            #[inline]
            pub fn nil() -> Self {
                $name($crate::utils::handle::Handle::nil())
            }

            /// Constructs the handle that marks a failed creation.
            #[inline]
            pub fn invalid() -> Self {
                $name($crate::utils::handle::Handle::invalid())
            }

            #[inline]
            pub fn index(self) -> $crate::utils::handle::HandleIndex {
                self.0.index()
            }

            #[inline]
            pub fn version(self) -> $crate::utils::handle::HandleIndex {
                self.0.version()
            }

            #[inline]
            pub fn is_nil(self) -> bool {
                self.0.is_nil()
            }
        }

        impl From<$name> for $crate::utils::handle::Handle {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }

        impl From<$crate::utils::handle::Handle> for $name {
            fn from(handle: $crate::utils::handle::Handle) -> Self {
                $name(handle)
            }
        }

        impl $crate::utils::handle::HandleLike for $name {
            #[inline]
            fn new(
                index: $crate::utils::handle::HandleIndex,
                version: $crate::utils::handle::HandleIndex,
            ) -> Self {
                $name($crate::utils::handle::Handle::new(index, version))
            }

            #[inline]
            fn index(&self) -> $crate::utils::handle::HandleIndex {
                self.0.index()
            }

            #[inline]
            fn version(&self) -> $crate::utils::handle::HandleIndex {
                self.0.version()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(
                    f,
                    "{} ({}, {})",
                    stringify!($name),
                    self.0.index(),
                    self.0.version()
                )
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic() {
        let h2 = Handle::new(2, 4);
        assert_eq!(h2.index(), 2);
        assert_eq!(h2.version(), 4);
        assert!(!h2.is_nil());

        assert!(Handle::nil().is_nil());
        assert!(Handle::default().is_nil());
        assert!(!Handle::new(0, 1).is_nil());
        assert_eq!(Handle::invalid().index(), 0x0BAD_F00D);
        assert!(!Handle::invalid().is_nil());
    }

    #[test]
    fn container() {
        use crate::utils::hash::FastHashSet;

        let h1 = Handle::new(1, 1);
        let h2 = Handle::new(1, 2);
        let h3 = Handle::new(2, 2);
        let h4 = Handle::new(1, 1);

        let mut map = FastHashSet::default();
        assert_eq!(map.insert(h1), true);
        assert_eq!(map.contains(&h1), true);
        assert_eq!(map.insert(h4), false);
        assert_eq!(map.contains(&h4), true);
        assert_eq!(map.insert(h2), true);
        assert_eq!(map.insert(h3), true);
    }

    impl_handle!(TypeSafeHandle);

    #[test]
    fn type_safe_handle() {
        let h1 = TypeSafeHandle::default();
        assert_eq!(h1, TypeSafeHandle::from(Handle::default()));
        assert!(h1.is_nil());

        let h2: TypeSafeHandle = HandleLike::new(3, 1);
        assert_eq!(h2.index(), 3);
        assert_eq!(format!("{}", h2), "TypeSafeHandle (3, 1)");
    }
}

//! Property attribute bits.

use bitflags::bitflags;
use vesper_gc::{Finalize, Trace, Tracer};

bitflags! {
    /// The characteristic bits of a property: writable, enumerable and
    /// configurable, plus their spelled-out negations for readable call
    /// sites.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Attribute: u8 {
        /// The property value may be changed with an assignment.
        const WRITABLE = 0b0000_0001;

        /// The property shows up in for-in enumeration and `Object.keys`.
        const ENUMERABLE = 0b0000_0010;

        /// The property may be redefined or deleted.
        const CONFIGURABLE = 0b0000_0100;

        /// Alias for the absence of `WRITABLE`.
        const READONLY = 0;

        /// Alias for the absence of `ENUMERABLE`.
        const NON_ENUMERABLE = 0;

        /// Alias for the absence of `CONFIGURABLE`.
        const PERMANENT = 0;
    }
}

impl Attribute {
    /// `{writable, ¬enumerable, configurable}` — the attributes of built-in
    /// methods.
    #[inline]
    pub fn method() -> Self {
        Self::WRITABLE | Self::NON_ENUMERABLE | Self::CONFIGURABLE
    }

    #[inline]
    pub fn writable(self) -> bool {
        self.contains(Self::WRITABLE)
    }

    #[inline]
    pub fn set_writable(&mut self, writable: bool) {
        self.set(Self::WRITABLE, writable);
    }

    #[inline]
    pub fn enumerable(self) -> bool {
        self.contains(Self::ENUMERABLE)
    }

    #[inline]
    pub fn set_enumerable(&mut self, enumerable: bool) {
        self.set(Self::ENUMERABLE, enumerable);
    }

    #[inline]
    pub fn configurable(self) -> bool {
        self.contains(Self::CONFIGURABLE)
    }

    #[inline]
    pub fn set_configurable(&mut self, configurable: bool) {
        self.set(Self::CONFIGURABLE, configurable);
    }
}

impl Default for Attribute {
    /// The default attributes of a new own data property.
    fn default() -> Self {
        Self::all()
    }
}

impl Finalize for Attribute {}

impl Trace for Attribute {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

//! HTTP method flags.
//!
//! Flag values are wire-stable: route configuration stores method sets as
//! bit masks built from them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get = 4,
    Post = 8,
    Put = 16,
    Delete = 32,
    Head = 64,
    Patch = 128,
    Options = 256,
}

impl Method {
    /// Every method, in flag order.
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Head,
        Method::Patch,
        Method::Options,
    ];

    pub fn flag(self) -> u32 {
        self as u32
    }

    /// Method for a single flag. Combined masks yield `None`.
    pub fn from_flag(flag: u32) -> Option<Method> {
        Self::ALL.into_iter().find(|m| m.flag() == flag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }

    /// Case-insensitive lookup by method name.
    pub fn from_name(name: &str) -> Option<Method> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of methods encoded as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MethodMask(u32);

impl MethodMask {
    /// Every method.
    pub const RESTFUL: MethodMask = MethodMask(508);
    /// GET, POST, PUT, DELETE and PATCH.
    pub const CRUD: MethodMask = MethodMask(188);
    pub const NONE: MethodMask = MethodMask(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, method: Method) -> bool {
        self.0 & method.flag() != 0
    }

    pub fn with(self, method: Method) -> Self {
        Self(self.0 | method.flag())
    }

    pub fn is_empty(self) -> bool {
        self.0 & Self::RESTFUL.0 == 0
    }

    /// Members in flag order.
    pub fn methods(self) -> impl Iterator<Item = Method> {
        Method::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<Method> for MethodMask {
    fn from_iter<I: IntoIterator<Item = Method>>(iter: I) -> Self {
        iter.into_iter().fold(MethodMask::NONE, MethodMask::with)
    }
}

impl From<Method> for MethodMask {
    fn from(method: Method) -> Self {
        MethodMask(method.flag())
    }
}

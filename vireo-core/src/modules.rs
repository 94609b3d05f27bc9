//! Module description enumeration.
//!
//! The engine reports its available filter modules as a null-terminated
//! singly-linked list of native nodes. The walk below copies every string
//! field into an owned snapshot before the caller releases the whole list;
//! no node pointer survives past that release.

use std::fmt;

use serde::Serialize;

use crate::ffi::{self, RawModuleDescription};

/// Owned snapshot of one native module description node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescription {
    pub name: String,
    pub short_name: String,
    pub long_name: String,
    pub help: Option<String>,
}

impl fmt::Display for ModuleDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}: {}",
            self.name,
            self.long_name,
            self.help.as_deref().unwrap_or("")
        )
    }
}

/// Walk a native module list from its head, eagerly copying every node in
/// native registration order.
///
/// Does not release the list; the caller must do that exactly once, after
/// this returns.
pub(crate) unsafe fn collect_descriptions(
    head: *const RawModuleDescription,
) -> Vec<ModuleDescription> {
    let mut list = Vec::new();
    let mut node = head;
    while !node.is_null() {
        let raw = &*node;
        list.push(ModuleDescription {
            name: ffi::copy_cstr(raw.psz_name).unwrap_or_default(),
            short_name: ffi::copy_cstr(raw.psz_shortname).unwrap_or_default(),
            long_name: ffi::copy_cstr(raw.psz_longname).unwrap_or_default(),
            help: ffi::copy_cstr(raw.psz_help),
        });
        node = raw.p_next;
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::ptr;

    struct NodeStrings {
        name: CString,
        short_name: CString,
        long_name: CString,
        help: Option<CString>,
    }

    impl NodeStrings {
        fn new(name: &str, help: Option<&str>) -> Self {
            Self {
                name: CString::new(name).unwrap(),
                short_name: CString::new(format!("{name}-short")).unwrap(),
                long_name: CString::new(format!("{name}-long")).unwrap(),
                help: help.map(|h| CString::new(h).unwrap()),
            }
        }

        fn node(&self, next: *mut RawModuleDescription) -> RawModuleDescription {
            RawModuleDescription {
                psz_name: self.name.as_ptr() as *mut _,
                psz_shortname: self.short_name.as_ptr() as *mut _,
                psz_longname: self.long_name.as_ptr() as *mut _,
                psz_help: self
                    .help
                    .as_ref()
                    .map(|h| h.as_ptr() as *mut _)
                    .unwrap_or(ptr::null_mut()),
                p_next: next,
            }
        }
    }

    #[test]
    fn test_walk_preserves_order_and_length() {
        let s1 = NodeStrings::new("scaletempo", Some("Pitch-preserving scaler"));
        let s2 = NodeStrings::new("equalizer", None);
        let s3 = NodeStrings::new("compressor", Some("Dynamic range compressor"));

        let mut n3 = s3.node(ptr::null_mut());
        let mut n2 = s2.node(&mut n3);
        let n1 = s1.node(&mut n2);

        let list = unsafe { collect_descriptions(&n1) };
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].name, "scaletempo");
        assert_eq!(list[1].name, "equalizer");
        assert_eq!(list[2].name, "compressor");
        assert_eq!(list[0].short_name, "scaletempo-short");
        assert_eq!(list[0].long_name, "scaletempo-long");
    }

    #[test]
    fn test_walk_null_help_becomes_none() {
        let s = NodeStrings::new("equalizer", None);
        let n = s.node(ptr::null_mut());
        let list = unsafe { collect_descriptions(&n) };
        assert_eq!(list[0].help, None);
    }

    #[test]
    fn test_walk_empty_list() {
        let list = unsafe { collect_descriptions(ptr::null()) };
        assert!(list.is_empty());
    }

    #[test]
    fn test_display_format() {
        let md = ModuleDescription {
            name: "equalizer".into(),
            short_name: "eq".into(),
            long_name: "Graphic equalizer".into(),
            help: Some("10-band equalizer".into()),
        };
        assert_eq!(md.to_string(), "equalizer - Graphic equalizer: 10-band equalizer");
    }
}

use std::io::Write;

use quick_xml::Writer;

/// Either an owned [`quick_xml::Writer`] or a mutable reference to one
///
/// Lets export functions accept plain [`std::io::Write`] targets as well as
/// writers configured by the caller (e.g., with indentation).
#[allow(missing_debug_implementations)]
pub enum XMLWriterWrapper<'a, W> {
    /// Owned [`quick_xml::Writer`]
    Owned(Writer<W>),
    /// Mutable reference to a [`quick_xml::Writer`]
    Ref(&'a mut Writer<W>),
}

impl<W: Write> XMLWriterWrapper<'_, W> {
    /// Wrap `inner` in an owned writer indenting nested elements by four spaces
    pub fn indented(inner: W) -> Self {
        Self::Owned(Writer::new_with_indent(inner, b' ', 4))
    }
}

impl<W> XMLWriterWrapper<'_, W> {
    /// The underlying [`quick_xml::Writer`]
    pub fn writer(&mut self) -> &mut Writer<W> {
        match self {
            XMLWriterWrapper::Owned(w) => w,
            XMLWriterWrapper::Ref(w) => &mut **w,
        }
    }
}

impl<W: Write> From<W> for XMLWriterWrapper<'_, W> {
    fn from(inner: W) -> Self {
        Self::Owned(Writer::new(inner))
    }
}

impl<'a, W> From<&'a mut Writer<W>> for XMLWriterWrapper<'a, W> {
    fn from(w: &'a mut Writer<W>) -> Self {
        Self::Ref(w)
    }
}

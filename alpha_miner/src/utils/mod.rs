/// Helpers for writing XML with [`quick_xml`]
pub mod xml_utils;

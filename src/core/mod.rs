pub mod cid;
pub mod error;
pub mod font;
pub mod object;
pub mod widths;

pub use cid::{
    CidSystemInfo, FontCatalog, FontFlags, FontHandle, NamedFontCatalog, SubstituteKind,
    Substitution, resolve_substitute,
};
pub use error::{PDFError, PDFResult};
pub use font::{CidToGidMapping, CompositeFont, DEFAULT_CID_WIDTH, FontType};
pub use object::PDFObject;
pub use widths::{MAX_CID, WidthTable};

pub use failure::Error;

pub type Result<T> = ::std::result::Result<T, failure::Error>;

/// Configuration errors detected while creating or respecifying resources.
#[derive(Debug, Fail)]
pub enum ResourceError {
    #[fail(
        display = "Texture size {}x{} exceeds the maximum supported size {}.",
        _0, _1, _2
    )]
    TextureTooLarge(u32, u32, u32),
    #[fail(display = "Renderable texture '{}' can not be created with pixel data.", _0)]
    RenderableWithData(String),
    #[fail(display = "Texture '{}' needs pixel data to be created.", _0)]
    MissingPixelData(String),
    #[fail(display = "Illegal {} id: {}.", _0, _1)]
    IllegalHandle(&'static str, String),
    #[fail(display = "Format {:?} is not supported by {}.", _0, _1)]
    UnsupportedFormat(crate::ngl::format::Format, &'static str),
    #[fail(display = "{} needs {} bytes of data but only {} are provided.", _0, _1, _2)]
    InsufficientData(String, usize, usize),
}
